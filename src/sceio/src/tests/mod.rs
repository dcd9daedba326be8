// sceio test suite
//
// Every test gets its own temporary memory stick and flash directory, a
// freshly started IoSystem and 2 MiB of flat guest memory.  Nothing is
// global, so tests run in parallel.

mod devctl_tests; // device control routing and handlers

use std::path::PathBuf;

use sysdefs::constants::{PSP_O_CREAT, PSP_O_TRUNC, PSP_O_WRONLY};
use tempfile::TempDir;
use typemap::flat_memory::{FlatMemory, USER_MEMORY_BASE};
use typemap::guest_memory::GuestMemory;

use crate::config::IoConfig;
use crate::IoSystem;

/// Scratch buffer for data going in and out of files.
pub const BUF: u32 = USER_MEMORY_BASE + 0x1000;
/// Where calls write their results (stat records, u64 async results...).
pub const OUT: u32 = USER_MEMORY_BASE + 0x8000;
/// Argument blocks for devctl.
pub const ARG: u32 = USER_MEMORY_BASE + 0x9000;
/// Well outside the mapped range.
pub const UNMAPPED: u32 = 0x0100_0000;

pub fn test_config(root: &TempDir) -> IoConfig {
    IoConfig {
        memstick_dir: root.path().join("memstick"),
        flash_dir: root.path().join("flash"),
        print_emu_log: false,
    }
}

/// Setup function for tests.
/// The TempDir must outlive the IoSystem, so it is handed back as well.
pub fn test_setup() -> (TempDir, IoSystem, FlatMemory) {
    let root = tempfile::tempdir().unwrap();
    let sys = IoSystem::start(test_config(&root));
    (root, sys, FlatMemory::default())
}

/// Host location of `rel` on the memory stick.
pub fn memstick_path(root: &TempDir, rel: &str) -> PathBuf {
    root.path().join("memstick").join(rel)
}

/// Create `path` holding `data`, going through the guest calls.
pub fn create_file(sys: &mut IoSystem, mem: &mut FlatMemory, path: &str, data: &[u8]) {
    mem.write_bytes(BUF, data).unwrap();
    let id = sys.open_syscall(path, PSP_O_WRONLY | PSP_O_CREAT | PSP_O_TRUNC);
    assert!(id >= 0x100, "open {} failed: {:08x}", path, id);
    assert_eq!(sys.write_syscall(mem, id, BUF, data.len() as u32), data.len() as u32);
    assert_eq!(sys.close_syscall(id), 0);
}
