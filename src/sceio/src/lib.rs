// sceio - guest file I/O emulation
//
// Implements the console's file I/O call surface (open/read/write/seek,
// stat, directory iteration, the "async" variants and devctl) on top of the
// kernel object table (`kobjtables`) and the device-prefixed VFS (`metafs`).
//
// Every call runs to completion before returning.  The async entry points
// do their work immediately and leave the result on the file's kernel
// object, where the matching wait/poll call picks it up.

pub mod callbacks;
pub mod config;
pub mod devctl;
pub mod init;
pub mod io_calls;
pub mod kobjects;

#[cfg(test)]
mod tests;

use kobjtables::HandleTable;
use metafs::MetaFileSystem;

pub use callbacks::{CallbackKind, Notification};
pub use config::IoConfig;
pub use kobjects::{DeferredAction, DirListing, FileNode, KernelObject};

/// Memory stick status reported by devctl and callback notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemstickState {
    pub state: u32,
    pub fat_state: u32,
}

impl Default for MemstickState {
    fn default() -> Self {
        MemstickState {
            state: sysdefs::constants::MEMSTICK_STATE_DRIVER_READY,
            fat_state: sysdefs::constants::MEMSTICK_FAT_STATE_ASSIGNED,
        }
    }
}

/// All state of the I/O subsystem.  Created by [`IoSystem::start`], torn
/// down by [`IoSystem::shutdown`]; there are no globals.
pub struct IoSystem {
    pub(crate) objects: HandleTable<KernelObject>,
    pub(crate) vfs: MetaFileSystem,
    pub(crate) config: IoConfig,
    pub(crate) memstick: MemstickState,
    pub(crate) callbacks: callbacks::CallbackRegistry,
    pub(crate) notifications: callbacks::NotificationQueue,
    pub(crate) emu_debug_output: String,
}

impl IoSystem {
    pub fn vfs(&self) -> &MetaFileSystem {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut MetaFileSystem {
        &mut self.vfs
    }

    pub fn objects(&self) -> &HandleTable<KernelObject> {
        &self.objects
    }

    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    pub fn memstick(&self) -> MemstickState {
        self.memstick
    }

    /// Text the guest sent to the emulator debug channel while
    /// `print_emu_log` was on.
    pub fn emu_debug_output(&self) -> &str {
        &self.emu_debug_output
    }

    /// Take every queued notification, oldest first.  The thread manager
    /// calls this after each guest call returns.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Tear down a kernel object removed from the table.  This is the only
    /// place a file's VFS handle gets closed.
    pub(crate) fn release_object(&mut self, id: u32, obj: KernelObject) {
        match obj {
            KernelObject::File(node) => {
                if let Err(e) = self.vfs.close_file(node.handle) {
                    log::error!("closing {} (id {:#x}) failed: {}", node.fullpath, id, e);
                }
            }
            KernelObject::Directory(_) => {}
        }
    }
}
