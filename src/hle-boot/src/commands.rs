// The subcommands.  Each drives the guest-facing calls of an already started
// IoSystem and prints what the guest would see.

use std::io::Write;

use anyhow::{bail, Context};
use savedata::SavedataManager;
use sceio::IoSystem;
use sysdefs::constants::{SavedataMode, SCE_STM_FDIR};
use sysdefs::data::{SceIoDirEnt, SceIoStat, SceUtilitySavedataParam};
use typemap::datatype_conversion::sc_pack_fixed_str;
use typemap::flat_memory::{FlatMemory, USER_MEMORY_BASE};
use typemap::guest_memory::GuestMemory;

use crate::cli::Command;

/// Where a call's output record lands.
const OUT: u32 = USER_MEMORY_BASE;
/// A savedata parameter block.
const PARAM: u32 = USER_MEMORY_BASE + 0x1000;
/// Candidate slot names for the parameter block.
const NAMES: u32 = USER_MEMORY_BASE + 0x2000;

fn is_error(code: u32) -> bool {
    code & 0x8000_0000 != 0
}

pub fn run(command: &Command, sys: &mut IoSystem, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut mem = FlatMemory::default();
    match command {
        Command::Ls { path } => ls(sys, &mut mem, path, out),
        Command::Stat { path } => stat(sys, &mut mem, path, out),
        Command::Slots { game, file, mode, names } => {
            slots(sys, &mut mem, game, file, (*mode).into(), names, out)
        }
    }
}

fn ls(sys: &mut IoSystem, mem: &mut FlatMemory, path: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let id = sys.dopen_syscall(path);
    if is_error(id) {
        bail!("cannot open directory {path}: error {id:08x}");
    }
    loop {
        let remaining = sys.dread_syscall(mem, id, OUT);
        if remaining == 0 {
            break;
        }
        if is_error(remaining) {
            sys.dclose_syscall(id);
            bail!("reading {path}: error {remaining:08x}");
        }
        let mut raw = [0u8; SceIoDirEnt::SIZE];
        mem.read_into(OUT, &mut raw)?;
        let entry = SceIoDirEnt::from_bytes(&raw);
        let kind = if entry.d_stat.st_mode & SCE_STM_FDIR != 0 { 'd' } else { '-' };
        writeln!(out, "{} {:>10} {}", kind, entry.d_stat.st_size, entry.d_name)?;
    }
    sys.dclose_syscall(id);
    Ok(())
}

fn stat(sys: &mut IoSystem, mem: &mut FlatMemory, path: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let result = sys.getstat_syscall(mem, path, OUT);
    if result != 0 {
        bail!("cannot stat {path}: error {result:08x}");
    }
    let mut raw = [0u8; SceIoStat::SIZE];
    mem.read_into(OUT, &mut raw)?;
    let st = SceIoStat::from_bytes(&raw);
    let m = st.st_mtime;
    writeln!(out, "path:  {path}")?;
    writeln!(out, "mode:  {:#06x}", st.st_mode)?;
    writeln!(out, "attr:  {:#04x}", st.st_attr)?;
    writeln!(out, "size:  {}", st.st_size)?;
    writeln!(
        out,
        "mtime: {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        m.year, m.month, m.day, m.hour, m.minute, m.second
    )?;
    Ok(())
}

fn slots(
    sys: &mut IoSystem,
    mem: &mut FlatMemory,
    game: &str,
    file: &str,
    mode: SavedataMode,
    names: &[String],
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let param = SceUtilitySavedataParam {
        size: SceUtilitySavedataParam::SIZE as u32,
        mode: mode as u32,
        game_name: sc_pack_fixed_str(game),
        save_name_list: NAMES,
        file_name: sc_pack_fixed_str(file),
        ..Default::default()
    };
    mem.write_bytes(PARAM, &param.to_bytes())?;
    for (i, name) in names.iter().enumerate() {
        let entry: [u8; 20] = sc_pack_fixed_str(name);
        mem.write_bytes(NAMES + 20 * i as u32, &entry)
            .context("too many slot names")?;
    }
    mem.write_bytes(NAMES + 20 * names.len() as u32, &[0u8; 20])
        .context("too many slot names")?;

    let mut manager = SavedataManager::new();
    manager.init(sys.vfs());
    manager.set_param(sys.vfs(), mem, Some(PARAM));
    if manager.file_count() == 0 {
        writeln!(out, "no data")?;
    }
    for slot in manager.save_list() {
        let state = if slot.size == 0 { "empty".to_string() } else { format!("{} bytes", slot.size) };
        writeln!(out, "{:>3} {:<20} {}", slot.idx, slot.name, state)?;
    }
    Ok(())
}
