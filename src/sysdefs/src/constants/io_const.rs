//! File I/O and device-control constants of the guest ABI.
#![allow(dead_code)]

// ===== open() flags =====
pub const PSP_O_RDONLY: u32 = 0x0001;
pub const PSP_O_WRONLY: u32 = 0x0002;
pub const PSP_O_RDWR: u32 = 0x0003;
pub const PSP_O_NBLOCK: u32 = 0x0010;
pub const PSP_O_APPEND: u32 = 0x0100;
pub const PSP_O_CREAT: u32 = 0x0200;
pub const PSP_O_TRUNC: u32 = 0x0400;
pub const PSP_O_NOWAIT: u32 = 0x8000;

// ===== lseek() whence =====
pub const PSP_SEEK_SET: u32 = 0;
pub const PSP_SEEK_CUR: u32 = 1;
pub const PSP_SEEK_END: u32 = 2;

// ===== stat mode / attribute bits =====
pub const SCE_STM_FDIR: i32 = 0x1000;
pub const SCE_STM_FREG: i32 = 0x2000;
pub const SCE_STM_FLNK: i32 = 0x4000;
pub const SCE_ATTR_DIR: u32 = 0x10;
pub const SCE_ATTR_FILE: u32 = 0x20;

/// Byte used to pre-fill stat records before the known fields are written.
pub const STAT_FILL_BYTE: u8 = 0xFE;

/// Sentinel the directory reader stores in `d_private`.
pub const DIRENT_PRIVATE_SENTINEL: u32 = 0xC0DE_BABE;

// ===== standard stream ids =====
pub const STDOUT_ID: u32 = 1;
pub const STDERR_ID: u32 = 2;
pub const STDIN_ID: u32 = 3;

// ===== kernel object ids =====
/// First id handed out by the kernel object table.  Everything below is
/// reserved for the standard streams.
pub const KERNEL_OBJECT_ID_BASE: u32 = 0x100;
/// Maximum number of live kernel objects.
pub const KERNEL_OBJECT_MAX: u32 = 4096;

// ===== device names =====
pub const DEV_MEMSTICK: &str = "ms0:";
pub const DEV_MEMSTICK_FAT0: &str = "fatms0:";
pub const DEV_MEMSTICK_FAT: &str = "fatms:";
pub const DEV_MEMSTICK_HOST: &str = "mscmhc0:";
pub const DEV_FLASH0: &str = "flash0:";
pub const DEV_FLASH1: &str = "flash1:";
pub const DEV_EMULATOR: &str = "emulator:";
pub const DEV_KEMULATOR: &str = "kemulator:";

// ===== devctl commands: disc (any device) =====
pub const DEVCTL_UMD_GET_DISC_TYPE: u32 = 0x01F2_0001;
pub const DEVCTL_UMD_GET_CURRENT_LBA: u32 = 0x01F2_0002;
pub const DEVCTL_UMD_SEEK: u32 = 0x01F1_00A3;

/// Disc type reported for an inserted game disc.
pub const UMD_TYPE_GAME: u32 = 0x10;

// ===== devctl commands: memory stick host controller =====
pub const DEVCTL_MS_REGISTER_CALLBACK: u32 = 0x0201_5804;
pub const DEVCTL_MS_UNREGISTER_CALLBACK: u32 = 0x0202_5805;
pub const DEVCTL_MS_IS_INSERTED: u32 = 0x0202_5806;
pub const DEVCTL_MS_DRIVER_STATUS: u32 = 0x0202_5801;
pub const DEVCTL_MS_GET_SIZE: u32 = 0x0242_5818;

// ===== devctl commands: memory stick FAT layer =====
pub const DEVCTL_FATMS_REGISTER_CALLBACK: u32 = 0x0241_5821;
pub const DEVCTL_FATMS_UNREGISTER_CALLBACK: u32 = 0x0241_5822;
pub const DEVCTL_FATMS_SET_FAT_STATE: u32 = 0x0241_5823;
pub const DEVCTL_FATMS_GET_FAT_STATE: u32 = 0x0242_5823;

// ===== devctl commands: emulator debug channel =====
pub const EMULATOR_DEVCTL_GET_HAS_DISPLAY: u32 = 1;
pub const EMULATOR_DEVCTL_SEND_OUTPUT: u32 = 2;
pub const EMULATOR_DEVCTL_IS_EMULATOR: u32 = 3;

// ===== memory stick state =====
pub const MEMSTICK_STATE_INSERTED: u32 = 1;
pub const MEMSTICK_STATE_NOT_INSERTED: u32 = 2;
pub const MEMSTICK_STATE_DRIVER_READY: u32 = 4;
pub const MEMSTICK_STATE_DRIVER_BUSY: u32 = 8;
pub const MEMSTICK_FAT_STATE_UNASSIGNED: u32 = 0;
pub const MEMSTICK_FAT_STATE_ASSIGNED: u32 = 1;

/// How many callbacks each memory stick callback list may hold.
pub const MEMSTICK_MAX_CALLBACKS: usize = 32;

// ===== emulated memory stick geometry =====
pub const MEMSTICK_TOTAL_BYTES: u64 = 2 * 1024 * 1024 * 1024;
pub const MEMSTICK_FREE_BYTES: u64 = 1024 * 1024 * 1024;
pub const MEMSTICK_MAX_SECTORS: u32 = 512;
pub const MEMSTICK_SECTOR_SIZE: u32 = 0x200;
pub const MEMSTICK_SECTORS_PER_CLUSTER: u32 = 0x08;
