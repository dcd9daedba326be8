//! Result codes returned to the guest.
//!
//! The guest ABI reports failure through 32-bit codes with the high bit set.
//! Kernel codes live in the 0x8002_xxxx range, errno-style file codes in
//! 0x8001_xxxx, memory stick driver codes in 0x8022_xxxx and savedata utility
//! codes in 0x8011_03xx.
// Don't warn if all listed codes are not used in code...
#![allow(dead_code)]

reversible_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(u32)]
    /// Guest-visible error codes
    #[non_exhaustive]
    pub enum SceError {
        ErrnoFileNotFound = 0x8001_0002,      // No such file or directory
        ErrnoIo = 0x8001_0005,                // I/O error
        ErrnoFileExists = 0x8001_0011,        // File exists
        ErrnoInvalidArgument = 0x8001_0016,   // Invalid argument
        ErrnoNoSpace = 0x8001_001C,           // No space left on device
        KernelError = 0x8002_0001,            // Generic kernel error
        KernelIllegalAddr = 0x8002_00D3,      // Illegal address
        KernelMfile = 0x8002_0320,            // Too many open files
        KernelNodev = 0x8002_0321,            // No such device
        KernelXdev = 0x8002_0322,             // Cross-device link
        KernelBadf = 0x8002_0323,             // Bad file descriptor
        KernelInval = 0x8002_0324,            // Invalid argument
        KernelUnsup = 0x8002_0325,            // Unsupported operation
        KernelNoasync = 0x8002_032A,          // No async operation
        MemstickDevctlBadParams = 0x8022_0081,
        MemstickDevctlTooManyCallbacks = 0x8022_0082,
        SavedataLoadNoMs = 0x8011_0301,
        SavedataLoadAccessError = 0x8011_0305,
        SavedataLoadNoData = 0x8011_0307,
        SavedataLoadFileNotFound = 0x8011_0309,
        SavedataSaveNoMs = 0x8011_0381,
        SavedataSaveMsNoSpace = 0x8011_0383,
        SavedataSaveAccessError = 0x8011_0385,
        SavedataDeleteNoMs = 0x8011_0341,
        SavedataDeleteAccessError = 0x8011_0345,
        SavedataDeleteNoData = 0x8011_0347,
        SavedataSizesNoData = 0x8011_03C7,
    }
}

impl SceError {
    /// The raw code as the guest sees it in `v0`.
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Generic "-1" failure used by calls that never got a proper error code.
pub const SCE_FAILURE: u32 = 0xFFFF_FFFF;

/// Log a failed guest call and hand back its result code.
///
/// ## Arguments:
/// - err: the error reported to the guest
/// - syscall: name of the guest call (for the log line)
/// - message: short human description
///
/// ## Returns:
/// `err` as the raw 32-bit code
pub fn syscall_error(err: SceError, syscall: &str, message: &str) -> u32 {
    log::debug!("{} failed: {} ({:?} = {:08x})", syscall, message, err, err.code());
    err.code()
}
