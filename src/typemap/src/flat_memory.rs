//! A contiguous block of guest RAM backed by a `Vec`.
//!
//! This is what the command-line front end and the tests hand to the I/O
//! layer in place of the real memory emulator.

use crate::guest_memory::{GuestMemory, MemError};

/// Start of user RAM on the console.
pub const USER_MEMORY_BASE: u32 = 0x0880_0000;

#[derive(Debug, Clone)]
pub struct FlatMemory {
    base: u32,
    bytes: Vec<u8>,
}

impl FlatMemory {
    pub fn new(base: u32, size: usize) -> Self {
        FlatMemory {
            base,
            bytes: vec![0u8; size],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn range(&self, addr: u32, len: usize) -> Result<std::ops::Range<usize>, MemError> {
        let err = MemError { addr, len };
        let start = addr.checked_sub(self.base).ok_or(err)? as usize;
        let end = start.checked_add(len).ok_or(err)?;
        if end > self.bytes.len() {
            log::debug!("guest access out of range: {:#010x}+{}", addr, len);
            return Err(err);
        }
        Ok(start..end)
    }
}

impl Default for FlatMemory {
    /// 2 MiB of user RAM.
    fn default() -> Self {
        FlatMemory::new(USER_MEMORY_BASE, 2 * 1024 * 1024)
    }
}

impl GuestMemory for FlatMemory {
    fn is_valid_address(&self, addr: u32) -> bool {
        addr >= self.base && ((addr - self.base) as usize) < self.bytes.len()
    }

    fn check_range(&self, addr: u32, len: usize) -> Result<(), MemError> {
        self.range(addr, len).map(|_| ())
    }

    fn read_into(&self, addr: u32, buf: &mut [u8]) -> Result<(), MemError> {
        let range = self.range(addr, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), MemError> {
        let range = self.range(addr, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}
