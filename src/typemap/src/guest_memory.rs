//! Guest address space access.
//!
//! The CPU/memory emulator owns guest RAM; everything in this workspace talks
//! to it through [`GuestMemory`].  Only three primitives are required, the
//! typed helpers are built on top of them and are always little-endian.

/// A guest access touched memory outside the mapped range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid guest access of {len} bytes at {addr:08x}")]
pub struct MemError {
    pub addr: u32,
    pub len: usize,
}

pub trait GuestMemory {
    /// Whether `addr` is mapped.
    fn is_valid_address(&self, addr: u32) -> bool;

    /// Copy `buf.len()` bytes starting at `addr` into `buf`.
    fn read_into(&self, addr: u32, buf: &mut [u8]) -> Result<(), MemError>;

    /// Copy `data` into guest memory starting at `addr`.
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), MemError>;

    /// Whether all of `addr..addr + len` is mapped.  The default checks
    /// both ends, which is enough for contiguous RAM.
    fn check_range(&self, addr: u32, len: usize) -> Result<(), MemError> {
        let err = MemError { addr, len };
        if len == 0 {
            return Ok(());
        }
        let last = u32::try_from(len - 1)
            .ok()
            .and_then(|tail| addr.checked_add(tail))
            .ok_or(err)?;
        if self.is_valid_address(addr) && self.is_valid_address(last) {
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Copy `len` bytes out of guest memory.  The range is checked before
    /// anything is allocated.
    fn read_bytes(&self, addr: u32, len: usize) -> Result<Vec<u8>, MemError> {
        self.check_range(addr, len)?;
        let mut buf = vec![0u8; len];
        self.read_into(addr, &mut buf)?;
        Ok(buf)
    }

    fn read_u8(&self, addr: u32) -> Result<u8, MemError> {
        let mut raw = [0u8; 1];
        self.read_into(addr, &mut raw)?;
        Ok(raw[0])
    }

    fn read_u16(&self, addr: u32) -> Result<u16, MemError> {
        let mut raw = [0u8; 2];
        self.read_into(addr, &mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }

    fn read_u32(&self, addr: u32) -> Result<u32, MemError> {
        let mut raw = [0u8; 4];
        self.read_into(addr, &mut raw)?;
        Ok(u32::from_le_bytes(raw))
    }

    fn read_u64(&self, addr: u32) -> Result<u64, MemError> {
        let mut raw = [0u8; 8];
        self.read_into(addr, &mut raw)?;
        Ok(u64::from_le_bytes(raw))
    }

    fn write_u8(&mut self, addr: u32, v: u8) -> Result<(), MemError> {
        self.write_bytes(addr, &[v])
    }

    fn write_u16(&mut self, addr: u32, v: u16) -> Result<(), MemError> {
        self.write_bytes(addr, &v.to_le_bytes())
    }

    fn write_u32(&mut self, addr: u32, v: u32) -> Result<(), MemError> {
        self.write_bytes(addr, &v.to_le_bytes())
    }

    fn write_u64(&mut self, addr: u32, v: u64) -> Result<(), MemError> {
        self.write_bytes(addr, &v.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Memory that only knows which addresses are mapped; every access
    /// through it must be rejected by the range check first.
    struct Window {
        start: u32,
        end: u32,
    }

    impl GuestMemory for Window {
        fn is_valid_address(&self, addr: u32) -> bool {
            (self.start..self.end).contains(&addr)
        }

        fn read_into(&self, _addr: u32, buf: &mut [u8]) -> Result<(), MemError> {
            buf.fill(0xAA);
            Ok(())
        }

        fn write_bytes(&mut self, _addr: u32, _data: &[u8]) -> Result<(), MemError> {
            Ok(())
        }
    }

    #[test]
    fn default_range_check_covers_both_ends() {
        let mem = Window { start: 0x100, end: 0x200 };
        assert!(mem.check_range(0x100, 0x100).is_ok());
        assert!(mem.check_range(0x100, 0x101).is_err());
        assert!(mem.check_range(0x80, 4).is_err());
        assert!(mem.check_range(0x1000, 0).is_ok());
        assert!(mem.check_range(0x1FF, usize::MAX).is_err());
        assert_eq!(
            mem.read_bytes(0x100, 0xFFFF_FFF0),
            Err(MemError { addr: 0x100, len: 0xFFFF_FFF0 })
        );
        assert_eq!(mem.read_bytes(0x1F0, 4).unwrap(), vec![0xAA; 4]);
    }
}
