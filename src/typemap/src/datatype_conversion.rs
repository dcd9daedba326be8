//! Guest string conversion API
//!
//! Guest calls pass strings either as NUL-terminated pointers or as
//! fixed-width, NUL-padded fields inside a struct.  Function naming follows
//! the usual convention here:
//! - `sc_` functions are the public API used by the call layers.
//! - everything else is an internal helper.
use crate::guest_memory::{GuestMemory, MemError};

/// Longest path a guest call may pass.
pub const GUEST_PATH_MAX: usize = 1024;

fn trim_at_nul(raw: &[u8]) -> &[u8] {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    &raw[..end]
}

/// `sc_convert_cstr` reads a NUL-terminated guest string.
///
/// ## Arguments:
/// mem: guest memory
/// addr: address of the first byte
/// max: upper bound on the bytes scanned; a string without a NUL inside
///      that bound is cut at `max`
///
/// ## Returns:
/// the decoded string (invalid UTF-8 replaced), or the faulting access
pub fn sc_convert_cstr<M: GuestMemory + ?Sized>(mem: &M, addr: u32, max: usize) -> Result<String, MemError> {
    let mut out = Vec::new();
    for i in 0..max {
        let b = mem.read_u8(addr.wrapping_add(i as u32))?;
        if b == 0 {
            break;
        }
        out.push(b);
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// `sc_convert_fixed_str` reads a fixed-width, NUL-padded field of `len`
/// bytes.  All `len` bytes must be mapped.
pub fn sc_convert_fixed_str<M: GuestMemory + ?Sized>(mem: &M, addr: u32, len: usize) -> Result<String, MemError> {
    let raw = mem.read_bytes(addr, len)?;
    Ok(String::from_utf8_lossy(trim_at_nul(&raw)).into_owned())
}

/// `sc_convert_bounded_str` reads exactly `len` bytes as text, NULs
/// included.  Used for output channels that pass an explicit length.
pub fn sc_convert_bounded_str<M: GuestMemory + ?Sized>(mem: &M, addr: u32, len: usize) -> Result<String, MemError> {
    let raw = mem.read_bytes(addr, len)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Encode `s` into a NUL-padded field of width `N`, cutting it if needed.
pub fn sc_pack_fixed_str<const N: usize>(s: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let n = s.len().min(N);
    out[..n].copy_from_slice(&s.as_bytes()[..n]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_memory::FlatMemory;

    #[test]
    fn cstr_stops_at_nul() {
        let mut mem = FlatMemory::new(0x100, 64);
        mem.write_bytes(0x100, b"ms0:/A\0junk").unwrap();
        assert_eq!(sc_convert_cstr(&mem, 0x100, GUEST_PATH_MAX).unwrap(), "ms0:/A");
        assert_eq!(sc_convert_cstr(&mem, 0x100, 3).unwrap(), "ms0");
    }

    #[test]
    fn cstr_running_off_memory_fails() {
        let mut mem = FlatMemory::new(0x100, 4);
        mem.write_bytes(0x100, b"abcd").unwrap();
        assert!(sc_convert_cstr(&mem, 0x100, 16).is_err());
    }

    #[test]
    fn fixed_fields() {
        let mut mem = FlatMemory::new(0x100, 64);
        mem.write_bytes(0x100, &sc_pack_fixed_str::<13>("ULUS10000")).unwrap();
        assert_eq!(sc_convert_fixed_str(&mem, 0x100, 13).unwrap(), "ULUS10000");
        assert_eq!(sc_pack_fixed_str::<4>("ABCDEF"), *b"ABCD");
    }

    #[test]
    fn bounded_keeps_every_byte() {
        let mut mem = FlatMemory::new(0x100, 64);
        mem.write_bytes(0x100, b"hi\n").unwrap();
        assert_eq!(sc_convert_bounded_str(&mem, 0x100, 3).unwrap(), "hi\n");
    }
}
