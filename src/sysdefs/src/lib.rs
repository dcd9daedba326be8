//! Definitions shared by every layer of the HLE I/O subsystem.
//!
//! `constants` holds the numeric ABI surface the guest sees (open flags,
//! result codes, devctl command numbers, savedata modes, controller bits).
//! `data` holds the fixed-layout guest structures together with explicit
//! little-endian encode/decode routines.  Nothing here depends on native
//! struct layout.

pub mod constants;
pub mod data;
