//! Guest records exchanged by the file I/O calls.
//!
//! Every record is encoded field by field in little-endian order.  The byte
//! offsets below are part of the guest ABI.
#![allow(dead_code)]

use crate::constants::io_const::{
    DIRENT_PRIVATE_SENTINEL, MEMSTICK_FREE_BYTES, MEMSTICK_MAX_SECTORS, MEMSTICK_SECTORS_PER_CLUSTER,
    MEMSTICK_SECTOR_SIZE, MEMSTICK_TOTAL_BYTES, STAT_FILL_BYTE,
};

pub(crate) fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_i64(buf: &mut [u8], off: usize, v: i64) {
    buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

pub(crate) fn get_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

pub(crate) fn get_i64(buf: &[u8], off: usize) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[off..off + 8]);
    i64::from_le_bytes(raw)
}

/// Calendar time as the guest stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScePspDateTime {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub microsecond: u32,
}

impl ScePspDateTime {
    pub const SIZE: usize = 16;

    /// The value a timestamp holds when nothing filled it in.
    pub const FILLER: ScePspDateTime = ScePspDateTime {
        year: 0xFEFE,
        month: 0xFEFE,
        day: 0xFEFE,
        hour: 0xFEFE,
        minute: 0xFEFE,
        second: 0xFEFE,
        microsecond: 0xFEFE_FEFE,
    };

    pub fn write_to(&self, buf: &mut [u8]) {
        put_u16(buf, 0, self.year);
        put_u16(buf, 2, self.month);
        put_u16(buf, 4, self.day);
        put_u16(buf, 6, self.hour);
        put_u16(buf, 8, self.minute);
        put_u16(buf, 10, self.second);
        put_u32(buf, 12, self.microsecond);
    }

    pub fn read_from(buf: &[u8]) -> Self {
        ScePspDateTime {
            year: get_u16(buf, 0),
            month: get_u16(buf, 2),
            day: get_u16(buf, 4),
            hour: get_u16(buf, 6),
            minute: get_u16(buf, 8),
            second: get_u16(buf, 10),
            microsecond: get_u32(buf, 12),
        }
    }
}

/// `SceIoStat`, 88 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceIoStat {
    pub st_mode: i32,
    pub st_attr: u32,
    pub st_size: i64,
    pub st_ctime: ScePspDateTime,
    pub st_atime: ScePspDateTime,
    pub st_mtime: ScePspDateTime,
    /// `st_private[0]` carries the backend's start sector.
    pub st_private: [u32; 6],
}

impl SceIoStat {
    pub const SIZE: usize = 88;

    /// A record with every byte set to 0xFE, which is what the guest sees in
    /// any field the stat call does not know how to fill.
    pub fn filled() -> Self {
        let word = u32::from_le_bytes([STAT_FILL_BYTE; 4]);
        SceIoStat {
            st_mode: word as i32,
            st_attr: word,
            st_size: i64::from_le_bytes([STAT_FILL_BYTE; 8]),
            st_ctime: ScePspDateTime::FILLER,
            st_atime: ScePspDateTime::FILLER,
            st_mtime: ScePspDateTime::FILLER,
            st_private: [word; 6],
        }
    }

    pub fn write_to(&self, buf: &mut [u8]) {
        put_u32(buf, 0, self.st_mode as u32);
        put_u32(buf, 4, self.st_attr);
        put_i64(buf, 8, self.st_size);
        self.st_ctime.write_to(&mut buf[16..32]);
        self.st_atime.write_to(&mut buf[32..48]);
        self.st_mtime.write_to(&mut buf[48..64]);
        for (i, p) in self.st_private.iter().enumerate() {
            put_u32(buf, 64 + i * 4, *p);
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        self.write_to(&mut buf);
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        let mut st_private = [0u32; 6];
        for (i, p) in st_private.iter_mut().enumerate() {
            *p = get_u32(buf, 64 + i * 4);
        }
        SceIoStat {
            st_mode: get_u32(buf, 0) as i32,
            st_attr: get_u32(buf, 4),
            st_size: get_i64(buf, 8),
            st_ctime: ScePspDateTime::read_from(&buf[16..32]),
            st_atime: ScePspDateTime::read_from(&buf[32..48]),
            st_mtime: ScePspDateTime::read_from(&buf[48..64]),
            st_private,
        }
    }
}

/// `SceIoDirEnt`, 348 bytes: stat record, NUL-padded name, private word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceIoDirEnt {
    pub d_stat: SceIoStat,
    pub d_name: String,
    pub d_private: u32,
}

impl SceIoDirEnt {
    pub const SIZE: usize = 348;
    pub const NAME_LEN: usize = 256;
    const NAME_OFFSET: usize = 88;
    const PRIVATE_OFFSET: usize = 344;

    pub fn new(d_stat: SceIoStat, name: &str) -> Self {
        SceIoDirEnt {
            d_stat,
            d_name: name.to_string(),
            d_private: DIRENT_PRIVATE_SENTINEL,
        }
    }

    /// Encode the entry.  Names longer than the field are cut to 256 bytes
    /// with no terminator, the same as `strncpy`.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        self.d_stat.write_to(&mut buf[..SceIoStat::SIZE]);
        let name = self.d_name.as_bytes();
        let n = name.len().min(Self::NAME_LEN);
        buf[Self::NAME_OFFSET..Self::NAME_OFFSET + n].copy_from_slice(&name[..n]);
        put_u32(&mut buf, Self::PRIVATE_OFFSET, self.d_private);
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        let mut stat = [0u8; SceIoStat::SIZE];
        stat.copy_from_slice(&buf[..SceIoStat::SIZE]);
        let name_field = &buf[Self::NAME_OFFSET..Self::NAME_OFFSET + Self::NAME_LEN];
        let end = name_field.iter().position(|&b| b == 0).unwrap_or(Self::NAME_LEN);
        SceIoDirEnt {
            d_stat: SceIoStat::from_bytes(&stat),
            d_name: String::from_utf8_lossy(&name_field[..end]).into_owned(),
            d_private: get_u32(buf, Self::PRIVATE_OFFSET),
        }
    }
}

/// Capacity report returned by the memory stick size query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSize {
    pub max_sectors: u32,
    pub sector_size: u32,
    pub sectors_per_cluster: u32,
    pub total_clusters: u32,
    pub free_clusters: u32,
}

impl DeviceSize {
    pub const SIZE: usize = 20;

    /// The emulated 2 GiB stick with 1 GiB free; 95% of each is reported as
    /// usable.
    pub fn memstick() -> Self {
        let cluster_bytes = (MEMSTICK_SECTOR_SIZE * MEMSTICK_SECTORS_PER_CLUSTER) as u64;
        DeviceSize {
            max_sectors: MEMSTICK_MAX_SECTORS,
            sector_size: MEMSTICK_SECTOR_SIZE,
            sectors_per_cluster: MEMSTICK_SECTORS_PER_CLUSTER,
            total_clusters: ((MEMSTICK_TOTAL_BYTES * 95 / 100) / cluster_bytes) as u32,
            free_clusters: ((MEMSTICK_FREE_BYTES * 95 / 100) / cluster_bytes) as u32,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        put_u32(&mut buf, 0, self.max_sectors);
        put_u32(&mut buf, 4, self.sector_size);
        put_u32(&mut buf, 8, self.sectors_per_cluster);
        put_u32(&mut buf, 12, self.total_clusters);
        put_u32(&mut buf, 16, self.free_clusters);
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        DeviceSize {
            max_sectors: get_u32(buf, 0),
            sector_size: get_u32(buf, 4),
            sectors_per_cluster: get_u32(buf, 8),
            total_clusters: get_u32(buf, 12),
            free_clusters: get_u32(buf, 16),
        }
    }
}
