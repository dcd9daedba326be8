//! `SceUtilitySavedataParam`: the request block a guest hands to the
//! savedata utility.  We only ever decode it from guest memory and write a
//! couple of fields back; the guest owns the block.
#![allow(dead_code)]

use super::io_struct::{get_u32, put_u32};

/// Pointer and size pair describing one optional side file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PspUtilitySavedataFileData {
    pub buf: u32,
    pub buf_size: u32,
    pub size: u32,
    pub unknown: u32,
}

impl PspUtilitySavedataFileData {
    pub const SIZE: usize = 16;

    fn read_from(buf: &[u8], off: usize) -> Self {
        PspUtilitySavedataFileData {
            buf: get_u32(buf, off),
            buf_size: get_u32(buf, off + 4),
            size: get_u32(buf, off + 8),
            unknown: get_u32(buf, off + 12),
        }
    }

    fn write_to(&self, buf: &mut [u8], off: usize) {
        put_u32(buf, off, self.buf);
        put_u32(buf, off + 4, self.buf_size);
        put_u32(buf, off + 8, self.size);
        put_u32(buf, off + 12, self.unknown);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SceUtilitySavedataParam {
    pub size: u32,
    pub language: u32,
    pub button_swap: u32,
    pub result: u32,
    /// Raw mode word; see `SavedataMode::from_discriminant`.
    pub mode: u32,
    pub bind: u32,
    pub overwrite: u32,
    pub game_name: [u8; 13],
    pub save_name: [u8; 20],
    pub save_name_list: u32,
    pub file_name: [u8; 13],
    pub data_buf: u32,
    pub data_buf_size: u32,
    pub data_size: u32,
    pub icon0_file_data: PspUtilitySavedataFileData,
    pub icon1_file_data: PspUtilitySavedataFileData,
    pub pic1_file_data: PspUtilitySavedataFileData,
    pub snd0_file_data: PspUtilitySavedataFileData,
    pub focus: u32,
    pub ms_free: u32,
    pub ms_data: u32,
    pub utility_data: u32,
    pub id_list_addr: u32,
}

impl SceUtilitySavedataParam {
    pub const SIZE: usize = 1536;

    pub const SIZE_OFFSET: u32 = 0;
    pub const BUTTON_SWAP_OFFSET: u32 = 8;
    pub const RESULT_OFFSET: u32 = 28;
    pub const MODE_OFFSET: u32 = 48;
    pub const GAME_NAME_OFFSET: u32 = 60;
    pub const SAVE_NAME_OFFSET: u32 = 76;
    pub const SAVE_NAME_LIST_OFFSET: u32 = 96;
    pub const FILE_NAME_OFFSET: u32 = 100;
    pub const DATA_BUF_OFFSET: u32 = 116;
    pub const DATA_BUF_SIZE_OFFSET: u32 = 120;
    pub const DATA_SIZE_OFFSET: u32 = 124;
    pub const ICON0_OFFSET: u32 = 1412;
    pub const ICON1_OFFSET: u32 = 1428;
    pub const PIC1_OFFSET: u32 = 1444;
    pub const SND0_OFFSET: u32 = 1460;
    pub const FOCUS_OFFSET: u32 = 1480;
    pub const MS_FREE_OFFSET: u32 = 1488;
    pub const MS_DATA_OFFSET: u32 = 1492;
    pub const UTILITY_DATA_OFFSET: u32 = 1496;
    pub const ID_LIST_ADDR_OFFSET: u32 = 1524;

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        let field = |off: u32| get_u32(buf, off as usize);
        let mut game_name = [0u8; 13];
        game_name.copy_from_slice(&buf[60..73]);
        let mut save_name = [0u8; 20];
        save_name.copy_from_slice(&buf[76..96]);
        let mut file_name = [0u8; 13];
        file_name.copy_from_slice(&buf[100..113]);

        SceUtilitySavedataParam {
            size: field(Self::SIZE_OFFSET),
            language: field(4),
            button_swap: field(Self::BUTTON_SWAP_OFFSET),
            result: field(Self::RESULT_OFFSET),
            mode: field(Self::MODE_OFFSET),
            bind: field(52),
            overwrite: field(56),
            game_name,
            save_name,
            save_name_list: field(Self::SAVE_NAME_LIST_OFFSET),
            file_name,
            data_buf: field(Self::DATA_BUF_OFFSET),
            data_buf_size: field(Self::DATA_BUF_SIZE_OFFSET),
            data_size: field(Self::DATA_SIZE_OFFSET),
            icon0_file_data: PspUtilitySavedataFileData::read_from(buf, Self::ICON0_OFFSET as usize),
            icon1_file_data: PspUtilitySavedataFileData::read_from(buf, Self::ICON1_OFFSET as usize),
            pic1_file_data: PspUtilitySavedataFileData::read_from(buf, Self::PIC1_OFFSET as usize),
            snd0_file_data: PspUtilitySavedataFileData::read_from(buf, Self::SND0_OFFSET as usize),
            focus: field(Self::FOCUS_OFFSET),
            ms_free: field(Self::MS_FREE_OFFSET),
            ms_data: field(Self::MS_DATA_OFFSET),
            utility_data: field(Self::UTILITY_DATA_OFFSET),
            id_list_addr: field(Self::ID_LIST_ADDR_OFFSET),
        }
    }

    /// Encode the block.  Fields not modelled here (title strings, the
    /// reserved areas) are left zero.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let mut field = |off: u32, v: u32| put_u32(&mut buf, off as usize, v);
        field(Self::SIZE_OFFSET, self.size);
        field(4, self.language);
        field(Self::BUTTON_SWAP_OFFSET, self.button_swap);
        field(Self::RESULT_OFFSET, self.result);
        field(Self::MODE_OFFSET, self.mode);
        field(52, self.bind);
        field(56, self.overwrite);
        field(Self::SAVE_NAME_LIST_OFFSET, self.save_name_list);
        field(Self::DATA_BUF_OFFSET, self.data_buf);
        field(Self::DATA_BUF_SIZE_OFFSET, self.data_buf_size);
        field(Self::DATA_SIZE_OFFSET, self.data_size);
        field(Self::FOCUS_OFFSET, self.focus);
        field(Self::MS_FREE_OFFSET, self.ms_free);
        field(Self::MS_DATA_OFFSET, self.ms_data);
        field(Self::UTILITY_DATA_OFFSET, self.utility_data);
        field(Self::ID_LIST_ADDR_OFFSET, self.id_list_addr);
        buf[60..73].copy_from_slice(&self.game_name);
        buf[76..96].copy_from_slice(&self.save_name);
        buf[100..113].copy_from_slice(&self.file_name);
        self.icon0_file_data.write_to(&mut buf, Self::ICON0_OFFSET as usize);
        self.icon1_file_data.write_to(&mut buf, Self::ICON1_OFFSET as usize);
        self.pic1_file_data.write_to(&mut buf, Self::PIC1_OFFSET as usize);
        self.snd0_file_data.write_to(&mut buf, Self::SND0_OFFSET as usize);
        buf
    }

    pub fn game_name(&self) -> String {
        fixed_to_string(&self.game_name)
    }

    pub fn save_name(&self) -> String {
        fixed_to_string(&self.save_name)
    }

    pub fn file_name(&self) -> String {
        fixed_to_string(&self.file_name)
    }
}

/// Read a NUL-padded field.  A field with no NUL uses every byte.
pub fn fixed_to_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(buf: &mut [u8], off: u32, v: u32) {
        let off = off as usize;
        buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn decode_request_block() {
        let mut raw = [0u8; SceUtilitySavedataParam::SIZE];
        put(&mut raw, 0, 1536);
        put(&mut raw, SceUtilitySavedataParam::BUTTON_SWAP_OFFSET, 1);
        put(&mut raw, SceUtilitySavedataParam::MODE_OFFSET, 5);
        raw[60..69].copy_from_slice(b"ULUS10000");
        raw[76..81].copy_from_slice(b"SLOT1");
        raw[100..108].copy_from_slice(b"DATA.BIN");
        put(&mut raw, SceUtilitySavedataParam::DATA_BUF_OFFSET, 0x0880_0000);
        put(&mut raw, SceUtilitySavedataParam::DATA_BUF_SIZE_OFFSET, 64);
        put(&mut raw, SceUtilitySavedataParam::ICON1_OFFSET + 4, 99);
        put(&mut raw, SceUtilitySavedataParam::ID_LIST_ADDR_OFFSET, 0x0890_0000);

        let param = SceUtilitySavedataParam::from_bytes(&raw);
        assert_eq!(param.size, 1536);
        assert_eq!(param.button_swap, 1);
        assert_eq!(param.mode, 5);
        assert_eq!(param.game_name(), "ULUS10000");
        assert_eq!(param.save_name(), "SLOT1");
        assert_eq!(param.file_name(), "DATA.BIN");
        assert_eq!(param.data_buf, 0x0880_0000);
        assert_eq!(param.data_buf_size, 64);
        assert_eq!(param.icon1_file_data.buf_size, 99);
        assert_eq!(param.id_list_addr, 0x0890_0000);
    }

    #[test]
    fn encode_matches_decode() {
        let mut param = SceUtilitySavedataParam::default();
        param.mode = 4;
        param.game_name[..4].copy_from_slice(b"GAME");
        param.data_size = 77;
        param.pic1_file_data.buf = 0x0881_0000;
        let raw = param.to_bytes();
        assert_eq!(&raw[60..64], b"GAME");
        assert_eq!(&raw[124..128], &77u32.to_le_bytes());
        assert_eq!(SceUtilitySavedataParam::from_bytes(&raw), param);
    }

    #[test]
    fn unterminated_name_uses_whole_field() {
        assert_eq!(fixed_to_string(b"ABCDEFGHIJKLM"), "ABCDEFGHIJKLM");
    }
}
