// savedata test suite
//
// A `save:` device on a temporary directory, flat guest memory holding one
// parameter block, a scripted controller and a renderer that records what
// it was asked to draw.


use std::cell::Cell;

use metafs::{shared, DirectoryFileSystem, MetaFileSystem};
use sysdefs::constants::SavedataMode;
use sysdefs::data::SceUtilitySavedataParam;
use tempfile::TempDir;
use typemap::datatype_conversion::sc_pack_fixed_str;
use typemap::flat_memory::{FlatMemory, USER_MEMORY_BASE};
use typemap::guest_memory::GuestMemory;

use crate::ctrl::ButtonSource;
use crate::param::SavedataManager;
use crate::ppge::{AtlasImage, PpgeDraw};

pub const GAME: &str = "ULUS10000";
pub const FILE: &str = "DATA.BIN";

/// The parameter block.
pub const PARAM: u32 = USER_MEMORY_BASE;
/// Candidate name list, 20 bytes per entry.
pub const NAMES: u32 = USER_MEMORY_BASE + 0x1000;
/// Save data buffer.
pub const DATA: u32 = USER_MEMORY_BASE + 0x2000;
pub const ICON0: u32 = USER_MEMORY_BASE + 0x3000;
pub const MS_FREE: u32 = USER_MEMORY_BASE + 0x4000;
pub const MS_DATA: u32 = USER_MEMORY_BASE + 0x4100;
pub const UTILITY_DATA: u32 = USER_MEMORY_BASE + 0x4200;
pub const ID_LIST: u32 = USER_MEMORY_BASE + 0x4300;
pub const UNMAPPED: u32 = 0x0100_0000;

/// Setup function for tests: `save:` mounted on an empty directory.
/// The TempDir must outlive the VFS, so it is handed back as well.
pub fn test_setup() -> (TempDir, MetaFileSystem, FlatMemory) {
    let root = tempfile::tempdir().unwrap();
    let mut vfs = MetaFileSystem::new();
    vfs.mount("save:", shared(DirectoryFileSystem::new(root.path())));
    (root, vfs, FlatMemory::default())
}

pub fn manager() -> SavedataManager {
    SavedataManager::with_root("save:/")
}

/// A request for `mode` with `data` in the data buffer and, if given, a
/// candidate list.
pub fn write_request(mem: &mut FlatMemory, mode: SavedataMode, names: Option<&[&str]>, data: &[u8]) {
    let mut param = SceUtilitySavedataParam {
        size: SceUtilitySavedataParam::SIZE as u32,
        mode: mode as u32,
        game_name: sc_pack_fixed_str(GAME),
        save_name: sc_pack_fixed_str("SLOT0"),
        file_name: sc_pack_fixed_str(FILE),
        data_buf: DATA,
        data_buf_size: data.len() as u32,
        ..Default::default()
    };
    if let Some(names) = names {
        param.save_name_list = NAMES;
        for (i, name) in names.iter().enumerate() {
            let entry: [u8; 20] = sc_pack_fixed_str(name);
            mem.write_bytes(NAMES + 20 * i as u32, &entry).unwrap();
        }
        mem.write_bytes(NAMES + 20 * names.len() as u32, &[0u8; 20]).unwrap();
    }
    mem.write_bytes(DATA, data).unwrap();
    mem.write_bytes(PARAM, &param.to_bytes()).unwrap();
}

/// Patch one u32 field of the block already in memory.
pub fn set_field(mem: &mut FlatMemory, offset: u32, value: u32) {
    mem.write_u32(PARAM + offset, value).unwrap();
}

pub fn result_word(mem: &FlatMemory) -> u32 {
    mem.read_u32(PARAM + SceUtilitySavedataParam::RESULT_OFFSET).unwrap()
}

/// Put a slot on disk directly.
pub fn put_slot(root: &TempDir, slot: &str, data: &[u8]) {
    let dir = root.path().join(format!("{}{}", GAME, slot));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(FILE), data).unwrap();
}

pub fn slot_path(root: &TempDir, slot: &str) -> std::path::PathBuf {
    root.path().join(format!("{}{}", GAME, slot))
}

/// Controller whose mask the test sets between frames.
#[derive(Default)]
pub struct Pad(pub Cell<u32>);

impl Pad {
    pub fn set(&self, buttons: u32) {
        self.0.set(buttons);
    }
}

impl ButtonSource for Pad {
    fn peek_buttons(&self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Begin,
    End,
    Text { text: String, x: f32, y: f32, color: u32 },
    Patch { x: f32, y: f32, w: f32, h: f32, color: u32 },
    Image { image: AtlasImage, x: f32, y: f32 },
}

#[derive(Default)]
pub struct Recorder {
    pub calls: Vec<DrawCall>,
}

impl Recorder {
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_color(&self, wanted: &str) -> Option<u32> {
        self.calls.iter().find_map(|c| match c {
            DrawCall::Text { text, color, .. } if text == wanted => Some(*color),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl PpgeDraw for Recorder {
    fn begin(&mut self) {
        self.calls.push(DrawCall::Begin);
    }

    fn end(&mut self) {
        self.calls.push(DrawCall::End);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _align: u32, _scale: f32, color: u32) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn draw_4patch(&mut self, _image: AtlasImage, x: f32, y: f32, w: f32, h: f32, color: u32) {
        self.calls.push(DrawCall::Patch { x, y, w, h, color });
    }

    fn draw_image(&mut self, image: AtlasImage, x: f32, y: f32, _w: f32, _h: f32, _align: u32, _color: u32) {
        self.calls.push(DrawCall::Image { image, x, y });
    }
}
