//! Savedata manager.
//!
//! Save slots live under `<root><game><save>/`, one directory per slot,
//! holding the title's data file plus the optional icon and preview images.
//! A request is the guest's `SceUtilitySavedataParam` block; the manager
//! decodes it once when it is registered and writes results straight back
//! into guest memory.

use log::{debug, error, info, warn};
use metafs::{FileAccess, MetaFileSystem};
use sysdefs::constants::{
    SavedataMode, SAVEDATA_ICON0_NAME, SAVEDATA_ICON1_NAME, SAVEDATA_MS_FREE_CLUSTERS,
    SAVEDATA_MS_FREE_CLUSTER_SIZE, SAVEDATA_MS_FREE_KB, SAVEDATA_PIC1_NAME, SAVEDATA_ROOT,
    SAVEDATA_UTILITY_CLUSTERS, SAVEDATA_UTILITY_KB, SAVE_NAME_LIST_ENTRY_LEN, SAVE_NAME_LIST_MAX,
};
use sysdefs::data::{PspUtilitySavedataFileData, SceUtilitySavedataParam};
use typemap::datatype_conversion::sc_convert_fixed_str;
use typemap::guest_memory::{GuestMemory, MemError};
use typemap::path_conversion::split_device;

/// One candidate slot from the guest's name list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileInfo {
    pub name: String,
    /// Size of the slot's data file, 0 when it does not exist.
    pub size: u64,
    /// Position of the name in the guest's list.
    pub idx: usize,
}

/// A registered request: where the block lives and what it said.
#[derive(Debug, Clone)]
pub struct SavedataRequest {
    addr: u32,
    param: SceUtilitySavedataParam,
}

impl SavedataRequest {
    /// Decode the parameter block at `addr`.
    pub fn read(mem: &dyn GuestMemory, addr: u32) -> Result<Self, MemError> {
        let mut raw = [0u8; SceUtilitySavedataParam::SIZE];
        mem.read_into(addr, &mut raw)?;
        Ok(SavedataRequest {
            addr,
            param: SceUtilitySavedataParam::from_bytes(&raw),
        })
    }

    pub fn addr(&self) -> u32 {
        self.addr
    }

    pub fn param(&self) -> &SceUtilitySavedataParam {
        &self.param
    }

    /// `None` for modes this layer does not know.
    pub fn mode(&self) -> Option<SavedataMode> {
        SavedataMode::from_discriminant(self.param.mode).ok()
    }

    /// Store `result` in the block's result word.
    pub fn write_result(&self, mem: &mut dyn GuestMemory, result: u32) {
        let at = self.addr + SceUtilitySavedataParam::RESULT_OFFSET;
        if let Err(e) = mem.write_u32(at, result) {
            error!("savedata: cannot write result {:08x}: {}", result, e);
        }
    }
}

pub struct SavedataManager {
    root: String,
    request: Option<SavedataRequest>,
    selected_save: usize,
    save_list: Vec<SaveFileInfo>,
}

impl Default for SavedataManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedataManager {
    /// A manager rooted at the console's `ms0:/PSP/SAVEDATA/`.
    pub fn new() -> Self {
        Self::with_root(SAVEDATA_ROOT)
    }

    /// `root` is a device-qualified directory; a trailing `/` is added if
    /// missing.
    pub fn with_root(root: &str) -> Self {
        let mut root = root.to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        SavedataManager {
            root,
            request: None,
            selected_save: 0,
            save_list: Vec::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Create every missing directory on the way to the root.
    pub fn init(&self, vfs: &MetaFileSystem) {
        let Some((device, rest)) = split_device(&self.root) else {
            warn!("savedata: root {} has no device", self.root);
            return;
        };
        let mut path = device.to_string();
        for comp in rest.split('/').filter(|c| !c.is_empty()) {
            path.push('/');
            path.push_str(comp);
            if vfs.exists(&path) {
                continue;
            }
            if let Err(e) = vfs.mkdir(&path) {
                warn!("savedata: cannot create {}: {}", path, e);
                return;
            }
        }
    }

    /// Register the request at `addr` (or drop the current one) and rescan
    /// its candidate list.
    ///
    /// List-load and list-delete only keep candidates whose data file exists;
    /// every other mode keeps missing ones as size-0 slots.
    pub fn set_param(&mut self, vfs: &MetaFileSystem, mem: &dyn GuestMemory, addr: Option<u32>) {
        self.clear_param();
        let Some(addr) = addr else { return };

        let request = match SavedataRequest::read(mem, addr) {
            Ok(r) => r,
            Err(e) => {
                error!("savedata: bad parameter block: {}", e);
                return;
            }
        };

        let param = request.param();
        if param.save_name_list != 0 {
            let list_empty_file = !matches!(
                request.mode(),
                Some(SavedataMode::ListLoad) | Some(SavedataMode::ListDelete)
            );
            let game = param.game_name();
            let file = param.file_name();
            for (i, name) in read_name_list(mem, param.save_name_list).into_iter().enumerate() {
                let path = format!("{}{}{}/{}", self.root, game, name, file);
                let info = vfs.get_file_info(&path).unwrap_or_default();
                if info.exists {
                    debug!("savedata: {} exists", path);
                    self.save_list.push(SaveFileInfo { name, size: info.size, idx: i });
                } else if list_empty_file {
                    debug!("savedata: {} does not exist", path);
                    self.save_list.push(SaveFileInfo { name, size: 0, idx: i });
                }
            }
        }
        self.request = Some(request);
    }

    /// Forget the request and its scanned slots.
    pub fn clear_param(&mut self) {
        self.request = None;
        self.save_list.clear();
    }

    pub fn request(&self) -> Option<&SavedataRequest> {
        self.request.as_ref()
    }

    pub fn file_count(&self) -> usize {
        self.save_list.len()
    }

    pub fn file_info(&self, idx: usize) -> Option<&SaveFileInfo> {
        self.save_list.get(idx)
    }

    pub fn save_list(&self) -> &[SaveFileInfo] {
        &self.save_list
    }

    pub fn selected_save(&self) -> usize {
        self.selected_save
    }

    pub fn set_selected_save(&mut self, idx: usize) {
        self.selected_save = idx;
    }

    /// Directory of the slot: the `save_id`th listed candidate when a list
    /// is registered, the request's own save name otherwise.
    pub fn save_dir_path(&self, param: &SceUtilitySavedataParam, save_id: usize) -> String {
        let name = match self.save_list.get(save_id) {
            Some(slot) => slot.name.clone(),
            None => param.save_name(),
        };
        format!("{}{}{}", self.root, param.game_name(), name)
    }

    /// Listed slot `save_id` is known to be empty.
    fn slot_is_empty(&self, save_id: usize) -> bool {
        !self.save_list.is_empty() && self.save_list.get(save_id).map_or(true, |s| s.size == 0)
    }

    /// Write the data buffer (and any side images) into slot `save_id`.
    pub fn save(&self, vfs: &mut MetaFileSystem, mem: &dyn GuestMemory, save_id: usize) -> bool {
        let Some(request) = &self.request else { return false };
        let param = request.param();
        let dir = self.save_dir_path(param, save_id);

        if !vfs.exists(&dir) {
            if let Err(e) = vfs.mkdir(&dir) {
                error!("savedata: cannot create {}: {}", dir, e);
                return false;
            }
        }

        let data = match mem.read_bytes(param.data_buf, param.data_buf_size as usize) {
            Ok(d) => d,
            Err(e) => {
                error!("savedata: bad data buffer: {}", e);
                return false;
            }
        };
        let path = format!("{}/{}", dir, param.file_name());
        info!("Saving file with size {} in {}", data.len(), path);
        if let Err(e) = write_whole_file(vfs, &path, &data) {
            error!("Error writing file {}: {}", path, e);
            return false;
        }

        for (file_data, name) in [
            (&param.icon0_file_data, SAVEDATA_ICON0_NAME),
            (&param.icon1_file_data, SAVEDATA_ICON1_NAME),
            (&param.pic1_file_data, SAVEDATA_PIC1_NAME),
        ] {
            save_side_file(vfs, mem, file_data, &format!("{}/{}", dir, name));
        }
        true
    }

    /// Read slot `save_id` into the data buffer and report the byte count in
    /// the block's data size.
    pub fn load(&self, vfs: &mut MetaFileSystem, mem: &mut dyn GuestMemory, save_id: usize) -> bool {
        let Some(request) = &self.request else { return false };
        let param = request.param();
        if self.slot_is_empty(save_id) {
            return false;
        }
        let path = format!("{}/{}", self.save_dir_path(param, save_id), param.file_name());
        info!("Loading file with size {} in {}", param.data_buf_size, path);

        let handle = match vfs.open_file(&path, FileAccess::READ) {
            Ok(h) => h,
            Err(e) => {
                error!("Error opening file {}: {}", path, e);
                return false;
            }
        };
        let read = vfs.remaining_bytes(handle).and_then(|left| {
            let mut data = vec![0u8; left.min(u64::from(param.data_buf_size)) as usize];
            let n = vfs.read_file(handle, &mut data)?;
            data.truncate(n);
            Ok(data)
        });
        if let Err(e) = vfs.close_file(handle) {
            warn!("savedata: close {}: {}", path, e);
        }
        let data = match read {
            Ok(data) if data.is_empty() => {
                error!("Error reading file {}: nothing read", path);
                return false;
            }
            Ok(data) => data,
            Err(e) => {
                error!("Error reading file {}: {}", path, e);
                return false;
            }
        };

        let stored = mem.write_bytes(param.data_buf, &data).and_then(|()| {
            mem.write_u32(request.addr() + SceUtilitySavedataParam::DATA_SIZE_OFFSET, data.len() as u32)
        });
        if let Err(e) = stored {
            error!("savedata: bad data buffer: {}", e);
            return false;
        }
        true
    }

    /// Remove slot `save_id` with everything in it.
    pub fn delete(&self, vfs: &mut MetaFileSystem, save_id: usize) -> bool {
        let Some(request) = &self.request else { return false };
        if self.slot_is_empty(save_id) {
            return false;
        }
        let dir = self.save_dir_path(request.param(), save_id);
        let listing = match vfs.get_dir_listing(&dir) {
            Ok(l) => l,
            Err(e) => {
                error!("savedata: cannot delete {}: {}", dir, e);
                return false;
            }
        };
        for entry in listing.iter().filter(|e| !e.is_directory()) {
            let path = format!("{}/{}", dir, entry.name);
            if let Err(e) = vfs.delete_file(&path) {
                warn!("savedata: cannot delete {}: {}", path, e);
            }
        }
        if let Err(e) = vfs.rmdir(&dir) {
            error!("savedata: cannot remove {}: {}", dir, e);
            return false;
        }
        info!("Deleted {}", dir);
        true
    }

    /// Fill the request's free-space and usage blocks with fixed figures.
    /// Blocks at unmapped addresses are skipped.
    pub fn get_sizes(&self, mem: &mut dyn GuestMemory) -> bool {
        let Some(request) = &self.request else { return false };
        let param = request.param();

        if mem.is_valid_address(param.ms_free) {
            let at = param.ms_free;
            let written = mem
                .write_u32(at, SAVEDATA_MS_FREE_CLUSTER_SIZE)
                .and_then(|()| mem.write_u32(at + 4, SAVEDATA_MS_FREE_CLUSTERS))
                .and_then(|()| mem.write_u32(at + 8, SAVEDATA_MS_FREE_KB))
                .and_then(|()| mem.write_u8(at + 12, 0));
            if let Err(e) = written {
                warn!("savedata: msFree: {}", e);
            }
        }
        if mem.is_valid_address(param.ms_data) {
            let at = param.ms_data;
            let written = mem
                .write_u32(at + 36, 0)
                .and_then(|()| mem.write_u32(at + 40, 0))
                .and_then(|()| mem.write_u8(at + 44, 0))
                .and_then(|()| mem.write_u32(at + 52, 0))
                .and_then(|()| mem.write_u8(at + 56, 0));
            if let Err(e) = written {
                warn!("savedata: msData: {}", e);
            }
        }
        if mem.is_valid_address(param.utility_data) {
            let at = param.utility_data;
            let written = mem
                .write_u32(at, SAVEDATA_UTILITY_CLUSTERS)
                .and_then(|()| mem.write_u32(at + 4, SAVEDATA_UTILITY_KB))
                .and_then(|()| mem.write_u8(at + 8, 0))
                .and_then(|()| mem.write_u32(at + 16, SAVEDATA_UTILITY_KB))
                .and_then(|()| mem.write_u8(at + 20, 0));
            if let Err(e) = written {
                warn!("savedata: utilityData: {}", e);
            }
        }
        true
    }

    /// Report an empty id list.
    pub fn get_list(&self, mem: &mut dyn GuestMemory) -> bool {
        let Some(request) = &self.request else { return false };
        let at = request.param().id_list_addr;
        if mem.is_valid_address(at) {
            if let Err(e) = mem.write_u32(at + 4, 0) {
                warn!("savedata: idList: {}", e);
            }
        }
        true
    }
}

/// Names up to the first empty entry.
fn read_name_list(mem: &dyn GuestMemory, list_addr: u32) -> Vec<String> {
    let mut names = Vec::new();
    for i in 0..SAVE_NAME_LIST_MAX {
        let at = list_addr + (i * SAVE_NAME_LIST_ENTRY_LEN) as u32;
        match sc_convert_fixed_str(mem, at, SAVE_NAME_LIST_ENTRY_LEN) {
            Ok(name) if !name.is_empty() => names.push(name),
            Ok(_) => break,
            Err(e) => {
                warn!("savedata: name list cut short: {}", e);
                break;
            }
        }
    }
    names
}

fn write_whole_file(vfs: &mut MetaFileSystem, path: &str, data: &[u8]) -> Result<(), metafs::FsError> {
    let handle = vfs.open_file(path, FileAccess::WRITE | FileAccess::CREATE | FileAccess::TRUNCATE)?;
    let written = vfs.write_file(handle, data);
    let closed = vfs.close_file(handle);
    written?;
    closed
}

/// Side images are best effort.
fn save_side_file(vfs: &mut MetaFileSystem, mem: &dyn GuestMemory, file_data: &PspUtilitySavedataFileData, path: &str) {
    if file_data.buf == 0 {
        return;
    }
    let written = mem
        .read_bytes(file_data.buf, file_data.buf_size as usize)
        .map_err(|e| e.to_string())
        .and_then(|data| write_whole_file(vfs, path, &data).map_err(|e| e.to_string()));
    if let Err(e) = written {
        warn!("savedata: skipped {}: {}", path, e);
    }
}
