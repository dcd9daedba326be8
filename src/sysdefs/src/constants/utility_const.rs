//! Constants for the savedata utility dialog.
#![allow(dead_code)]

reversible_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u32)]
    /// Operation requested through `SceUtilitySavedataParam::mode`
    pub enum SavedataMode {
        AutoLoad = 0,
        AutoSave = 1,
        Load = 2,
        Save = 3,
        ListLoad = 4,
        ListSave = 5,
        ListDelete = 6,
        Delete = 7,
        Sizes = 8,
        List = 11,
    }
}

reversible_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u32)]
    /// Lifecycle of a utility dialog as reported by `GetStatus`
    pub enum DialogStatus {
        None = 0,
        Initialize = 1,
        Running = 2,
        Finished = 3,
        Shutdown = 4,
    }
}

impl Default for DialogStatus {
    fn default() -> Self {
        DialogStatus::None
    }
}

// ===== dialog results =====
pub const SCE_UTILITY_DIALOG_RESULT_SUCCESS: u32 = 0;
pub const SCE_UTILITY_DIALOG_RESULT_CANCEL: u32 = 1;
pub const SCE_UTILITY_DIALOG_RESULT_ABORT: u32 = 2;

// ===== controller buttons =====
pub const CTRL_SELECT: u32 = 0x0001;
pub const CTRL_START: u32 = 0x0008;
pub const CTRL_UP: u32 = 0x0010;
pub const CTRL_RIGHT: u32 = 0x0020;
pub const CTRL_DOWN: u32 = 0x0040;
pub const CTRL_LEFT: u32 = 0x0080;
pub const CTRL_LTRIGGER: u32 = 0x0100;
pub const CTRL_RTRIGGER: u32 = 0x0200;
pub const CTRL_TRIANGLE: u32 = 0x1000;
pub const CTRL_CIRCLE: u32 = 0x2000;
pub const CTRL_CROSS: u32 = 0x4000;
pub const CTRL_SQUARE: u32 = 0x8000;

// ===== savedata layout =====
pub const SAVEDATA_ROOT: &str = "ms0:/PSP/SAVEDATA/";
pub const SAVEDATA_ICON0_NAME: &str = "ICON0.PNG";
pub const SAVEDATA_ICON1_NAME: &str = "ICON1.PNG";
pub const SAVEDATA_PIC1_NAME: &str = "PIC1.PNG";
pub const SAVEDATA_SFO_NAME: &str = "PARAM.SFO";

/// Width of one entry in the guest's candidate save name list.
pub const SAVE_NAME_LIST_ENTRY_LEN: usize = 20;
/// Upper bound on candidate names scanned from one list.
pub const SAVE_NAME_LIST_MAX: usize = 256;

// ===== placeholder storage figures reported by the size query =====
pub const SAVEDATA_MS_FREE_CLUSTER_SIZE: u32 = 32768;
pub const SAVEDATA_MS_FREE_CLUSTERS: u32 = 32768;
pub const SAVEDATA_MS_FREE_KB: u32 = 1_048_576;
pub const SAVEDATA_UTILITY_CLUSTERS: u32 = 13;
pub const SAVEDATA_UTILITY_KB: u32 = 416;
