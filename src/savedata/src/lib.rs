// savedata - the savedata utility
//
// `param` implements the save slot convention on top of the VFS (scan a
// guest's candidate names, save, load, delete, size queries).  `dialog` is
// the frame-driven save/load/delete dialog built on it.  Drawing and
// controller input come from the host through the `ppge` and `ctrl` traits.

pub mod ctrl;
pub mod dialog;
pub mod param;
pub mod ppge;

#[cfg(test)]
mod tests;

pub use ctrl::ButtonSource;
pub use dialog::{DisplayState, SaveDialog, YesNo};
pub use param::{SaveFileInfo, SavedataManager, SavedataRequest};
pub use ppge::{AtlasImage, PpgeDraw};
