pub mod io_struct;
pub mod savedata_struct;

pub use io_struct::{DeviceSize, SceIoDirEnt, SceIoStat, ScePspDateTime};
pub use savedata_struct::*;
