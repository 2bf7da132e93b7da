mod device;
mod inventory;
mod reference;
mod result;
mod scan_result;
mod timestamp;

pub use device::*;
pub use inventory::*;
pub use reference::*;
pub use result::*;
pub use scan_result::*;
pub use timestamp::*;
