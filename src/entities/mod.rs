mod content;
mod device;
mod playlist;

pub use content::*;
pub use device::*;
pub use playlist::*;
