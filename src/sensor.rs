mod emulator;
mod kind;
mod reading;

pub use emulator::*;
pub use kind::*;
pub use reading::*;
