mod frame_assembler;
mod media_frame;

pub use frame_assembler::*;
pub use media_frame::*;
