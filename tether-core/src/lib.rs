pub mod codec;
pub mod model;
pub mod signaling;

pub use codec::*;
pub use model::*;
pub use signaling::*;
