mod session;
mod session_command;
mod session_manager;
mod session_observer;

pub use session::*;
pub use session_command::*;
pub use session_manager::*;
pub use session_observer::*;
