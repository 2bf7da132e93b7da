mod session;
mod session_guard;

pub use session::*;
pub use session_guard::*;
