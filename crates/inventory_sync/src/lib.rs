pub mod domain;
pub mod poll_scheduler;

pub use domain::*;
pub use poll_scheduler::*;
