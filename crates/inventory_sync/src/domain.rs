mod dashboard;
mod fetchers;
mod reconciliation_poller;
mod search;
mod session_service;
mod snapshot;
mod status;
mod workflow;
mod workflow_controller;

pub use dashboard::*;
pub use fetchers::*;
pub use reconciliation_poller::*;
pub use search::*;
pub use session_service::*;
pub use snapshot::*;
pub use status::*;
pub use workflow::*;
pub use workflow_controller::*;
