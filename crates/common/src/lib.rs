pub mod auth;
pub mod domain;
pub mod garde;
pub mod http;
pub mod telemetry;

pub use domain::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockInventoryApi;
