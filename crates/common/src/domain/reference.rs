use serde::{Deserialize, Serialize};

/// Physical location a device is installed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

/// Device category (router, printer, server, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon_name: Option<String>,
}
