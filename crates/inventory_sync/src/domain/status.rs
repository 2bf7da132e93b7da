use common::domain::{Device, ScanResult};

/// Reachability verdict for a scan history ordered oldest first.
///
/// Online iff the history is non-empty and its last entry succeeded; a device
/// that was never scanned is offline.
pub fn derive_status(scan_results: &[ScanResult]) -> bool {
    scan_results.last().is_some_and(|scan| scan.status)
}

/// Display form of [`derive_status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reachability {
    Online,
    Offline,
}

impl Reachability {
    pub fn from_status(online: bool) -> Self {
        if online {
            Reachability::Online
        } else {
            Reachability::Offline
        }
    }

    pub fn of(device: &Device) -> Self {
        Self::from_status(derive_status(&device.scan_results))
    }

    pub fn is_online(self) -> bool {
        self == Reachability::Online
    }

    pub fn label(self) -> &'static str {
        match self {
            Reachability::Online => "Online",
            Reachability::Offline => "Offline",
        }
    }
}
