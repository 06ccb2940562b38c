//! Local network device: a physically reachable device reported by discovery.

use serde::{Deserialize, Serialize};

/// A device seen on the local network, identified by its mac address.
///
/// The mac is the join key between discovery results and
/// [`MinionDevice::physical_device`](crate::minion::MinionDevice::physical_device).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalNetworkDevice {
    pub mac: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: String,
}

impl LocalNetworkDevice {
    #[must_use]
    pub fn new(mac: impl Into<String>, name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            name: name.into(),
            ip: ip.into(),
        }
    }

    /// Whether this device has the given mac (ASCII case-insensitive).
    #[must_use]
    pub fn has_mac(&self, mac: &str) -> bool {
        self.mac.eq_ignore_ascii_case(mac)
    }
}
