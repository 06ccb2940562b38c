//! Reconciliation of registry entries against network discovery results.

use minionhub_domain::network::LocalNetworkDevice;

use crate::registry::Registry;

/// Overwrite the physical device of every minion whose mac appears in
/// `discovered`, returning how many minions were touched.
///
/// Minions whose mac is missing from `discovered` are left as they are;
/// staleness only shows through later failed status reads.
pub fn reconcile(registry: &Registry, discovered: &[LocalNetworkDevice]) -> usize {
    let mut touched = 0;
    for device in discovered {
        touched += registry.update_all_by_mac(&device.mac, |minion| {
            minion.device.physical_device = device.clone();
        });
    }
    tracing::debug!(devices = discovered.len(), touched, "reconciled minions with network");
    touched
}
