//! Status synchronizer: keeps cached minion status in line with the devices.
//!
//! Two paths feed the cache:
//! - **pull**: [`StatusSynchronizer::poll_one`] / [`StatusSynchronizer::poll_all`]
//!   read each device through the driver. These updates are silent, no feed
//!   event is published.
//! - **push**: [`StatusSynchronizer::apply_status_change`] handles changes the
//!   devices report on their own, and publishes an `update` event.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use minionhub_domain::error::{MinionHubError, NotFoundError};
use minionhub_domain::feed::FeedEvent;
use minionhub_domain::id::MinionId;

use crate::feed::MinionFeed;
use crate::ports::{DeviceDriver, StatusChange};
use crate::registry::Registry;

/// Pause between two devices of a batch.
///
/// Some transports share a broadcast medium and cannot handle back-to-back
/// queries.
pub const DEFAULT_INTER_DEVICE_DELAY: Duration = Duration::from_secs(1);

/// Outcome of a poll batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Minions whose status was read successfully.
    pub succeeded: usize,
    /// Minions whose read failed.
    pub failed: usize,
    /// Whether the batch stopped early on cancellation.
    pub cancelled: bool,
}

/// Sequential, rate-limited poller over the registry.
pub struct StatusSynchronizer<D> {
    driver: Arc<D>,
    registry: Arc<Registry>,
    feed: Arc<MinionFeed>,
    inter_device_delay: Duration,
    batch_gate: tokio::sync::Mutex<()>,
}

impl<D: DeviceDriver> StatusSynchronizer<D> {
    #[must_use]
    pub fn new(driver: Arc<D>, registry: Arc<Registry>, feed: Arc<MinionFeed>) -> Self {
        Self {
            driver,
            registry,
            feed,
            inter_device_delay: DEFAULT_INTER_DEVICE_DELAY,
            batch_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_inter_device_delay(mut self, delay: Duration) -> Self {
        self.inter_device_delay = delay;
        self
    }

    /// Read the live status of one minion and cache it.
    ///
    /// On success the minion is marked as properly communicated and its
    /// status overwritten. On failure it is marked as not properly
    /// communicated and its status is left unchanged. A status of another
    /// type than the minion's counts as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::NotFound`] if the id is absent, otherwise the
    /// driver failure or [`MinionHubError::TypeMismatch`].
    pub async fn poll_one(&self, id: MinionId) -> Result<(), MinionHubError> {
        let minion = self.registry.get(id).ok_or_else(|| NotFoundError {
            entity: "Minion",
            id: id.to_string(),
        })?;

        let outcome = match self.driver.get_status(&minion).await {
            Ok(status) => minion
                .ensure_status_type(&status)
                .map(|()| status)
                .map_err(MinionHubError::from),
            Err(err) => Err(err.into()),
        };

        // The minion may have been deleted while the driver was busy.
        match outcome {
            Ok(status) => {
                self.registry.update(id, |m| {
                    m.status = status;
                    m.is_properly_communicated = true;
                });
                Ok(())
            }
            Err(err) => {
                self.registry.update(id, |m| m.is_properly_communicated = false);
                tracing::warn!(minion_id = %id, name = %minion.name, %err, "failed to read minion status");
                Err(err)
            }
        }
    }

    /// Poll every minion once, one after the other. Never cancelled.
    pub async fn poll_all(&self) -> PollSummary {
        self.poll_all_until(&CancellationToken::new()).await
    }

    /// Poll every minion once, stopping between devices when `cancel` fires.
    ///
    /// A failure on one device never aborts the batch. Batches are
    /// serialized: a second call waits for the running one to finish.
    /// Minions created during the batch are not visited; minions deleted
    /// during the batch are skipped.
    pub async fn poll_all_until(&self, cancel: &CancellationToken) -> PollSummary {
        let _batch = self.batch_gate.lock().await;
        let ids = self.registry.ids();
        let mut summary = PollSummary::default();

        for (index, id) in ids.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            match self.poll_one(*id).await {
                Ok(()) => summary.succeeded += 1,
                Err(MinionHubError::NotFound(_)) => {}
                Err(_) => summary.failed += 1,
            }

            if index + 1 < ids.len() {
                tokio::select! {
                    () = cancel.cancelled() => {
                        summary.cancelled = true;
                        break;
                    }
                    () = tokio::time::sleep(self.inter_device_delay) => {}
                }
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "minion status poll finished"
        );
        summary
    }

    /// Cache a device-pushed status change on the first minion bound to its
    /// mac and publish an `update` event.
    ///
    /// Returns the id of the updated minion, or `None` when no minion is
    /// bound to the mac or the status does not fit the minion's type.
    pub fn apply_status_change(&self, change: &StatusChange) -> Option<MinionId> {
        let applied = self.registry.update_first_by_mac(&change.mac, |m| {
            if let Err(err) = m.ensure_status_type(&change.status) {
                tracing::warn!(minion_id = %m.id, %err, "ignoring pushed status");
                return None;
            }
            m.status = change.status;
            m.is_properly_communicated = true;
            self.feed.publish(FeedEvent::update(m.clone()));
            Some(m.id)
        });

        match applied {
            None => {
                tracing::info!(mac = %change.mac, "avoiding device update, no minion with this mac");
                None
            }
            Some(id) => id,
        }
    }
}
