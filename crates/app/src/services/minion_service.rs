//! Minion service: the facade over registry, admission, reconciliation,
//! status synchronization and the feed.
//!
//! Constructed once at process start with the three collaborators, then
//! shared (typically behind an `Arc`) by every presentation layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use minionhub_domain::error::{AdmissionError, MinionHubError, NotFoundError};
use minionhub_domain::feed::FeedEvent;
use minionhub_domain::id::MinionId;
use minionhub_domain::minion::{Minion, NewMinion};
use minionhub_domain::network::LocalNetworkDevice;
use minionhub_domain::status::MinionStatus;

use crate::feed::{FeedSubscription, MinionFeed};
use crate::ports::{DeviceDriver, MinionRepository, NetworkDiscovery, StatusChange};
use crate::reconciler::reconcile;
use crate::registry::Registry;
use crate::synchronizer::{DEFAULT_INTER_DEVICE_DELAY, PollSummary, StatusSynchronizer};
use crate::validator;

/// Tuning of the synchronization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub inter_device_delay: Duration,
    pub feed_capacity: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            inter_device_delay: DEFAULT_INTER_DEVICE_DELAY,
            feed_capacity: 256,
        }
    }
}

fn not_found(id: MinionId) -> NotFoundError {
    NotFoundError {
        entity: "Minion",
        id: id.to_string(),
    }
}

/// Facade of the minion synchronization core.
pub struct MinionService<R, D, N> {
    repo: R,
    driver: Arc<D>,
    discovery: N,
    registry: Arc<Registry>,
    feed: Arc<MinionFeed>,
    synchronizer: StatusSynchronizer<D>,
    admission: tokio::sync::Mutex<()>,
    loaded: AtomicBool,
}

impl<R, D, N> MinionService<R, D, N>
where
    R: MinionRepository + Send + Sync,
    D: DeviceDriver + Send + Sync,
    N: NetworkDiscovery + Send + Sync,
{
    /// Create a service backed by the given collaborators.
    ///
    /// The registry starts empty. It is loaded from storage by
    /// [`Self::initialize`] (or [`Self::run`]), or by the first
    /// [`Self::create_minion`] if that comes earlier.
    ///
    /// A `feed_capacity` of zero is raised to one.
    pub fn new(repo: R, driver: D, discovery: N, settings: SyncSettings) -> Self {
        let driver = Arc::new(driver);
        let registry = Arc::new(Registry::new());
        let feed = Arc::new(MinionFeed::new(settings.feed_capacity.max(1)));
        let synchronizer = StatusSynchronizer::new(
            Arc::clone(&driver),
            Arc::clone(&registry),
            Arc::clone(&feed),
        )
        .with_inter_device_delay(settings.inter_device_delay);
        Self {
            repo,
            driver,
            discovery,
            registry,
            feed,
            synchronizer,
            admission: tokio::sync::Mutex::new(()),
            loaded: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn feed(&self) -> &MinionFeed {
        &self.feed
    }

    /// Subscribe to the minion feed, latest event first.
    #[must_use]
    pub fn subscribe_feed(&self) -> FeedSubscription {
        self.feed.subscribe()
    }

    /// Load the registry, refresh the network, reconcile and poll every
    /// minion once.
    ///
    /// Each step's failure is logged and the next step still runs with
    /// whatever state was reached.
    pub async fn initialize(&self) {
        self.initialize_until(&CancellationToken::new()).await;
    }

    async fn initialize_until(&self, cancel: &CancellationToken) {
        {
            let _admission = self.admission.lock().await;
            if let Err(err) = self.load_once().await {
                tracing::error!(%err, "failed to load minions from storage");
            }
        }

        if let Err(err) = self.discovery.rescan().await {
            tracing::error!(%err, "failed to rescan local network");
        }

        match self.discovery.list_devices().await {
            Ok(devices) => {
                reconcile(&self.registry, &devices);
            }
            Err(err) => tracing::error!(%err, "failed to list local network devices"),
        }

        self.synchronizer.poll_all_until(cancel).await;
    }

    /// Fill the registry from storage unless that already happened.
    ///
    /// Callers hold the admission gate, so no create can be admitted
    /// against a registry that does not reflect the store yet.
    async fn load_once(&self) -> Result<(), MinionHubError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }
        let minions = self.repo.get_all().await?;
        tracing::info!(count = minions.len(), "loaded minions from storage");
        self.registry.load(minions);
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    /// Follow device-pushed status changes and network updates until
    /// `shutdown` fires or both sources close.
    pub async fn listen(&self, shutdown: CancellationToken) {
        let changes = self.driver.subscribe_status_changes();
        let updates = self.discovery.subscribe_updates();
        self.listen_on(changes, updates, &shutdown).await;
    }

    /// [`Self::initialize`] followed by [`Self::listen`].
    ///
    /// Sources are subscribed before initialization, so changes pushed while
    /// the initial poll runs are applied afterwards instead of being lost.
    pub async fn run(&self, shutdown: CancellationToken) {
        let changes = self.driver.subscribe_status_changes();
        let updates = self.discovery.subscribe_updates();
        self.initialize_until(&shutdown).await;
        self.listen_on(changes, updates, &shutdown).await;
    }

    async fn listen_on(
        &self,
        mut changes: broadcast::Receiver<StatusChange>,
        mut updates: broadcast::Receiver<Vec<LocalNetworkDevice>>,
        shutdown: &CancellationToken,
    ) {
        let mut changes_open = true;
        let mut updates_open = true;

        while changes_open || updates_open {
            tokio::select! {
                () = shutdown.cancelled() => break,
                received = changes.recv(), if changes_open => match received {
                    Ok(change) => {
                        self.synchronizer.apply_status_change(&change);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "status change listener lagged");
                    }
                    Err(RecvError::Closed) => changes_open = false,
                },
                received = updates.recv(), if updates_open => match received {
                    Ok(devices) => {
                        reconcile(&self.registry, &devices);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "network update listener lagged");
                    }
                    Err(RecvError::Closed) => updates_open = false,
                },
            }
        }

        tracing::info!("minion listener stopped");
    }

    /// Every registered minion, in registration order.
    #[must_use]
    pub fn list_minions(&self) -> Vec<Minion> {
        self.registry.list()
    }

    /// Look up a minion by id.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::NotFound`] when no minion with `id` exists.
    pub fn get_minion(&self, id: MinionId) -> Result<Minion, MinionHubError> {
        self.registry.get(id).ok_or_else(|| not_found(id).into())
    }

    /// Admit, persist and register a new minion, then read its status once.
    ///
    /// The `created` event is published before the status read, whose
    /// failure is ignored. Returns the minion as registered after that read.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::Validation`] for an empty name or mac,
    /// [`MinionHubError::Admission`] when admission fails or the mac is not
    /// visible on the network (checked before anything is persisted), or a
    /// discovery / storage error.
    #[tracing::instrument(skip_all, fields(name = %candidate.name, mac = %candidate.device.mac()))]
    pub async fn create_minion(&self, mut candidate: NewMinion) -> Result<Minion, MinionHubError> {
        candidate.validate()?;

        let minion = {
            let _admission = self.admission.lock().await;
            self.load_once().await?;
            let minion_type =
                validator::admit(&mut candidate, self.driver.device_kinds(), &self.registry)?;

            let devices = self.discovery.list_devices().await?;
            let physical = devices
                .into_iter()
                .find(|device| device.has_mac(candidate.device.mac()))
                .ok_or_else(|| AdmissionError::DeviceUnreachable {
                    mac: candidate.device.mac().to_string(),
                })?;
            candidate.device.physical_device = physical;

            let minion = candidate.into_minion(MinionId::generate(), minion_type);
            let minion = self.repo.create(minion).await?;
            let feed = &self.feed;
            if !self
                .registry
                .insert(minion.clone(), |m| feed.publish(FeedEvent::created(m.clone())))
            {
                tracing::error!(minion_id = %minion.id, "minion id already registered");
            }
            minion
        };
        tracing::info!(minion_id = %minion.id, minion_type = %minion.minion_type, "minion created");

        if let Err(err) = self.synchronizer.poll_one(minion.id).await {
            tracing::debug!(minion_id = %minion.id, %err, "initial status read failed");
        }

        Ok(self.registry.get(minion.id).unwrap_or(minion))
    }

    /// Remove a minion from storage and from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::NotFound`] when no minion with `id` exists,
    /// or a storage error, in which case the minion stays registered.
    #[tracing::instrument(skip(self), fields(minion_id = %id))]
    pub async fn delete_minion(&self, id: MinionId) -> Result<(), MinionHubError> {
        let minion = self.get_minion(id)?;
        self.repo.delete(id).await?;

        let feed = &self.feed;
        if self
            .registry
            .remove(id, |m| feed.publish(FeedEvent::removed(m.clone())))
            .is_none()
        {
            feed.publish(FeedEvent::removed(minion));
        }
        tracing::info!("minion removed");
        Ok(())
    }

    /// Apply a new status through the driver, then cache and publish it.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::NotFound`], [`MinionHubError::TypeMismatch`]
    /// when `status` belongs to another minion type,
    /// [`MinionHubError::Validation`] for out-of-range values, or the
    /// driver failure untouched. The cached status only changes on success.
    #[tracing::instrument(skip(self, status), fields(minion_id = %id))]
    pub async fn set_status(
        &self,
        id: MinionId,
        status: MinionStatus,
    ) -> Result<Minion, MinionHubError> {
        let minion = self.get_minion(id)?;
        minion.ensure_status_type(&status)?;
        status.validate()?;

        self.driver.set_status(&minion, status).await?;

        let feed = &self.feed;
        self.registry
            .update(id, |m| {
                m.status = status;
                let snapshot = m.clone();
                feed.publish(FeedEvent::update(snapshot.clone()));
                snapshot
            })
            .ok_or_else(|| not_found(id).into())
    }

    /// Overwrite the auto-off timeout of a minion, persist and publish it.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::NotFound`] or a storage error.
    #[tracing::instrument(skip(self), fields(minion_id = %id))]
    pub async fn set_timeout(
        &self,
        id: MinionId,
        auto_turn_off_ms: Option<u64>,
    ) -> Result<Minion, MinionHubError> {
        let mut minion = self.get_minion(id)?;
        minion.auto_turn_off_ms = auto_turn_off_ms;
        self.repo.update(minion).await?;

        let feed = &self.feed;
        self.registry
            .update(id, |m| {
                m.auto_turn_off_ms = auto_turn_off_ms;
                let snapshot = m.clone();
                feed.publish(FeedEvent::update(snapshot.clone()));
                snapshot
            })
            .ok_or_else(|| not_found(id).into())
    }

    /// Poll every minion's status.
    pub async fn rescan_all(&self) -> PollSummary {
        self.synchronizer.poll_all().await
    }

    /// Poll one minion's status. A device failure is only reflected in
    /// `is_properly_communicated`.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::NotFound`] when no minion with `id` exists.
    #[tracing::instrument(skip(self), fields(minion_id = %id))]
    pub async fn rescan_one(&self, id: MinionId) -> Result<(), MinionHubError> {
        match self.synchronizer.poll_one(id).await {
            Err(err @ MinionHubError::NotFound(_)) => Err(err),
            _ => Ok(()),
        }
    }
}
