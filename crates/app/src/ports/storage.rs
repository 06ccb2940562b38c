//! Storage port: durable store for minion records.

use std::future::Future;
use std::sync::Arc;

use minionhub_domain::error::MinionHubError;
use minionhub_domain::id::MinionId;
use minionhub_domain::minion::Minion;

/// Repository persisting [`Minion`]s across restarts.
///
/// The store is the source of truth at startup only; at runtime the
/// in-memory [`Registry`](crate::registry::Registry) is authoritative.
pub trait MinionRepository {
    /// Load every persisted minion.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Minion>, MinionHubError>> + Send;

    /// Persist a new minion.
    fn create(&self, minion: Minion)
    -> impl Future<Output = Result<Minion, MinionHubError>> + Send;

    /// Overwrite a persisted minion.
    fn update(&self, minion: Minion)
    -> impl Future<Output = Result<Minion, MinionHubError>> + Send;

    /// Delete a minion by id. Deleting an absent id is not an error.
    fn delete(&self, id: MinionId) -> impl Future<Output = Result<(), MinionHubError>> + Send;
}

impl<T: MinionRepository + Send + Sync> MinionRepository for Arc<T> {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Minion>, MinionHubError>> + Send {
        (**self).get_all()
    }

    fn create(&self, minion: Minion)
    -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        (**self).create(minion)
    }

    fn update(&self, minion: Minion)
    -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        (**self).update(minion)
    }

    fn delete(&self, id: MinionId) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        (**self).delete(id)
    }
}
