//! Minion feed: replay-latest broadcast of lifecycle events.
//!
//! Unlike a plain fire-and-forget bus, the feed remembers the last published
//! event and hands it to every new subscriber before any later event.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt as _};

use minionhub_domain::feed::FeedEvent;

/// Multi-subscriber feed backed by a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers.
pub struct MinionFeed {
    sender: broadcast::Sender<FeedEvent>,
    latest: Mutex<Option<FeedEvent>>,
}

impl MinionFeed {
    /// Create a feed whose subscribers may lag by at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            latest: Mutex::new(None),
        }
    }

    /// Publish an event to all current subscribers and remember it for
    /// future ones.
    pub fn publish(&self, event: FeedEvent) {
        let mut latest = self.lock_latest();
        *latest = Some(event.clone());
        // Send only fails without receivers, which is fine.
        let _ = self.sender.send(event);
    }

    /// Subscribe to the feed.
    ///
    /// The returned subscription yields the last published event first (if
    /// any), then every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> FeedSubscription {
        let latest = self.lock_latest();
        FeedSubscription {
            replay: latest.clone(),
            receiver: self.sender.subscribe(),
        }
    }

    /// The most recently published event.
    #[must_use]
    pub fn latest(&self) -> Option<FeedEvent> {
        self.lock_latest().clone()
    }

    fn lock_latest(&self) -> MutexGuard<'_, Option<FeedEvent>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A single subscriber's view of the [`MinionFeed`].
pub struct FeedSubscription {
    replay: Option<FeedEvent>,
    receiver: broadcast::Receiver<FeedEvent>,
}

impl FeedSubscription {
    /// Receive the next event.
    ///
    /// # Errors
    ///
    /// Returns [`broadcast::error::RecvError::Lagged`] when this subscriber
    /// fell behind, or `Closed` once the feed is dropped.
    pub async fn recv(&mut self) -> Result<FeedEvent, broadcast::error::RecvError> {
        if let Some(event) = self.replay.take() {
            return Ok(event);
        }
        self.receiver.recv().await
    }

    /// Convert into a [`Stream`], e.g. for server-sent events.
    pub fn into_stream(
        self,
    ) -> impl Stream<Item = Result<FeedEvent, BroadcastStreamRecvError>> + Send + 'static {
        tokio_stream::iter(self.replay.map(Ok)).chain(BroadcastStream::new(self.receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::minion;
    use minionhub_domain::feed::FeedEventKind;
    use minionhub_domain::status::MinionType;

    #[tokio::test]
    async fn should_deliver_event_to_every_subscriber() {
        let feed = MinionFeed::new(16);
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        let lamp = minion("Lamp", MinionType::Light, "aa:bb");
        feed.publish(FeedEvent::created(lamp.clone()));

        assert_eq!(first.recv().await.unwrap().minion.id, lamp.id);
        assert_eq!(second.recv().await.unwrap().minion.id, lamp.id);
    }

    #[tokio::test]
    async fn should_replay_latest_event_to_late_subscriber() {
        let feed = MinionFeed::new(16);
        let lamp = minion("Lamp", MinionType::Light, "aa:bb");
        let plug = minion("Plug", MinionType::Switch, "cc:dd");
        feed.publish(FeedEvent::created(lamp));
        feed.publish(FeedEvent::update(plug.clone()));

        let mut late = feed.subscribe();
        let replayed = late.recv().await.unwrap();
        assert_eq!(replayed.event, FeedEventKind::Update);
        assert_eq!(replayed.minion.id, plug.id);

        feed.publish(FeedEvent::removed(plug.clone()));
        let next = late.recv().await.unwrap();
        assert_eq!(next.event, FeedEventKind::Removed);
    }

    #[tokio::test]
    async fn should_have_nothing_to_replay_before_first_publish() {
        let feed = MinionFeed::new(16);
        assert!(feed.latest().is_none());

        let mut sub = feed.subscribe();
        let lamp = minion("Lamp", MinionType::Light, "aa:bb");
        feed.publish(FeedEvent::created(lamp.clone()));
        assert_eq!(sub.recv().await.unwrap().minion.id, lamp.id);
    }

    #[tokio::test]
    async fn should_succeed_without_subscribers() {
        let feed = MinionFeed::new(16);
        feed.publish(FeedEvent::created(minion("Lamp", MinionType::Light, "aa:bb")));
        assert!(feed.latest().is_some());
    }

    #[tokio::test]
    async fn should_stream_replay_then_live_events_in_order() {
        let feed = MinionFeed::new(16);
        let lamp = minion("Lamp", MinionType::Light, "aa:bb");
        feed.publish(FeedEvent::created(lamp.clone()));

        let mut stream = Box::pin(feed.subscribe().into_stream());
        feed.publish(FeedEvent::update(lamp.clone()));

        let kinds: Vec<FeedEventKind> = vec![
            stream.next().await.unwrap().unwrap().event,
            stream.next().await.unwrap().unwrap().event,
        ];
        assert_eq!(kinds, vec![FeedEventKind::Created, FeedEventKind::Update]);
    }
}
