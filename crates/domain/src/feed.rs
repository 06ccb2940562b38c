//! Feed events: lifecycle notifications published to presentation layers.

use serde::{Deserialize, Serialize};

use crate::minion::Minion;

/// What happened to the minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedEventKind {
    Created,
    Update,
    Removed,
}

/// A single entry of the minion feed, carrying a snapshot of the minion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub event: FeedEventKind,
    pub minion: Minion,
}

impl FeedEvent {
    #[must_use]
    pub fn created(minion: Minion) -> Self {
        Self {
            event: FeedEventKind::Created,
            minion,
        }
    }

    #[must_use]
    pub fn update(minion: Minion) -> Self {
        Self {
            event: FeedEventKind::Update,
            minion,
        }
    }

    #[must_use]
    pub fn removed(minion: Minion) -> Self {
        Self {
            event: FeedEventKind::Removed,
            minion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::MinionType;

    #[test]
    fn should_serialize_event_kind_lowercase() {
        let minion = Minion::builder()
            .name("Desk lamp")
            .minion_type(MinionType::Light)
            .brand("acme")
            .model("bulb")
            .mac("aa:bb")
            .build()
            .unwrap();
        let json = serde_json::to_value(FeedEvent::update(minion)).unwrap();
        assert_eq!(json["event"], "update");
        assert_eq!(json["minion"]["name"], "Desk lamp");
    }
}
