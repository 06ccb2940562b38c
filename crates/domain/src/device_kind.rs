//! Device kind: static capability descriptor keyed by `(brand, model)`.

use serde::{Deserialize, Serialize};

use crate::status::MinionType;

/// What a `(brand, model)` pair can do and how it may be bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceKind {
    pub brand: String,
    pub model: String,
    /// The only minion type a device of this kind can back.
    pub supported_minion_type: MinionType,
    /// Whether an access token must accompany new minions.
    pub is_token_required: bool,
    /// Whether several minions may share one physical mac
    /// (e.g. one IR transmitter driving several air conditioners).
    pub is_used_as_logic_device: bool,
}

impl DeviceKind {
    /// Whether this kind describes the given brand and model.
    #[must_use]
    pub fn matches(&self, brand: &str, model: &str) -> bool {
        self.brand == brand && self.model == model
    }
}

/// Find the kind matching `brand` and `model`.
///
/// When the table holds duplicates the last entry wins.
#[must_use]
pub fn lookup<'a>(kinds: &'a [DeviceKind], brand: &str, model: &str) -> Option<&'a DeviceKind> {
    kinds.iter().rev().find(|kind| kind.matches(brand, model))
}
