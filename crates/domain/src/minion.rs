//! Minion: the logical representation of a controllable device.
//!
//! A minion binds a display name and a capability class ([`MinionType`]) to a
//! physical device identified by mac. Several minions may share one mac when
//! the device kind allows it.
//!
//! Per-minion communication lifecycle:
//!
//! ```text
//! Unknown ──ok──▶ Communicating ◀──ok── Unreachable
//!    │                  └────failure────▶    ▲
//!    └──────────────failure──────────────────┘
//! ```
//!
//! Delete moves a minion from any state to the terminal `Removed`.
//! `Unknown` and `Unreachable` both read as `is_properly_communicated = false`.

use serde::{Deserialize, Serialize};

use crate::error::{MinionHubError, TypeMismatchError, ValidationError};
use crate::id::MinionId;
use crate::network::LocalNetworkDevice;
use crate::status::{MinionStatus, MinionType};

/// Physical binding of a minion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinionDevice {
    pub physical_device: LocalNetworkDevice,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl MinionDevice {
    /// Mac of the bound physical device.
    #[must_use]
    pub fn mac(&self) -> &str {
        &self.physical_device.mac
    }
}

/// A logical controllable device held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minion {
    pub id: MinionId,
    pub name: String,
    pub minion_type: MinionType,
    pub device: MinionDevice,
    pub status: MinionStatus,
    pub is_properly_communicated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_turn_off_ms: Option<u64>,
}

impl Minion {
    /// Create a builder for constructing a [`Minion`].
    #[must_use]
    pub fn builder() -> MinionBuilder {
        MinionBuilder::default()
    }

    /// Whether this minion is bound to the given mac (ASCII case-insensitive).
    #[must_use]
    pub fn has_mac(&self, mac: &str) -> bool {
        self.device.physical_device.has_mac(mac)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::Validation`] when the name or mac is empty,
    /// or [`MinionHubError::TypeMismatch`] when the status shape does not
    /// correspond to `minion_type`.
    pub fn validate(&self) -> Result<(), MinionHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.device.mac().is_empty() {
            return Err(ValidationError::EmptyMac.into());
        }
        self.ensure_status_type(&self.status)?;
        Ok(())
    }

    /// Check that `status` declares a value for this minion's own type.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatchError`] on a variant mismatch.
    pub fn ensure_status_type(&self, status: &MinionStatus) -> Result<(), TypeMismatchError> {
        let actual = status.minion_type();
        if actual == self.minion_type {
            Ok(())
        } else {
            Err(TypeMismatchError {
                expected: self.minion_type,
                actual,
            })
        }
    }
}

/// Client-supplied candidate for a new minion.
///
/// Carries no id and no status: both are server-derived. The claimed
/// `minion_type` is never trusted and is overwritten during admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMinion {
    pub name: String,
    #[serde(default)]
    pub minion_type: Option<MinionType>,
    pub device: MinionDevice,
    #[serde(default)]
    pub auto_turn_off_ms: Option<u64>,
}

impl NewMinion {
    /// Check structural invariants of the candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name or mac is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.device.mac().is_empty() {
            return Err(ValidationError::EmptyMac);
        }
        Ok(())
    }

    /// Turn an admitted candidate into a registry entry with a fresh id.
    ///
    /// The minion starts with the default status of its type and is not
    /// considered properly communicated until a status read succeeds.
    #[must_use]
    pub fn into_minion(self, id: MinionId, minion_type: MinionType) -> Minion {
        Minion {
            id,
            name: self.name,
            minion_type,
            device: self.device,
            status: MinionStatus::default_for(minion_type),
            is_properly_communicated: false,
            auto_turn_off_ms: self.auto_turn_off_ms,
        }
    }
}

/// Step-by-step builder for [`Minion`].
#[derive(Debug, Default)]
pub struct MinionBuilder {
    id: Option<MinionId>,
    name: Option<String>,
    minion_type: Option<MinionType>,
    brand: Option<String>,
    model: Option<String>,
    token: Option<String>,
    physical_device: LocalNetworkDevice,
    status: Option<MinionStatus>,
    is_properly_communicated: bool,
    auto_turn_off_ms: Option<u64>,
}

impl MinionBuilder {
    #[must_use]
    pub fn id(mut self, id: MinionId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn minion_type(mut self, minion_type: MinionType) -> Self {
        self.minion_type = Some(minion_type);
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn mac(mut self, mac: impl Into<String>) -> Self {
        self.physical_device.mac = mac.into();
        self
    }

    #[must_use]
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.physical_device.ip = ip.into();
        self
    }

    #[must_use]
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.physical_device.name = name.into();
        self
    }

    #[must_use]
    pub fn status(mut self, status: MinionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn is_properly_communicated(mut self, value: bool) -> Self {
        self.is_properly_communicated = value;
        self
    }

    #[must_use]
    pub fn auto_turn_off_ms(mut self, ms: u64) -> Self {
        self.auto_turn_off_ms = Some(ms);
        self
    }

    /// Consume the builder, validate, and return a [`Minion`].
    ///
    /// The type falls back to the status' type, then to
    /// [`MinionType::Toggle`]; the status falls back to the type's default.
    ///
    /// # Errors
    ///
    /// Returns [`MinionHubError::Validation`] if the name or mac is missing,
    /// or [`MinionHubError::TypeMismatch`] if status and type disagree.
    pub fn build(self) -> Result<Minion, MinionHubError> {
        let minion_type = self
            .minion_type
            .or_else(|| self.status.map(|s| s.minion_type()))
            .unwrap_or(MinionType::Toggle);
        let minion = Minion {
            id: self.id.unwrap_or_else(MinionId::generate),
            name: self.name.unwrap_or_default(),
            minion_type,
            device: MinionDevice {
                physical_device: self.physical_device,
                brand: self.brand.unwrap_or_default(),
                model: self.model.unwrap_or_default(),
                token: self.token,
            },
            status: self
                .status
                .unwrap_or_else(|| MinionStatus::default_for(minion_type)),
            is_properly_communicated: self.is_properly_communicated,
            auto_turn_off_ms: self.auto_turn_off_ms,
        };
        minion.validate()?;
        Ok(minion)
    }
}
