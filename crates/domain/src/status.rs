//! Minion types and their status payloads.
//!
//! [`MinionStatus`] is a tagged union: each variant belongs to exactly one
//! [`MinionType`], so "this status has no value for the minion's type" is a
//! variant mismatch rather than a missing key. On the wire the variant name
//! is the key, e.g. `{"light": {"status": "on", "brightness": 80}}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Capability class of a minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinionType {
    Toggle,
    Switch,
    Light,
    AirConditioning,
}

impl MinionType {
    /// Wire name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Switch => "switch",
            Self::Light => "light",
            Self::AirConditioning => "air_conditioning",
        }
    }
}

impl fmt::Display for MinionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary power state shared by every status payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    #[default]
    Off,
}

/// Status of a [`MinionType::Toggle`] minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Toggle {
    pub status: SwitchState,
}

/// Status of a [`MinionType::Switch`] minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Switch {
    pub status: SwitchState,
}

/// Status of a [`MinionType::Light`] minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub status: SwitchState,
    /// Percentage, `0..=100`.
    pub brightness: u8,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            status: SwitchState::Off,
            brightness: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcMode {
    #[default]
    Auto,
    Cold,
    Hot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanStrength {
    #[default]
    Auto,
    Low,
    Med,
    High,
}

/// Status of a [`MinionType::AirConditioning`] minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirConditioning {
    pub status: SwitchState,
    pub mode: AcMode,
    pub fan_strength: FanStrength,
    /// Target temperature in celsius, `16..=30`.
    pub temperature: u8,
}

impl Default for AirConditioning {
    fn default() -> Self {
        Self {
            status: SwitchState::Off,
            mode: AcMode::Auto,
            fan_strength: FanStrength::Auto,
            temperature: 24,
        }
    }
}

/// Live status of a minion, shaped by its [`MinionType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinionStatus {
    Toggle(Toggle),
    Switch(Switch),
    Light(Light),
    AirConditioning(AirConditioning),
}

impl MinionStatus {
    /// Initial status for a freshly admitted minion of the given type.
    #[must_use]
    pub fn default_for(minion_type: MinionType) -> Self {
        match minion_type {
            MinionType::Toggle => Self::Toggle(Toggle::default()),
            MinionType::Switch => Self::Switch(Switch::default()),
            MinionType::Light => Self::Light(Light::default()),
            MinionType::AirConditioning => Self::AirConditioning(AirConditioning::default()),
        }
    }

    /// The minion type this payload belongs to.
    #[must_use]
    pub fn minion_type(&self) -> MinionType {
        match self {
            Self::Toggle(_) => MinionType::Toggle,
            Self::Switch(_) => MinionType::Switch,
            Self::Light(_) => MinionType::Light,
            Self::AirConditioning(_) => MinionType::AirConditioning,
        }
    }

    /// Power state, regardless of type.
    #[must_use]
    pub fn switch_state(&self) -> SwitchState {
        match self {
            Self::Toggle(t) => t.status,
            Self::Switch(s) => s.status,
            Self::Light(l) => l.status,
            Self::AirConditioning(ac) => ac.status,
        }
    }

    /// Check value ranges of the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BrightnessOutOfRange`] or
    /// [`ValidationError::TemperatureOutOfRange`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Light(light) if light.brightness > 100 => {
                Err(ValidationError::BrightnessOutOfRange(light.brightness))
            }
            Self::AirConditioning(ac) if !(16..=30).contains(&ac.temperature) => {
                Err(ValidationError::TemperatureOutOfRange(ac.temperature))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_status_to_matching_type() {
        for minion_type in [
            MinionType::Toggle,
            MinionType::Switch,
            MinionType::Light,
            MinionType::AirConditioning,
        ] {
            assert_eq!(MinionStatus::default_for(minion_type).minion_type(), minion_type);
        }
    }

    #[test]
    fn should_serialize_status_keyed_by_type() {
        let status = MinionStatus::Light(Light {
            status: SwitchState::On,
            brightness: 80,
        });
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"light": {"status": "on", "brightness": 80}})
        );
    }

    #[test]
    fn should_parse_air_conditioning_payload() {
        let json = r#"{"air_conditioning":{"status":"on","mode":"cold","fan_strength":"high","temperature":21}}"#;
        let status: MinionStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.minion_type(), MinionType::AirConditioning);
        assert_eq!(status.switch_state(), SwitchState::On);
    }

    #[test]
    fn should_reject_payload_with_unknown_type_key() {
        let result: Result<MinionStatus, _> =
            serde_json::from_str(r#"{"roller":{"status":"on"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_brightness_above_hundred() {
        let status = MinionStatus::Light(Light {
            status: SwitchState::On,
            brightness: 101,
        });
        assert_eq!(
            status.validate(),
            Err(ValidationError::BrightnessOutOfRange(101))
        );
    }

    #[test]
    fn should_reject_temperature_out_of_range() {
        let status = MinionStatus::AirConditioning(AirConditioning {
            temperature: 40,
            ..AirConditioning::default()
        });
        assert_eq!(
            status.validate(),
            Err(ValidationError::TemperatureOutOfRange(40))
        );
    }

    #[test]
    fn should_display_type_in_snake_case() {
        assert_eq!(MinionType::AirConditioning.to_string(), "air_conditioning");
    }
}
