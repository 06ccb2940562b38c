//! Common error types used across the workspace.
//!
//! Every layer converts into [`MinionHubError`] via `#[from]`. Domain and
//! admission failures carry a stable [`ErrorCode`] that presentation layers
//! expose verbatim.

use std::fmt;

use crate::status::MinionType;

/// Stable numeric codes for domain and admission failures.
///
/// The numeric values are part of the wire contract and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// The referenced minion does not exist.
    MinionNotFound = 4004,
    /// The status payload has no value for the minion's own type.
    StatusTypeMismatch = 4122,
    /// No device kind matches the claimed brand/model.
    UnsupportedModel = 4222,
    /// The device kind requires a token and none was supplied.
    TokenRequired = 4322,
    /// The mac is already bound to a non-shareable minion.
    DeviceInUse = 4422,
    /// The device mac is not currently visible in network discovery.
    DeviceUnreachable = 4522,
}

impl ErrorCode {
    /// Numeric value of the code.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_u16().fmt(f)
    }
}

/// Top-level error for all minionhub operations.
#[derive(Debug, thiserror::Error)]
pub enum MinionHubError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("device driver failure")]
    Driver(#[from] DriverError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("network discovery error")]
    Discovery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MinionHubError {
    /// Stable code for domain and admission failures, `None` for everything else.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::NotFound(_) => Some(ErrorCode::MinionNotFound),
            Self::TypeMismatch(_) => Some(ErrorCode::StatusTypeMismatch),
            Self::Admission(err) => Some(err.code()),
            Self::Validation(_) | Self::Driver(_) | Self::Storage(_) | Self::Discovery(_) => None,
        }
    }
}

/// A referenced record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not exist")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A status payload was addressed at a minion of another type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("incorrect minion status, expected {expected} but got {actual}")]
pub struct TypeMismatchError {
    pub expected: MinionType,
    pub actual: MinionType,
}

/// Reasons a new minion is refused admission to the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("there is no supported model for brand {brand} and model {model}")]
    UnsupportedModel { brand: String, model: String },

    #[error("token is required for brand {brand} and model {model}")]
    TokenRequired { brand: String, model: String },

    #[error("device {mac} already in use at other minion")]
    DeviceInUse { mac: String },

    #[error("device {mac} not exist in lan network")]
    DeviceUnreachable { mac: String },
}

impl AdmissionError {
    /// Stable code for this admission failure.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedModel { .. } => ErrorCode::UnsupportedModel,
            Self::TokenRequired { .. } => ErrorCode::TokenRequired,
            Self::DeviceInUse { .. } => ErrorCode::DeviceInUse,
            Self::DeviceUnreachable { .. } => ErrorCode::DeviceUnreachable,
        }
    }
}

/// Structural invariant violations of domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("mac must not be empty")]
    EmptyMac,

    #[error("brightness {0} is out of range 0..=100")]
    BrightnessOutOfRange(u8),

    #[error("temperature {0} is out of range 16..=30")]
    TemperatureOutOfRange(u8),
}

/// Failures reported by a device driver while talking to a physical device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("device {mac} is not responding")]
    Unreachable { mac: String },

    #[error("device {mac} rejected the command: {reason}")]
    Rejected { mac: String, reason: String },

    #[error("no driver handles brand {brand} and model {model}")]
    UnsupportedDevice { brand: String, model: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_wire_codes_stable() {
        assert_eq!(ErrorCode::MinionNotFound.as_u16(), 4004);
        assert_eq!(ErrorCode::StatusTypeMismatch.as_u16(), 4122);
        assert_eq!(ErrorCode::UnsupportedModel.as_u16(), 4222);
        assert_eq!(ErrorCode::TokenRequired.as_u16(), 4322);
        assert_eq!(ErrorCode::DeviceInUse.as_u16(), 4422);
        assert_eq!(ErrorCode::DeviceUnreachable.as_u16(), 4522);
    }

    #[test]
    fn should_map_admission_errors_to_codes() {
        let err: MinionHubError = AdmissionError::DeviceInUse {
            mac: "aa:bb".to_string(),
        }
        .into();
        assert_eq!(err.code(), Some(ErrorCode::DeviceInUse));

        let err: MinionHubError = AdmissionError::DeviceUnreachable {
            mac: "aa:bb".to_string(),
        }
        .into();
        assert_eq!(err.code(), Some(ErrorCode::DeviceUnreachable));
    }

    #[test]
    fn should_map_not_found_to_4004() {
        let err: MinionHubError = NotFoundError {
            entity: "Minion",
            id: "A1".to_string(),
        }
        .into();
        assert_eq!(err.code(), Some(ErrorCode::MinionNotFound));
        assert_eq!(err.to_string(), "Minion A1 not exist");
    }

    #[test]
    fn should_have_no_code_for_driver_failures() {
        let err: MinionHubError = DriverError::Unreachable {
            mac: "aa:bb".to_string(),
        }
        .into();
        assert_eq!(err.code(), None);
    }

    #[test]
    fn should_display_code_as_number() {
        assert_eq!(ErrorCode::TokenRequired.to_string(), "4322");
    }
}
