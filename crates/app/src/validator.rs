//! Admission control for new minions.
//!
//! Resolves the device kind of a candidate, checks its credentials and mac
//! binding, and replaces the client's type claim with the kind's type.

use minionhub_domain::device_kind::{self, DeviceKind};
use minionhub_domain::error::AdmissionError;
use minionhub_domain::minion::NewMinion;
use minionhub_domain::status::MinionType;

use crate::registry::Registry;

/// Admit `candidate` or explain why it is refused.
///
/// On success `candidate.minion_type` is overwritten with the type supported
/// by its device kind, whatever the client claimed, and that type is
/// returned. On failure the candidate is left untouched.
///
/// # Errors
///
/// - [`AdmissionError::UnsupportedModel`] when no kind matches brand/model
/// - [`AdmissionError::TokenRequired`] when the kind needs a token and none
///   (or an empty one) was supplied
/// - [`AdmissionError::DeviceInUse`] when the kind cannot be shared and the
///   mac is already bound to a registered minion
pub fn admit(
    candidate: &mut NewMinion,
    kinds: &[DeviceKind],
    registry: &Registry,
) -> Result<MinionType, AdmissionError> {
    let device = &candidate.device;
    let kind = device_kind::lookup(kinds, &device.brand, &device.model).ok_or_else(|| {
        AdmissionError::UnsupportedModel {
            brand: device.brand.clone(),
            model: device.model.clone(),
        }
    })?;

    let has_token = device.token.as_deref().is_some_and(|t| !t.is_empty());
    if kind.is_token_required && !has_token {
        return Err(AdmissionError::TokenRequired {
            brand: device.brand.clone(),
            model: device.model.clone(),
        });
    }

    if !kind.is_used_as_logic_device && registry.is_mac_bound(device.mac()) {
        return Err(AdmissionError::DeviceInUse {
            mac: device.mac().to_string(),
        });
    }

    if candidate.minion_type.is_some_and(|claimed| claimed != kind.supported_minion_type) {
        tracing::debug!(
            claimed = ?candidate.minion_type,
            actual = %kind.supported_minion_type,
            "ignoring client minion type claim"
        );
    }
    candidate.minion_type = Some(kind.supported_minion_type);
    Ok(kind.supported_minion_type)
}
