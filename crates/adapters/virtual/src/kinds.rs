//! Device-kind table of the virtual driver.

use minionhub_domain::device_kind::DeviceKind;
use minionhub_domain::status::MinionType;

/// Brand shared by every virtual kind.
pub const BRAND: &str = "virtual";

fn kind(model: &str, minion_type: MinionType) -> DeviceKind {
    DeviceKind {
        brand: BRAND.to_string(),
        model: model.to_string(),
        supported_minion_type: minion_type,
        is_token_required: false,
        is_used_as_logic_device: false,
    }
}

/// Every kind the virtual driver can simulate.
#[must_use]
pub fn default_kinds() -> Vec<DeviceKind> {
    vec![
        kind("toggle", MinionType::Toggle),
        kind("switch", MinionType::Switch),
        DeviceKind {
            is_token_required: true,
            ..kind("secure-switch", MinionType::Switch)
        },
        kind("light", MinionType::Light),
        DeviceKind {
            is_used_as_logic_device: true,
            ..kind("ir-blaster", MinionType::AirConditioning)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use minionhub_domain::device_kind::lookup;

    #[test]
    fn should_only_share_ir_blaster() {
        let kinds = default_kinds();
        let shared: Vec<&str> = kinds
            .iter()
            .filter(|k| k.is_used_as_logic_device)
            .map(|k| k.model.as_str())
            .collect();
        assert_eq!(shared, vec!["ir-blaster"]);
    }

    #[test]
    fn should_require_token_for_secure_switch() {
        let kinds = default_kinds();
        let kind = lookup(&kinds, BRAND, "secure-switch").unwrap();
        assert!(kind.is_token_required);
        assert_eq!(kind.supported_minion_type, MinionType::Switch);
    }
}
