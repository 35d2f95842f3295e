use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

use super::AttributeKind;

/// Tag type codes the bridge knows how to model.
pub const KNOWN_TAG_TYPES: &[u16] = &[12, 13, 21, 26, 32, 52, 62, 72];

/// Which attribute slots exist for which tag type codes. An empty code list
/// means the slot exists on every known type.
const CAPABILITY_TABLE: &[(AttributeKind, &[u16])] = &[
    (AttributeKind::Alive, &[]),
    (AttributeKind::Temperature, &[]),
    (AttributeKind::BatteryPercent, &[]),
    (AttributeKind::BatteryVolt, &[]),
    (AttributeKind::LightLevel, &[]),
    (AttributeKind::TempEventState, &[]),
    (AttributeKind::LastUpdateTime, &[]),
    (AttributeKind::SecondsSinceUpdate, &[]),
    (AttributeKind::EventState, &[12, 13, 21, 26, 32, 52, 62, 72]),
    (AttributeKind::Luminosity, &[26]),
    (AttributeKind::Humidity, &[13, 21, 26, 32, 52, 62, 72]),
    (AttributeKind::Motion, &[12, 13, 21]),
    (AttributeKind::Orientation, &[12, 13, 21]),
    (AttributeKind::AxisX, &[12, 13, 21]),
    (AttributeKind::AxisY, &[12, 13, 21]),
    (AttributeKind::AxisZ, &[12, 13, 21]),
    (AttributeKind::OutOfRange, &[12, 13, 21, 26, 32, 52, 72]),
    (AttributeKind::SignalStrength, &[12, 13, 21, 26, 32, 52, 72]),
    (AttributeKind::CapEventState, &[13, 21, 26, 32, 52, 62, 72]),
    (AttributeKind::LightEventState, &[26]),
    (AttributeKind::WaterEventState, &[32]),
];

/// The ordered set of attribute slots a tag type supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<AttributeKind>);

impl CapabilitySet {
    /// Build the capability set for a tag type code.
    ///
    /// Total over [`KNOWN_TAG_TYPES`]; any other code is a configuration
    /// error and the tag must not be constructed.
    pub fn for_tag_type(tag_type: u16) -> Result<Self> {
        if !KNOWN_TAG_TYPES.contains(&tag_type) {
            return Err(DomainError::UnknownTagType(tag_type));
        }

        let set = CAPABILITY_TABLE
            .iter()
            .filter(|(_, codes)| codes.is_empty() || codes.contains(&tag_type))
            .map(|(kind, _)| *kind)
            .collect();

        Ok(Self(set))
    }

    pub fn contains(&self, kind: AttributeKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_is_rejected() {
        assert_eq!(
            CapabilitySet::for_tag_type(99),
            Err(DomainError::UnknownTagType(99))
        );
    }

    #[test]
    fn test_deterministic() {
        for &code in KNOWN_TAG_TYPES {
            let a = CapabilitySet::for_tag_type(code).unwrap();
            let b = CapabilitySet::for_tag_type(code).unwrap();
            assert_eq!(a, b, "capability set for type {code} must be stable");
        }
    }

    #[test]
    fn test_common_slots_on_every_type() {
        for &code in KNOWN_TAG_TYPES {
            let caps = CapabilitySet::for_tag_type(code).unwrap();
            for kind in [
                AttributeKind::Alive,
                AttributeKind::Temperature,
                AttributeKind::BatteryPercent,
                AttributeKind::BatteryVolt,
                AttributeKind::LastUpdateTime,
                AttributeKind::SecondsSinceUpdate,
            ] {
                assert!(caps.contains(kind), "type {code} missing {kind}");
            }
        }
    }

    #[test]
    fn test_luminosity_and_light_state_only_on_26() {
        for &code in KNOWN_TAG_TYPES {
            let caps = CapabilitySet::for_tag_type(code).unwrap();
            assert_eq!(caps.contains(AttributeKind::Luminosity), code == 26);
            assert_eq!(caps.contains(AttributeKind::LightEventState), code == 26);
        }
    }

    #[test]
    fn test_motion_family_only_on_motion_types() {
        for &code in KNOWN_TAG_TYPES {
            let caps = CapabilitySet::for_tag_type(code).unwrap();
            let expected = matches!(code, 12 | 13 | 21);
            for kind in [
                AttributeKind::Motion,
                AttributeKind::Orientation,
                AttributeKind::AxisX,
                AttributeKind::AxisY,
                AttributeKind::AxisZ,
            ] {
                assert_eq!(caps.contains(kind), expected, "type {code}, slot {kind}");
            }
        }
    }

    #[test]
    fn test_humidity_absent_on_12() {
        let caps = CapabilitySet::for_tag_type(12).unwrap();
        assert!(!caps.contains(AttributeKind::Humidity));
        assert!(!caps.contains(AttributeKind::CapEventState));
    }

    #[test]
    fn test_out_of_range_and_signal_absent_on_62() {
        let caps = CapabilitySet::for_tag_type(62).unwrap();
        assert!(!caps.contains(AttributeKind::OutOfRange));
        assert!(!caps.contains(AttributeKind::SignalStrength));
        assert!(caps.contains(AttributeKind::Humidity));
        assert!(caps.contains(AttributeKind::EventState));
    }

    #[test]
    fn test_water_state_only_on_32() {
        for &code in KNOWN_TAG_TYPES {
            let caps = CapabilitySet::for_tag_type(code).unwrap();
            assert_eq!(caps.contains(AttributeKind::WaterEventState), code == 32);
        }
    }
}
