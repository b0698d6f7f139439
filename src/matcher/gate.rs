use crate::config::GateConfig;
use crate::joint::JointBuffer;

/// Capture volume check on the body-center joint.
///
/// When enabled, matching only runs while `|z - z_reference| < z_delta` and
/// `|x| < x_delta`. A reference joint that has not reported yet fails the check.
#[derive(Debug, Clone)]
pub struct SpatialGate {
    enabled: bool,
    reference_joint: String,
    z_reference: f64,
    z_delta: f64,
    x_delta: f64,
}

impl SpatialGate {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            enabled: config.delta_validation,
            reference_joint: config.reference_joint.clone(),
            z_reference: config.z_reference,
            z_delta: config.z_delta,
            x_delta: config.x_delta,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn reference_joint(&self) -> &str {
        &self.reference_joint
    }

    pub fn is_valid(&self, buffer: &JointBuffer) -> bool {
        if !self.enabled {
            return true;
        }
        match buffer.get(&self.reference_joint) {
            Some(center) => {
                let z_off = (center.z - self.z_reference).abs();
                let x_off = center.x.abs();
                z_off < self.z_delta && x_off < self.x_delta
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::{JointLayout, Position};

    fn gate(enabled: bool) -> SpatialGate {
        SpatialGate::from_config(&GateConfig {
            delta_validation: enabled,
            reference_joint: "SpineBase".to_string(),
            z_reference: 2.0,
            z_delta: 0.5,
            x_delta: 0.3,
        })
    }

    fn buffer_at(x: f64, z: f64) -> JointBuffer {
        let mut buf = JointBuffer::new(JointLayout::new(&["Head", "SpineBase"]));
        buf.update("SpineBase", Position::new(x, 0.0, z));
        buf
    }

    #[test]
    fn test_disabled_always_valid() {
        let empty = JointBuffer::new(JointLayout::new(&["SpineBase"]));
        assert!(gate(false).is_valid(&empty));
        assert!(gate(false).is_valid(&buffer_at(10.0, 10.0)));
    }

    #[test]
    fn test_inside_volume() {
        assert!(gate(true).is_valid(&buffer_at(0.1, 2.2)));
        assert!(gate(true).is_valid(&buffer_at(-0.2, 1.7)));
    }

    #[test]
    fn test_too_far() {
        assert!(!gate(true).is_valid(&buffer_at(0.0, 2.6)));
    }

    #[test]
    fn test_too_far_sideways() {
        assert!(!gate(true).is_valid(&buffer_at(-0.4, 2.0)));
    }

    #[test]
    fn test_bounds_are_strict() {
        assert!(!gate(true).is_valid(&buffer_at(0.0, 2.5)));
        assert!(!gate(true).is_valid(&buffer_at(0.3, 2.0)));
    }

    #[test]
    fn test_unreported_center_is_invalid() {
        let empty = JointBuffer::new(JointLayout::new(&["SpineBase"]));
        assert!(!gate(true).is_valid(&empty));
    }
}
