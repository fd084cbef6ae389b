use crate::prelude::UnitQuaternion;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RotationTrait;

#[derive(Debug, Error, Copy, Clone, PartialEq)]
pub enum AxisAngleErrors {
    #[error("magnitude of the axis is too small, should be normalizable to a magnitude of 1.0")]
    ZeroMagnitudeAxis,
}

/// A rotation of `angle` radians about a unit `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    pub angle: f64,
    pub axis: Vector3<f64>,
}

impl AxisAngle {
    const IDENTITY: Self = Self { angle: 0.0, axis: Vector3::new(1.0, 0.0, 0.0) };

    pub fn new(angle: f64, axis: Vector3<f64>) -> Result<Self, AxisAngleErrors> {
        if axis.norm() < 1e-12 {
            return Err(AxisAngleErrors::ZeroMagnitudeAxis);
        }
        let axis = axis.normalize();
        Ok(Self { angle, axis })
    }
}

impl RotationTrait for AxisAngle {
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let quaternion = UnitQuaternion::from(self);
        quaternion.rotate(v)
    }

    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let quaternion = UnitQuaternion::from(self);
        quaternion.transform(v)
    }

    fn inv(&self) -> Self {
        Self { angle: -self.angle, axis: self.axis }
    }

    fn identity() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_axis_angle_rejects_zero_axis() {
        let result = AxisAngle::new(1.0, Vector3::zeros());
        assert_eq!(result, Err(AxisAngleErrors::ZeroMagnitudeAxis));
    }

    #[test]
    fn test_axis_angle_normalizes_axis() {
        let aa = AxisAngle::new(0.5, Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert_abs_diff_eq!(aa.axis.norm(), 1.0, epsilon = TOL);
        assert_abs_diff_eq!(aa.axis[1], 0.6, epsilon = TOL);
        assert_abs_diff_eq!(aa.axis[2], 0.8, epsilon = TOL);
    }

    #[test]
    fn test_axis_angle_rotate_and_inverse() {
        let aa = AxisAngle::new(FRAC_PI_2, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let v = aa.rotate(&Vector3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = TOL);

        let back = aa
            .inv()
            .rotate(&v);
        assert_abs_diff_eq!(back, Vector3::new(1.0, 0.0, 0.0), epsilon = TOL);
        assert_abs_diff_eq!(aa.transform(&v), back, epsilon = TOL);
    }
}
