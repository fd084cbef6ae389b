use crate::axis_angle::{AxisAngle, AxisAngleErrors};

use super::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;
use thiserror::Error;

/// A struct representing a quaternion for 3D rotations.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Errors that can occur when creating a `Quaternion`.
#[derive(Debug, Clone, Error, Copy, PartialEq)]
pub enum QuaternionErrors {
    #[error("{0}")]
    AxisAngleErrors(#[from] AxisAngleErrors),
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
}

impl Quaternion {
    /// No rotation.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Creates a new `Quaternion`. No normalization is applied.
    ///
    /// # Arguments
    ///
    /// * `x` - The x component of the quaternion.
    /// * `y` - The y component of the quaternion.
    /// * `z` - The z component of the quaternion.
    /// * `w` - The scalar component of the quaternion.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// The vector part of the quaternion.
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    // Dot product of two quaternions
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// The conjugate. For a unit quaternion this is also the inverse.
    pub fn inv(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn mag(&self) -> f64 {
        self.dot(self)
            .sqrt()
    }

    pub fn normalize(&self) -> Result<Self, QuaternionErrors> {
        let mag = self.mag();
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.x / mag,
            self.y / mag,
            self.z / mag,
            self.w / mag,
        ))
    }
}

/// A quaternion of unit magnitude, used as a rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct UnitQuaternion(pub Quaternion);

impl UnitQuaternion {
    pub const IDENTITY: Self = Self(Quaternion::IDENTITY);

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Result<Self, QuaternionErrors> {
        Ok(Self(
            Quaternion::new(x, y, z, w).normalize()?,
        ))
    }

    /// Builds the rotation of `|r|` radians about `r / |r|`.
    /// A vector too short to define an axis gives the identity rather than NaN.
    pub fn from_rotation_vector(r: &Vector3<f64>) -> Self {
        let angle = r.norm();
        if angle < f64::EPSILON {
            return Self::IDENTITY;
        }
        let half_angle = angle / 2.0;
        let s = half_angle.sin() / angle;
        Self(Quaternion::new(
            s * r[0],
            s * r[1],
            s * r[2],
            half_angle.cos(),
        ))
    }

    /// Advances the orientation by a body-frame angular velocity `omega`
    /// held constant over `dt`, then restores unit magnitude.
    ///
    /// # Arguments
    ///
    /// * `omega` - Angular velocity in the body frame (rad/s).
    /// * `dt` - Step length in seconds.
    ///
    /// # Returns
    ///
    /// The orientation at the end of the step.
    pub fn integrate(&self, omega: &Vector3<f64>, dt: f64) -> Self {
        (*self * Self::from_rotation_vector(&(omega * dt))).renormalize()
    }

    /// Divides out any drift of the magnitude away from 1.0.
    pub fn renormalize(&self) -> Self {
        match self
            .0
            .normalize()
        {
            Ok(q) => Self(q),
            Err(_) => *self,
        }
    }

    pub fn mag(&self) -> f64 {
        self.0
            .mag()
    }
}

impl RotationTrait for UnitQuaternion {
    /// Rotates a vector by the quaternion, `q v q*`.
    /// Active rotation, Markley/Crassidis section 2.4.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be rotated.
    ///
    /// # Returns
    ///
    /// The rotated vector.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let (q1, q2, q3, q4) = (
            self.0
                .x,
            self.0
                .y,
            self.0
                .z,
            self.0
                .w,
        );

        let out1 = (q1 * q1 - q2 * q2 - q3 * q3 + q4 * q4) * v[0]
            + 2.0 * (q1 * q2 - q3 * q4) * v[1]
            + 2.0 * (q1 * q3 + q2 * q4) * v[2];

        let out2 = 2.0 * (q2 * q1 + q3 * q4) * v[0]
            + (-q1 * q1 + q2 * q2 - q3 * q3 + q4 * q4) * v[1]
            + 2.0 * (q2 * q3 - q1 * q4) * v[2];

        let out3 = 2.0 * (q3 * q1 - q2 * q4) * v[0]
            + 2.0 * (q3 * q2 + q1 * q4) * v[1]
            + (-q1 * q1 - q2 * q2 + q3 * q3 + q4 * q4) * v[2];

        Vector3::new(out1, out2, out3)
    }

    /// Transforms a vector by the quaternion, `q* v q`.
    /// Passive rotation, the transpose of `rotate`.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed vector.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let (q1, q2, q3, q4) = (
            self.0
                .x,
            self.0
                .y,
            self.0
                .z,
            self.0
                .w,
        );

        let out1 = (q1 * q1 - q2 * q2 - q3 * q3 + q4 * q4) * v[0]
            + 2.0 * (q1 * q2 + q3 * q4) * v[1]
            + 2.0 * (q1 * q3 - q2 * q4) * v[2];

        let out2 = 2.0 * (q2 * q1 - q3 * q4) * v[0]
            + (-q1 * q1 + q2 * q2 - q3 * q3 + q4 * q4) * v[1]
            + 2.0 * (q2 * q3 + q1 * q4) * v[2];

        let out3 = 2.0 * (q3 * q1 + q2 * q4) * v[0]
            + 2.0 * (q3 * q2 - q1 * q4) * v[1]
            + (-q1 * q1 - q2 * q2 + q3 * q3 + q4 * q4) * v[2];

        Vector3::new(out1, out2, out3)
    }

    fn identity() -> Self {
        Self::IDENTITY
    }

    fn inv(&self) -> Self {
        UnitQuaternion(
            self.0
                .inv(),
        ) // conjugate of a unit quaternion is already unit
    }
}

impl Default for Quaternion {
    /// Provides the default value for a quaternion.
    ///
    /// # Returns
    ///
    /// The identity quaternion.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Hamilton product.
    /// `(a * b)` rotates by `b` first, then by `a`, so that
    /// `(a * b).rotate(v) == a.rotate(b.rotate(v))`.
    ///
    /// # Arguments
    ///
    /// * `rhs` - The right-hand side quaternion.
    ///
    /// # Returns
    ///
    /// The product of the two quaternions.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y + self.y * rhs.w + self.z * rhs.x - self.x * rhs.z,
            self.w * rhs.z + self.z * rhs.w + self.x * rhs.y - self.y * rhs.x,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Mul<UnitQuaternion> for UnitQuaternion {
    type Output = Self;
    fn mul(self, rhs: UnitQuaternion) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(
            self.x * rhs,
            self.y * rhs,
            self.z * rhs,
            self.w * rhs,
        )
    }
}

impl From<&AxisAngle> for UnitQuaternion {
    fn from(axis_angle: &AxisAngle) -> Self {
        let half_angle = axis_angle.angle / 2.0;
        let s = half_angle.sin();
        let c = half_angle.cos();
        // AxisAngle keeps its axis normalized, so this is already unit
        UnitQuaternion(Quaternion::new(
            s * axis_angle.axis[0],
            s * axis_angle.axis[1],
            s * axis_angle.axis[2],
            c,
        ))
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quaternion ")?;
        writeln!(f, "   x: {: >10.6}", self.x)?;
        writeln!(f, "   y: {: >10.6}", self.y)?;
        writeln!(f, "   z: {: >10.6}", self.z)?;
        writeln!(f, "   w: {: >10.6}", self.w)
    }
}
