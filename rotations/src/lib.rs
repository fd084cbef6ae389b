pub mod axis_angle;
pub mod quaternion;

use nalgebra::Vector3;

pub mod prelude {
    pub use crate::axis_angle::*;
    pub use crate::quaternion::*;
    pub use crate::RotationTrait;
}

/// Trait defining rotation and transformation operations.
pub trait RotationTrait {
    /// Rotates a vector by the rotation.
    /// For an orientation that maps the body frame to the world frame, this
    /// takes a body-frame vector into world coordinates.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be rotated.
    ///
    /// # Returns
    ///
    /// The rotated vector.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64>;

    /// Transforms a vector by the rotation.
    /// This is the inverse of `rotate`: world-frame vectors come back into
    /// the body frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed vector.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64>;

    fn inv(&self) -> Self;

    fn identity() -> Self;
}
