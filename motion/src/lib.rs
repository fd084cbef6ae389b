//! Rigid-body swimming of ciliates.
//!
//! A cell swims forward along its body +z axis while rotating about a tilted
//! spiral axis, producing helical paths. Orientations are unit quaternions
//! mapping the body frame to the world frame. Lengths are in micrometers and
//! times in seconds.

pub mod builder;
pub mod cell;
pub mod kinematics;
pub mod per_body;
pub mod plane;
pub mod population;

use kinematics::{DEFAULT_GRAVITY_TORQUE, DEFAULT_SEDIMENTATION, DEFAULT_SPIN, Pose};
use nalgebra::Vector3;
use per_body::PerBody;
use rayon::prelude::*;
use rotations::{axis_angle::AxisAngleErrors, prelude::UnitQuaternion};
use thiserror::Error;

pub mod prelude {
    pub use crate::builder::*;
    pub use crate::cell::MovingCell;
    pub use crate::kinematics::{Kinematics, Pose};
    pub use crate::per_body::PerBody;
    pub use crate::plane::PlaneMovingCell;
    pub use crate::population::{MovingCells, PlaneMovingCells};
    pub use crate::{MotionErrors, Swimmer, Swimmers};
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MotionErrors {
    #[error("{0}")]
    AxisAngle(#[from] AxisAngleErrors),
    #[error("gravity is not supported for a cell constrained to a plane")]
    GravityUnsupported,
    #[error("expected one value per cell ({expected}), got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// A single swimming body.
pub trait Swimmer {
    fn pose(&self) -> &Pose;

    /// Sets the forward speed along the body +z axis (µm/s).
    /// Negative speeds swim backward without turning the cell around.
    fn set_velocity(&mut self, speed: f64);

    /// Sets the spiral axis at angle `theta` from the body +z axis, in the
    /// body x-z half-plane facing the mouth, with a magnitude of `spin` rad/s.
    fn set_rotation_angle(&mut self, theta: f64, spin: f64);

    /// Same as `set_rotation_angle`, at one revolution per second.
    fn set_tilt(&mut self, theta: f64) {
        self.set_rotation_angle(theta, DEFAULT_SPIN);
    }

    /// Sets the sedimentation speed (µm/s, downward) and the gravity torque
    /// coefficient (rad/s).
    fn set_gravity(&mut self, sedimentation: f64, torque: f64) -> Result<(), MotionErrors>;

    /// Machemer et al. 1991 sedimentation speed with a 7°/s gravity torque.
    fn set_default_gravity(&mut self) -> Result<(), MotionErrors> {
        self.set_gravity(DEFAULT_SEDIMENTATION, DEFAULT_GRAVITY_TORQUE)
    }

    /// The spiral axis in world coordinates. Its magnitude is the spin rate.
    fn spiral_axis(&self) -> Vector3<f64>;

    /// Moves the cell by one step of `dt` seconds.
    fn integrate(&mut self, dt: f64);

    fn position(&self) -> Vector3<f64> {
        self.pose()
            .position
    }

    fn orientation(&self) -> UnitQuaternion {
        self.pose()
            .orientation
    }

    /// Angle of the swimming axis in the horizontal plane, ignoring spin.
    fn bearing(&self) -> f64 {
        kinematics::bearing(&self.pose().orientation)
    }
}

/// A population of independent swimming bodies stored as parallel arrays.
/// Every operation is elementwise; bodies never interact.
pub trait Swimmers {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn positions(&self) -> &[Vector3<f64>];

    fn orientations(&self) -> &[UnitQuaternion];

    fn set_velocity(&mut self, speed: PerBody<f64>) -> Result<(), MotionErrors>;

    fn set_rotation_angle(
        &mut self,
        theta: PerBody<f64>,
        spin: PerBody<f64>,
    ) -> Result<(), MotionErrors>;

    fn set_gravity(
        &mut self,
        sedimentation: PerBody<f64>,
        torque: PerBody<f64>,
    ) -> Result<(), MotionErrors>;

    fn spiral_axes(&self) -> Vec<Vector3<f64>>;

    fn integrate(&mut self, dt: f64);

    fn bearings(&self) -> Vec<f64> {
        self.orientations()
            .par_iter()
            .map(kinematics::bearing)
            .collect()
    }
}
