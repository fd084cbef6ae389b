use nalgebra::{Vector2, Vector3};
use rotations::{
    RotationTrait,
    axis_angle::{AxisAngle, AxisAngleErrors},
    prelude::UnitQuaternion,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Swimming axis of the cell, in the body frame.
pub const BODY_AXIS: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);
/// Lateral marker on the mouth side of the cell, in the body frame.
pub const MOUTH_AXIS: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);
/// Vertical of the observer.
pub const WORLD_Z: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);
const DOWN: Vector3<f64> = Vector3::new(0.0, 0.0, -1.0);

/// Rotation applied about the initial axis of a new cell. A quarter turn about
/// a horizontal axis lays the swimming axis flat with the mouth visible.
pub const INITIAL_TILT: f64 = FRAC_PI_2;

pub const DEFAULT_SPEED: f64 = 1000.0;
pub const DEFAULT_ROTATION_ANGLE: f64 = 20.0 / 180.0 * PI;
pub const DEFAULT_SPIN: f64 = TAU;
/// Machemer et al. 1991.
pub const DEFAULT_SEDIMENTATION: f64 = 84.0;
/// Roberts: 7 deg/s.
pub const DEFAULT_GRAVITY_TORQUE: f64 = 7.0 / 180.0 * PI;

// Ranges the behavioral model drives the integrator through.
pub const THETA_MIN: f64 = 13.0 / 180.0 * PI;
pub const THETA_MAX: f64 = FRAC_PI_2;
pub const OMEGA_MIN: f64 = TAU;
pub const OMEGA_MAX: f64 = 4.0 * TAU;
pub const V_PLUS: f64 = 500.0;
pub const V_MINUS: f64 = -500.0;

/// Position and orientation of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    /// Rotation from the body frame to the world frame.
    pub orientation: UnitQuaternion,
}

impl Pose {
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion) -> Self {
        Self { position, orientation }
    }

    /// A pose obtained by turning `angle` radians about `axis`.
    pub fn from_axis(
        position: Vector3<f64>,
        axis: Vector3<f64>,
        angle: f64,
    ) -> Result<Self, AxisAngleErrors> {
        let axis_angle = AxisAngle::new(angle, axis)?;
        Ok(Self::new(position, UnitQuaternion::from(&axis_angle)))
    }
}

impl Default for Pose {
    /// At the origin, swimming horizontally with the mouth facing the observer.
    fn default() -> Self {
        let axis_angle = AxisAngle { angle: INITIAL_TILT, axis: Vector3::x() };
        Self::new(Vector3::zeros(), UnitQuaternion::from(&axis_angle))
    }
}

/// Velocities driving one body. They persist until set again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Linear velocity in the body frame.
    pub velocity: Vector3<f64>,
    /// Angular velocity (spiral axis) in the body frame.
    pub omega: Vector3<f64>,
    /// Settling velocity in the world frame.
    pub sedimentation: Vector3<f64>,
    pub gravity_torque: f64,
}

impl Default for Kinematics {
    fn default() -> Self {
        let mut kinematics = Self::at_rest();
        kinematics.set_velocity(DEFAULT_SPEED);
        kinematics.set_rotation_angle(DEFAULT_ROTATION_ANGLE, DEFAULT_SPIN);
        kinematics
    }
}

impl Kinematics {
    /// No motion at all.
    pub fn at_rest() -> Self {
        Self {
            velocity: Vector3::zeros(),
            omega: Vector3::zeros(),
            sedimentation: Vector3::zeros(),
            gravity_torque: 0.0,
        }
    }

    pub fn set_velocity(&mut self, speed: f64) {
        self.velocity = BODY_AXIS * speed;
    }

    /// Left-handed spiral: the axis leans toward body -x.
    pub fn set_rotation_angle(&mut self, theta: f64, spin: f64) {
        self.omega = -Vector3::new(theta.sin(), 0.0, theta.cos()) * spin;
    }

    pub fn set_gravity(&mut self, sedimentation: f64, torque: f64) {
        self.sedimentation = DOWN * sedimentation;
        self.gravity_torque = torque;
    }

    /// Extra body-frame angular velocity from the gravity torque.
    pub fn gravity_omega(&self, orientation: &UnitQuaternion) -> Vector3<f64> {
        // gravity direction seen from the cell
        let p = orientation.transform(&DOWN);
        -self.gravity_torque * WORLD_Z.cross(&p)
    }

    pub fn spiral_axis(&self, orientation: &UnitQuaternion) -> Vector3<f64> {
        orientation.rotate(&self.omega)
    }

    /// One explicit step. The translation uses the orientation at the start
    /// of the step.
    pub fn step(&self, position: &mut Vector3<f64>, orientation: &mut UnitQuaternion, dt: f64) {
        let omega_gravity = self.gravity_omega(orientation);
        *position += (orientation.rotate(&self.velocity) + self.sedimentation) * dt;
        *orientation = orientation.integrate(&(self.omega + omega_gravity), dt);
    }

    pub fn advance(&self, pose: &mut Pose, dt: f64) {
        self.step(&mut pose.position, &mut pose.orientation, dt);
    }
}

/// Orientation of a cell in the plane: a quarter turn about the horizontal
/// axis at angle `theta`, which points the swimming axis at `theta - π/2`.
pub fn plane_orientation(theta: f64) -> UnitQuaternion {
    // the axis is unit by construction
    let axis = Vector3::new(theta.cos(), theta.sin(), 0.0);
    UnitQuaternion::from(&AxisAngle { angle: INITIAL_TILT, axis })
}

/// Swimming axis in world coordinates.
pub fn facing(orientation: &UnitQuaternion) -> Vector3<f64> {
    orientation.rotate(&BODY_AXIS)
}

/// Rotates the orientation so that the swimming axis lies in the horizontal
/// plane again. The heading in the plane and the spin about the swimming axis
/// are left as they are.
pub fn flatten(orientation: &UnitQuaternion) -> UnitQuaternion {
    let p = match facing(orientation).try_normalize(0.0) {
        Some(p) => p,
        None => return *orientation,
    };

    // rotation axis bringing p back to the plane
    let axis = WORLD_Z.cross(&p);

    let cos_theta = p
        .xy()
        .norm();
    let sin_theta = p[2];
    let theta = sin_theta.atan2(cos_theta);

    match AxisAngle::new(theta, axis) {
        Ok(correction) => (UnitQuaternion::from(&correction) * *orientation).renormalize(),
        Err(_) => {
            log::trace!("swimming axis is vertical, skipping planar correction");
            *orientation
        }
    }
}

/// 2D angle of the swimming axis. A vertical axis gives 0.
pub fn bearing(orientation: &UnitQuaternion) -> f64 {
    let p = facing(orientation);
    p[1].atan2(p[0])
}

/// Position of the mouth marker projected on the plane, relative to the cell
/// center for a cell of unit width. `None` when the mouth faces away from the
/// observer.
pub fn mouth_position(orientation: &UnitQuaternion) -> Option<Vector2<f64>> {
    let p = orientation.rotate(&MOUTH_AXIS);
    if p[2] < 0.0 {
        None
    } else {
        Some(p.xy())
    }
}
