use crate::{
    MotionErrors, Swimmer,
    cell::MovingCell,
    kinematics::{self, Kinematics, Pose},
};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// A cell moving in a plane.
///
/// Positions are still 3D with z = 0. Each step is taken in 3D, then the
/// orientation is turned back so the swimming axis is horizontal. The spin
/// about the swimming axis is kept, which decides whether the mouth is
/// visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneMovingCell {
    cell: MovingCell,
}

impl Default for PlaneMovingCell {
    fn default() -> Self {
        Self::new(Vector2::zeros(), 0.0)
    }
}

impl PlaneMovingCell {
    /// A cell at `position` turned a quarter turn about the horizontal axis
    /// at angle `theta`. Its swimming axis then points at `theta - π/2`.
    pub fn new(position: Vector2<f64>, theta: f64) -> Self {
        let mut cell = MovingCell::new();
        cell.set_position(Vector3::new(position[0], position[1], 0.0));
        let mut plane = Self { cell };
        plane.set_orientation(theta);
        plane
    }

    /// A cell at `position` swimming toward `heading`.
    pub fn with_heading(position: Vector2<f64>, heading: f64) -> Self {
        Self::new(position, heading + FRAC_PI_2)
    }

    /// Same convention as `new`.
    pub fn set_orientation(&mut self, theta: f64) {
        self.cell
            .pose_mut()
            .orientation = kinematics::plane_orientation(theta);
    }

    /// Turns the cell so that `orientation_angle` returns `heading`.
    pub fn set_heading(&mut self, heading: f64) {
        self.set_orientation(heading + FRAC_PI_2);
    }

    pub fn set_position(&mut self, position: Vector2<f64>) {
        self.cell
            .set_position(Vector3::new(position[0], position[1], 0.0));
    }

    pub fn position_2d(&self) -> Vector2<f64> {
        self.cell
            .position()
            .xy()
    }

    pub fn kinematics(&self) -> &Kinematics {
        self.cell
            .kinematics()
    }

    /// 2D angle of the cell. The spin angle is not part of it.
    pub fn orientation_angle(&self) -> f64 {
        kinematics::bearing(&self.cell.orientation())
    }

    /// (x, y) mouth position relative to the center for a cell of unit
    /// width, or `None` if the mouth is on the hidden side.
    pub fn mouth_position(&self) -> Option<Vector2<f64>> {
        kinematics::mouth_position(&self.cell.orientation())
    }
}

impl Swimmer for PlaneMovingCell {
    fn pose(&self) -> &Pose {
        self.cell
            .pose()
    }

    fn set_velocity(&mut self, speed: f64) {
        self.cell
            .set_velocity(speed);
    }

    fn set_rotation_angle(&mut self, theta: f64, spin: f64) {
        self.cell
            .set_rotation_angle(theta, spin);
    }

    fn set_gravity(&mut self, _sedimentation: f64, _torque: f64) -> Result<(), MotionErrors> {
        Err(MotionErrors::GravityUnsupported)
    }

    fn spiral_axis(&self) -> Vector3<f64> {
        self.cell
            .spiral_axis()
    }

    /// Takes the 3D step, then turns the swimming axis back into the plane.
    /// A step that ends with the axis exactly vertical has no direction to
    /// turn back along; that step stays out of the plane and the next one
    /// corrects it.
    fn integrate(&mut self, dt: f64) {
        self.cell
            .integrate(dt);
        let pose = self
            .cell
            .pose_mut();
        pose.orientation = kinematics::flatten(&pose.orientation);
    }
}
