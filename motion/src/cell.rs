use crate::{
    MotionErrors, Swimmer,
    kinematics::{INITIAL_TILT, Kinematics, Pose},
};
use nalgebra::Vector3;
use rotations::prelude::UnitQuaternion;
use serde::{Deserialize, Serialize};

/// A cell moving freely in 3D.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovingCell {
    pose: Pose,
    kinematics: Kinematics,
}

impl MovingCell {
    /// A cell at the origin, swimming horizontally at 1 mm/s on a 20° spiral.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pose(position: Vector3<f64>, orientation: UnitQuaternion) -> Self {
        Self { pose: Pose::new(position, orientation), kinematics: Kinematics::default() }
    }

    /// A cell turned a quarter turn about `axis`, which sets where the mouth
    /// faces.
    pub fn with_axis(position: Vector3<f64>, axis: Vector3<f64>) -> Result<Self, MotionErrors> {
        let pose = Pose::from_axis(position, axis, INITIAL_TILT)?;
        log::debug!("new cell at {:?} turned about {:?}", position.as_slice(), axis.as_slice());
        Ok(Self { pose, kinematics: Kinematics::default() })
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn set_kinematics(&mut self, kinematics: Kinematics) {
        self.kinematics = kinematics;
    }

    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.pose.position = position;
    }

    /// Turns the cell `angle` radians about `axis`, starting from the body
    /// frame.
    pub fn set_orientation(&mut self, axis: Vector3<f64>, angle: f64) -> Result<(), MotionErrors> {
        self.pose = Pose::from_axis(self.pose.position, axis, angle)?;
        Ok(())
    }

    pub(crate) fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }
}

impl Swimmer for MovingCell {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn set_velocity(&mut self, speed: f64) {
        self.kinematics
            .set_velocity(speed);
    }

    fn set_rotation_angle(&mut self, theta: f64, spin: f64) {
        self.kinematics
            .set_rotation_angle(theta, spin);
    }

    fn set_gravity(&mut self, sedimentation: f64, torque: f64) -> Result<(), MotionErrors> {
        self.kinematics
            .set_gravity(sedimentation, torque);
        Ok(())
    }

    fn spiral_axis(&self) -> Vector3<f64> {
        self.kinematics
            .spiral_axis(&self.pose.orientation)
    }

    fn integrate(&mut self, dt: f64) {
        self.kinematics
            .advance(&mut self.pose, dt);
    }
}
