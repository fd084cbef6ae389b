use crate::{
    MotionErrors, Swimmers,
    cell::MovingCell,
    kinematics::{self, INITIAL_TILT, Kinematics, Pose},
    per_body::PerBody,
};
use nalgebra::{Vector2, Vector3};
use rand::Rng;
use rayon::prelude::*;
use rotations::{axis_angle::AxisAngle, prelude::UnitQuaternion};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Cells moving in 3D, integrated together.
///
/// The state of cell `i` is `positions[i]`, `orientations[i]` and
/// `kinematics[i]`. Each step is the same law as `MovingCell::integrate`,
/// applied to every cell.
#[derive(Debug, Clone)]
pub struct MovingCells {
    positions: Vec<Vector3<f64>>,
    orientations: Vec<UnitQuaternion>,
    kinematics: Vec<Kinematics>,
}

impl MovingCells {
    /// `n` cells at the origin, all with the default pose and kinematics.
    pub fn new(n: usize) -> Self {
        let pose = Pose::default();
        Self {
            positions: vec![pose.position; n],
            orientations: vec![pose.orientation; n],
            kinematics: vec![Kinematics::default(); n],
        }
    }

    /// `n` cells turned a quarter turn about their axis.
    pub fn with_axis(n: usize, axis: PerBody<Vector3<f64>>) -> Result<Self, MotionErrors> {
        let mut cells = Self::new(n);
        cells.set_orientation(axis, INITIAL_TILT)?;
        Ok(cells)
    }

    /// Turns every cell `angle` radians about its axis, starting from the
    /// body frame.
    pub fn set_orientation(
        &mut self,
        axis: PerBody<Vector3<f64>>,
        angle: f64,
    ) -> Result<(), MotionErrors> {
        let axes = axis.expand(self.len())?;
        let orientations = axes
            .par_iter()
            .map(|axis| {
                AxisAngle::new(angle, *axis).map(|axis_angle| UnitQuaternion::from(&axis_angle))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.orientations = orientations;
        log::debug!("reoriented {} cells", self.len());
        Ok(())
    }

    pub fn positions_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.positions
    }

    pub fn kinematics(&self) -> &[Kinematics] {
        &self.kinematics
    }

    pub fn pose(&self, i: usize) -> Option<Pose> {
        Some(Pose::new(*self.positions.get(i)?, *self.orientations.get(i)?))
    }

    /// A standalone copy of cell `i`.
    pub fn cell(&self, i: usize) -> Option<MovingCell> {
        let pose = self.pose(i)?;
        let mut cell = MovingCell::with_pose(pose.position, pose.orientation);
        cell.set_kinematics(*self.kinematics.get(i)?);
        Some(cell)
    }

    /// Places the cells uniformly at random in `[0, width] x [0, height]`, z = 0.
    pub fn scatter<R: Rng>(&mut self, width: f64, height: f64, rng: &mut R) {
        for position in self
            .positions
            .iter_mut()
        {
            *position = Vector3::new(
                rng.random::<f64>() * width,
                rng.random::<f64>() * height,
                0.0,
            );
        }
    }

    fn orientations_mut(&mut self) -> &mut [UnitQuaternion] {
        &mut self.orientations
    }
}

impl Swimmers for MovingCells {
    fn len(&self) -> usize {
        self.positions
            .len()
    }

    fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    fn orientations(&self) -> &[UnitQuaternion] {
        &self.orientations
    }

    fn set_velocity(&mut self, speed: PerBody<f64>) -> Result<(), MotionErrors> {
        let speeds = speed.expand(self.len())?;
        self.kinematics
            .par_iter_mut()
            .zip(speeds.into_par_iter())
            .for_each(|(kinematics, speed)| kinematics.set_velocity(speed));
        Ok(())
    }

    fn set_rotation_angle(
        &mut self,
        theta: PerBody<f64>,
        spin: PerBody<f64>,
    ) -> Result<(), MotionErrors> {
        let n = self.len();
        let thetas = theta.expand(n)?;
        let spins = spin.expand(n)?;
        self.kinematics
            .par_iter_mut()
            .zip(thetas.into_par_iter())
            .zip(spins.into_par_iter())
            .for_each(|((kinematics, theta), spin)| kinematics.set_rotation_angle(theta, spin));
        Ok(())
    }

    fn set_gravity(
        &mut self,
        sedimentation: PerBody<f64>,
        torque: PerBody<f64>,
    ) -> Result<(), MotionErrors> {
        let n = self.len();
        let sedimentations = sedimentation.expand(n)?;
        let torques = torque.expand(n)?;
        self.kinematics
            .par_iter_mut()
            .zip(sedimentations.into_par_iter())
            .zip(torques.into_par_iter())
            .for_each(|((kinematics, sedimentation), torque)| {
                kinematics.set_gravity(sedimentation, torque)
            });
        Ok(())
    }

    fn spiral_axes(&self) -> Vec<Vector3<f64>> {
        self.orientations
            .par_iter()
            .zip(self.kinematics.par_iter())
            .map(|(orientation, kinematics)| kinematics.spiral_axis(orientation))
            .collect()
    }

    fn integrate(&mut self, dt: f64) {
        self.positions
            .par_iter_mut()
            .zip(self.orientations.par_iter_mut())
            .zip(self.kinematics.par_iter())
            .for_each(|((position, orientation), kinematics)| {
                kinematics.step(position, orientation, dt)
            });
    }
}

/// Cells moving in a plane, integrated together.
#[derive(Debug, Clone)]
pub struct PlaneMovingCells {
    cells: MovingCells,
}

impl PlaneMovingCells {
    /// `n` cells at the origin, turned a quarter turn about the horizontal
    /// axis at angle `theta` (see `PlaneMovingCell::new`).
    pub fn new(n: usize, theta: PerBody<f64>) -> Result<Self, MotionErrors> {
        let mut cells = Self { cells: MovingCells::new(n) };
        cells.set_orientation(theta)?;
        Ok(cells)
    }

    pub fn with_heading(n: usize, heading: PerBody<f64>) -> Result<Self, MotionErrors> {
        let mut cells = Self { cells: MovingCells::new(n) };
        cells.set_heading(heading)?;
        Ok(cells)
    }

    /// Sets the 2D orientation of the cells, with the convention of `new`.
    pub fn set_orientation(&mut self, theta: PerBody<f64>) -> Result<(), MotionErrors> {
        let thetas = theta.expand(self.len())?;
        self.cells
            .orientations_mut()
            .par_iter_mut()
            .zip(thetas.into_par_iter())
            .for_each(|(orientation, theta)| *orientation = kinematics::plane_orientation(theta));
        Ok(())
    }

    /// Turns the cells so that `orientation_angles` returns `heading`.
    pub fn set_heading(&mut self, heading: PerBody<f64>) -> Result<(), MotionErrors> {
        let theta = match heading {
            PerBody::Shared(heading) => PerBody::Shared(heading + FRAC_PI_2),
            PerBody::Each(headings) => PerBody::Each(
                headings
                    .into_iter()
                    .map(|heading| heading + FRAC_PI_2)
                    .collect(),
            ),
        };
        self.set_orientation(theta)
    }

    pub fn set_positions(&mut self, positions: &[Vector2<f64>]) -> Result<(), MotionErrors> {
        if positions.len() != self.len() {
            return Err(MotionErrors::LengthMismatch {
                expected: self.len(),
                got: positions.len(),
            });
        }
        self.cells
            .positions_mut()
            .iter_mut()
            .zip(positions)
            .for_each(|(position, xy)| *position = Vector3::new(xy[0], xy[1], 0.0));
        Ok(())
    }

    pub fn kinematics(&self) -> &[Kinematics] {
        self.cells
            .kinematics()
    }

    /// Random positions in `[0, width] x [0, height]` and random headings.
    pub fn scatter<R: Rng>(&mut self, width: f64, height: f64, rng: &mut R) {
        self.cells
            .scatter(width, height, rng);
        for orientation in self
            .cells
            .orientations_mut()
            .iter_mut()
        {
            *orientation = kinematics::plane_orientation(rng.random::<f64>() * TAU);
        }
    }

    /// 2D angles of the cells, without the spin angle.
    pub fn orientation_angles(&self) -> Vec<f64> {
        self.bearings()
    }

    /// Mouth positions, see `PlaneMovingCell::mouth_position`.
    /// Computed one cell at a time.
    pub fn mouth_positions(&self) -> Vec<Option<Vector2<f64>>> {
        let mut mouths = Vec::with_capacity(self.len());
        for orientation in self.orientations() {
            mouths.push(kinematics::mouth_position(orientation));
        }
        mouths
    }
}

impl Swimmers for PlaneMovingCells {
    fn len(&self) -> usize {
        self.cells
            .len()
    }

    fn positions(&self) -> &[Vector3<f64>] {
        self.cells
            .positions()
    }

    fn orientations(&self) -> &[UnitQuaternion] {
        self.cells
            .orientations()
    }

    fn set_velocity(&mut self, speed: PerBody<f64>) -> Result<(), MotionErrors> {
        self.cells
            .set_velocity(speed)
    }

    fn set_rotation_angle(
        &mut self,
        theta: PerBody<f64>,
        spin: PerBody<f64>,
    ) -> Result<(), MotionErrors> {
        self.cells
            .set_rotation_angle(theta, spin)
    }

    fn set_gravity(
        &mut self,
        _sedimentation: PerBody<f64>,
        _torque: PerBody<f64>,
    ) -> Result<(), MotionErrors> {
        Err(MotionErrors::GravityUnsupported)
    }

    fn spiral_axes(&self) -> Vec<Vector3<f64>> {
        self.cells
            .spiral_axes()
    }

    /// Same as `PlaneMovingCell::integrate`, including the vertical axis case.
    fn integrate(&mut self, dt: f64) {
        self.cells
            .integrate(dt);
        self.cells
            .orientations_mut()
            .par_iter_mut()
            .for_each(|orientation| *orientation = kinematics::flatten(orientation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Swimmer, kinematics::facing, plane::PlaneMovingCell};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Vector4;
    use rand::{SeedableRng, rngs::SmallRng};
    use std::f64::consts::PI;

    const N: usize = 6;

    fn components(q: &UnitQuaternion) -> Vector4<f64> {
        Vector4::new(q.0.x, q.0.y, q.0.z, q.0.w)
    }

    fn axes() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.3, -0.5, 0.8),
            Vector3::new(-1.0, 0.2, 0.1),
            Vector3::new(0.0, 0.0, 1.0),
        ]
    }

    // inputs a behavioral model could produce, varying per cell and per step
    fn drive(step: usize, i: usize) -> (f64, f64, f64) {
        let phase = 0.01 * step as f64 + i as f64;
        let speed = 500.0 * phase.sin() + 200.0 * i as f64;
        let theta = kinematics::THETA_MIN + 0.5 * (1.0 + phase.cos());
        let spin = kinematics::OMEGA_MIN * (1.0 + 0.3 * i as f64);
        (speed, theta, spin)
    }

    fn assert_same_orientation(a: &UnitQuaternion, b: &UnitQuaternion) {
        assert_relative_eq!(
            components(a),
            components(b),
            epsilon = 1e-12,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_batch_matches_single_cells() {
        let mut batch = MovingCells::with_axis(N, axes().into()).unwrap();
        let sedimentations: Vec<f64> = (0..N)
            .map(|i| 20.0 * i as f64)
            .collect();
        let torques: Vec<f64> = (0..N)
            .map(|i| 0.05 * i as f64)
            .collect();
        batch
            .set_gravity(sedimentations.clone().into(), torques.clone().into())
            .unwrap();

        let mut singles: Vec<MovingCell> = axes()
            .into_iter()
            .zip(sedimentations.iter().zip(&torques))
            .map(|(axis, (sedimentation, torque))| {
                let mut cell = MovingCell::with_axis(Vector3::zeros(), axis).unwrap();
                cell.set_gravity(*sedimentation, *torque)
                    .unwrap();
                cell
            })
            .collect();

        for step in 0..1000 {
            let inputs: Vec<(f64, f64, f64)> = (0..N)
                .map(|i| drive(step, i))
                .collect();
            batch
                .set_velocity(
                    inputs
                        .iter()
                        .map(|input| input.0)
                        .collect::<Vec<_>>()
                        .into(),
                )
                .unwrap();
            batch
                .set_rotation_angle(
                    inputs
                        .iter()
                        .map(|input| input.1)
                        .collect::<Vec<_>>()
                        .into(),
                    inputs
                        .iter()
                        .map(|input| input.2)
                        .collect::<Vec<_>>()
                        .into(),
                )
                .unwrap();
            batch.integrate(0.005);

            for (cell, (speed, theta, spin)) in singles
                .iter_mut()
                .zip(inputs)
            {
                cell.set_velocity(speed);
                cell.set_rotation_angle(theta, spin);
                cell.integrate(0.005);
            }
        }

        let spiral_axes = batch.spiral_axes();
        for (i, cell) in singles
            .iter()
            .enumerate()
        {
            assert_relative_eq!(
                batch.positions()[i],
                cell.position(),
                epsilon = 1e-9,
                max_relative = 1e-6
            );
            assert_same_orientation(&batch.orientations()[i], &cell.orientation());
            assert_relative_eq!(
                spiral_axes[i],
                cell.spiral_axis(),
                epsilon = 1e-9,
                max_relative = 1e-6
            );
            assert_abs_diff_eq!(batch.bearings()[i], cell.bearing(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_plane_batch_matches_plane_cells() {
        let headings: Vec<f64> = (0..N)
            .map(|i| 0.9 * i as f64 - 2.0)
            .collect();
        let mut batch = PlaneMovingCells::with_heading(N, headings.clone().into()).unwrap();
        let mut singles: Vec<PlaneMovingCell> = headings
            .iter()
            .map(|heading| PlaneMovingCell::with_heading(Vector2::zeros(), *heading))
            .collect();

        for step in 0..1000 {
            for (i, cell) in singles
                .iter_mut()
                .enumerate()
            {
                let (speed, theta, spin) = drive(step, i);
                cell.set_velocity(speed);
                cell.set_rotation_angle(theta, spin);
                cell.integrate(0.033);
            }
            let inputs: Vec<(f64, f64, f64)> = (0..N)
                .map(|i| drive(step, i))
                .collect();
            batch
                .set_velocity(PerBody::Each(
                    inputs
                        .iter()
                        .map(|input| input.0)
                        .collect(),
                ))
                .unwrap();
            batch
                .set_rotation_angle(
                    PerBody::Each(
                        inputs
                            .iter()
                            .map(|input| input.1)
                            .collect(),
                    ),
                    PerBody::Each(
                        inputs
                            .iter()
                            .map(|input| input.2)
                            .collect(),
                    ),
                )
                .unwrap();
            batch.integrate(0.033);
        }

        let angles = batch.orientation_angles();
        let mouths = batch.mouth_positions();
        for (i, cell) in singles
            .iter()
            .enumerate()
        {
            assert_relative_eq!(
                batch.positions()[i],
                cell.position(),
                epsilon = 1e-9,
                max_relative = 1e-6
            );
            assert_same_orientation(&batch.orientations()[i], &cell.orientation());
            assert_abs_diff_eq!(angles[i], cell.orientation_angle(), epsilon = 1e-9);
            assert_eq!(mouths[i].is_some(), cell.mouth_position().is_some());
        }
    }

    #[test]
    fn test_norm_and_plane_invariants() {
        let mut cells = PlaneMovingCells::new(N, PerBody::Shared(0.5)).unwrap();
        cells
            .set_rotation_angle(PerBody::Shared(0.8), PerBody::Shared(3.0 * PI))
            .unwrap();
        for _ in 0..2000 {
            cells.integrate(0.02);
            for orientation in cells.orientations() {
                assert_abs_diff_eq!(orientation.mag(), 1.0, epsilon = 1e-9);
                assert_abs_diff_eq!(facing(orientation)[2], 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_zero_input_is_fixed_point() {
        let mut cells = MovingCells::with_axis(N, axes().into()).unwrap();
        cells
            .set_velocity(PerBody::Shared(0.0))
            .unwrap();
        cells
            .set_rotation_angle(PerBody::Shared(0.3), PerBody::Shared(0.0))
            .unwrap();
        cells
            .set_gravity(PerBody::Shared(0.0), PerBody::Shared(0.0))
            .unwrap();
        let positions = cells
            .positions()
            .to_vec();
        let orientations = cells
            .orientations()
            .to_vec();

        cells.integrate(0.1);
        cells.integrate(7.0);

        assert_eq!(cells.positions(), positions.as_slice());
        for (a, b) in cells
            .orientations()
            .iter()
            .zip(&orientations)
        {
            assert_abs_diff_eq!(components(a), components(b), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_length_mismatch_leaves_state_untouched() {
        let mut cells = MovingCells::new(3);
        let before = cells.kinematics()[0];

        let result = cells.set_rotation_angle(PerBody::Shared(0.4), PerBody::Each(vec![1.0, 2.0]));
        assert_eq!(result, Err(MotionErrors::LengthMismatch { expected: 3, got: 2 }));
        assert_eq!(cells.kinematics()[0], before);

        let result = cells.set_orientation(PerBody::Each(vec![Vector3::x()]), 1.0);
        assert_eq!(result, Err(MotionErrors::LengthMismatch { expected: 3, got: 1 }));
    }

    #[test]
    fn test_set_orientation_broadcast_and_per_cell() {
        let mut shared = MovingCells::new(3);
        shared
            .set_orientation(PerBody::Shared(Vector3::y()), FRAC_PI_2)
            .unwrap();
        for orientation in shared.orientations() {
            assert_abs_diff_eq!(facing(orientation), Vector3::x(), epsilon = 1e-12);
        }

        let mut each = MovingCells::new(2);
        let axes: Vec<Vector3<f64>> = vec![Vector3::y(), -Vector3::y()];
        each.set_orientation(PerBody::Each(axes), FRAC_PI_2)
            .unwrap();
        assert_abs_diff_eq!(facing(&each.orientations()[0]), Vector3::x(), epsilon = 1e-12);
        assert_abs_diff_eq!(facing(&each.orientations()[1]), -Vector3::x(), epsilon = 1e-12);

        let axes: Vec<Vector3<f64>> = vec![Vector3::y(), Vector3::zeros()];
        let result = each.set_orientation(PerBody::Each(axes), 1.0);
        assert!(matches!(result, Err(MotionErrors::AxisAngle(_))));
    }

    #[test]
    fn test_plane_gravity_is_unsupported() {
        let mut cells = PlaneMovingCells::new(2, PerBody::Shared(0.0)).unwrap();
        let result = cells.set_gravity(PerBody::Shared(84.0), PerBody::Shared(0.1));
        assert_eq!(result, Err(MotionErrors::GravityUnsupported));
    }

    #[test]
    fn test_headings_round_trip() {
        let headings = vec![0.0, 1.0, -1.0, 3.0];
        let cells = PlaneMovingCells::with_heading(4, headings.clone().into()).unwrap();
        for (angle, heading) in cells
            .orientation_angles()
            .iter()
            .zip(&headings)
        {
            assert_abs_diff_eq!(angle, heading, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mouth_positions() {
        let cells = PlaneMovingCells::new(3, vec![0.0, FRAC_PI_2, -FRAC_PI_2].into()).unwrap();
        let mouths = cells.mouth_positions();
        assert!(mouths[0].is_some());
        assert!(mouths[1].is_none());
        assert!(mouths[2].is_some());
    }

    #[test]
    fn test_scatter_is_seeded() {
        let mut a = PlaneMovingCells::new(50, PerBody::Shared(0.0)).unwrap();
        let mut b = a.clone();
        a.scatter(4000.0, 2000.0, &mut SmallRng::seed_from_u64(7));
        b.scatter(4000.0, 2000.0, &mut SmallRng::seed_from_u64(7));

        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.orientations(), b.orientations());
        for position in a.positions() {
            assert!((0.0..=4000.0).contains(&position[0]));
            assert!((0.0..=2000.0).contains(&position[1]));
            assert_eq!(position[2], 0.0);
        }
        for orientation in a.orientations() {
            assert_abs_diff_eq!(facing(orientation)[2], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cell_copy_matches_batch_state() {
        let mut cells = MovingCells::new(2);
        cells.integrate(0.1);
        let cell = cells
            .cell(1)
            .unwrap();
        assert_eq!(cell.position(), cells.positions()[1]);
        assert_eq!(cell.kinematics(), &cells.kinematics()[1]);
        assert!(cells.cell(2).is_none());
    }

    #[test]
    fn test_set_positions() {
        let mut cells = PlaneMovingCells::new(2, PerBody::Shared(0.0)).unwrap();
        cells
            .set_positions(&[Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0)])
            .unwrap();
        assert_eq!(cells.positions()[1], Vector3::new(3.0, 4.0, 0.0));
        assert!(cells.set_positions(&[Vector2::zeros()]).is_err());
    }
}
