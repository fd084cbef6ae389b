use crate::{
    MotionErrors, Swimmer, Swimmers,
    cell::MovingCell,
    kinematics::{
        DEFAULT_GRAVITY_TORQUE, DEFAULT_ROTATION_ANGLE, DEFAULT_SEDIMENTATION, DEFAULT_SPEED,
        DEFAULT_SPIN,
    },
    per_body::PerBody,
    plane::PlaneMovingCell,
    population::{MovingCells, PlaneMovingCells},
};
use nalgebra::Vector3;
use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwimmingBuilder {
    /// µm/s along the body +z axis.
    pub speed: f64,
    /// Angle between the spiral axis and the body axis (rad).
    pub rotation_angle: f64,
    /// rad/s
    pub spin: f64,
}

impl Default for SwimmingBuilder {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            rotation_angle: DEFAULT_ROTATION_ANGLE,
            spin: DEFAULT_SPIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityBuilder {
    pub sedimentation: f64,
    pub torque: f64,
}

impl Default for GravityBuilder {
    fn default() -> Self {
        Self { sedimentation: DEFAULT_SEDIMENTATION, torque: DEFAULT_GRAVITY_TORQUE }
    }
}

/// Where the cells are free to go, and how they start out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// 3D, turned a quarter turn about `axis`.
    Free { axis: Vector3<f64> },
    /// Horizontal plane, swimming toward `heading`.
    Plane { heading: f64 },
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::Free { axis: Vector3::x() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CellBuilder {
    /// z is dropped for the plane geometry.
    pub position: Vector3<f64>,
    pub geometry: Geometry,
    pub swimming: SwimmingBuilder,
    pub gravity: Option<GravityBuilder>,
}

impl CellBuilder {
    pub fn build(&self) -> Result<Box<dyn Swimmer>, MotionErrors> {
        let mut cell: Box<dyn Swimmer> = match self.geometry {
            Geometry::Free { axis } => Box::new(MovingCell::with_axis(self.position, axis)?),
            Geometry::Plane { heading } => {
                Box::new(PlaneMovingCell::with_heading(self.position.xy(), heading))
            }
        };
        cell.set_velocity(self.swimming.speed);
        cell.set_rotation_angle(self.swimming.rotation_angle, self.swimming.spin);
        if let Some(gravity) = &self.gravity {
            cell.set_gravity(gravity.sedimentation, gravity.torque)?;
        }
        log::debug!("built cell {:?}", self.geometry);
        Ok(cell)
    }
}

/// Random initial positions in `[0, width] x [0, height]`, reproducible from
/// `seed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    pub width: f64,
    pub height: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationBuilder {
    pub count: usize,
    pub geometry: Geometry,
    pub swimming: SwimmingBuilder,
    pub gravity: Option<GravityBuilder>,
    /// Without it every cell starts at the origin.
    pub scatter: Option<Scatter>,
}

impl Default for PopulationBuilder {
    fn default() -> Self {
        Self {
            count: 100,
            geometry: Geometry::Plane { heading: 0.0 },
            swimming: SwimmingBuilder::default(),
            gravity: None,
            scatter: Some(Scatter { width: 4000.0, height: 4000.0, seed: 0 }),
        }
    }
}

impl PopulationBuilder {
    pub fn build(&self) -> Result<Box<dyn Swimmers>, MotionErrors> {
        let mut cells: Box<dyn Swimmers> = match self.geometry {
            Geometry::Free { axis } => {
                let mut cells = MovingCells::with_axis(self.count, PerBody::Shared(axis))?;
                if let Some(scatter) = &self.scatter {
                    let mut rng = SmallRng::seed_from_u64(scatter.seed);
                    cells.scatter(scatter.width, scatter.height, &mut rng);
                }
                Box::new(cells)
            }
            Geometry::Plane { heading } => {
                let mut cells =
                    PlaneMovingCells::with_heading(self.count, PerBody::Shared(heading))?;
                if let Some(scatter) = &self.scatter {
                    let mut rng = SmallRng::seed_from_u64(scatter.seed);
                    cells.scatter(scatter.width, scatter.height, &mut rng);
                }
                Box::new(cells)
            }
        };
        cells.set_velocity(PerBody::Shared(self.swimming.speed))?;
        cells.set_rotation_angle(
            PerBody::Shared(self.swimming.rotation_angle),
            PerBody::Shared(self.swimming.spin),
        )?;
        if let Some(gravity) = &self.gravity {
            cells.set_gravity(
                PerBody::Shared(gravity.sedimentation),
                PerBody::Shared(gravity.torque),
            )?;
        }
        log::debug!("built {} cells {:?}", self.count, self.geometry);
        Ok(cells)
    }
}
