use crate::SwimErrors;
use clap::ValueEnum;
use motion::builder::{CellBuilder, Geometry, PopulationBuilder, Scatter};
use ron::ser::{PrettyConfig, to_string_pretty};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Model {
    Cell(CellBuilder),
    Population(PopulationBuilder),
}

/// Contents of a simulation file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Timestep in seconds, passed to every integration step.
    pub dt: f64,
    pub steps: usize,
    /// Rows are written every `save_every` steps.
    pub save_every: usize,
    pub model: Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Template {
    Cell,
    Population,
}

impl SimulationConfig {
    pub fn template(template: Template) -> Self {
        match template {
            Template::Cell => Self {
                dt: 0.001,
                steps: 10000,
                save_every: 10,
                model: Model::Cell(CellBuilder::default()),
            },
            Template::Population => Self {
                dt: 1.0 / 30.0,
                steps: 900,
                save_every: 30,
                model: Model::Population(PopulationBuilder {
                    count: 100,
                    geometry: Geometry::Plane { heading: 0.0 },
                    scatter: Some(Scatter { width: 4000.0, height: 4000.0, seed: 42 }),
                    ..Default::default()
                }),
            },
        }
    }

    pub fn validate(&self) -> Result<(), SwimErrors> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(SwimErrors::DtMustBePositive);
        }
        if self.steps == 0 {
            return Err(SwimErrors::NoSteps);
        }
        if self.save_every == 0 {
            return Err(SwimErrors::SaveEveryCantBeZero);
        }
        Ok(())
    }

    pub fn from_ron(contents: &str) -> Result<Self, SwimErrors> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, SwimErrors> {
        Ok(to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn load(path: &Path) -> Result<Self, SwimErrors> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        Self::from_ron(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), SwimErrors> {
        let mut file = File::create(path)?;
        file.write_all(
            self.to_ron()?
                .as_bytes(),
        )?;
        Ok(())
    }
}
