use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use motion::MotionErrors;
use std::{
    path::{Path, PathBuf},
    time::Instant,
};
use thiserror::Error;

mod config;
mod output;

use config::{Model, SimulationConfig, Template};
use output::TrajectoryWriter;

#[derive(Debug, Error)]
pub enum SwimErrors {
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("dt must be positive and finite")]
    DtMustBePositive,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Motion(#[from] MotionErrors),
    #[error("steps must be at least 1")]
    NoSteps,
    #[error("{0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("save_every can't be zero")]
    SaveEveryCantBeZero,
    #[error("{0}")]
    Serialize(#[from] ron::Error),
}

/// Integrates swimming ciliates and writes their trajectories
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a simulation file
    Run {
        config: PathBuf,
        #[arg(short, long, default_value = "trajectory.csv")]
        output: PathBuf,
    },
    /// Write a default simulation file
    Template {
        #[arg(value_enum)]
        kind: Template,
        /// Printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, output } => run(&config, &output),
        Commands::Template { kind, output } => template(kind, output.as_deref()),
    };
    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn template(kind: Template, output: Option<&Path>) -> Result<(), SwimErrors> {
    let config = SimulationConfig::template(kind);
    match output {
        Some(path) => {
            config.save(path)?;
            log::info!("wrote {kind:?} template to {path:?}");
        }
        None => println!("{}", config.to_ron()?),
    }
    Ok(())
}

fn progress_bar(steps: usize) -> ProgressBar {
    let bar = ProgressBar::new(steps as u64);
    let template = "{bar:40} {pos}/{len} steps [{elapsed_precise}]";
    if let Ok(style) = ProgressStyle::with_template(template) {
        bar.set_style(style);
    }
    bar
}

fn run(config_path: &Path, output: &Path) -> Result<(), SwimErrors> {
    let config = SimulationConfig::load(config_path)?;
    let mut writer = TrajectoryWriter::create(output)?;
    let bar = progress_bar(config.steps);
    let start = Instant::now();
    let dt = config.dt;

    match &config.model {
        Model::Cell(builder) => {
            let mut cell = builder.build()?;
            writer.write_swimmer(0, 0.0, cell.as_ref())?;
            for step in 1..=config.steps {
                cell.integrate(dt);
                if step % config.save_every == 0 {
                    writer.write_swimmer(step, step as f64 * dt, cell.as_ref())?;
                }
                bar.inc(1);
            }
        }
        Model::Population(builder) => {
            let mut cells = builder.build()?;
            writer.write_swimmers(0, 0.0, cells.as_ref())?;
            for step in 1..=config.steps {
                cells.integrate(dt);
                if step % config.save_every == 0 {
                    writer.write_swimmers(step, step as f64 * dt, cells.as_ref())?;
                }
                bar.inc(1);
            }
        }
    }
    writer.flush()?;
    bar.finish();

    log::info!(
        "{} steps of {} s in {:.3} s, trajectory written to {:?}",
        config.steps,
        dt,
        start
            .elapsed()
            .as_secs_f64(),
        output
    );
    Ok(())
}
