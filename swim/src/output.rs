use crate::SwimErrors;
use csv::Writer;
use motion::{Swimmer, Swimmers, kinematics};
use nalgebra::Vector3;
use rotations::prelude::UnitQuaternion;
use std::{fs::File, io::BufWriter, io::Write, path::Path};

const HEADERS: [&str; 11] = ["step", "t", "cell", "x", "y", "z", "qx", "qy", "qz", "qw", "bearing"];

/// Trajectory rows, one per cell per saved step.
pub struct TrajectoryWriter<W: Write> {
    writer: Writer<W>,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, SwimErrors> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(inner: W) -> Result<Self, SwimErrors> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(HEADERS)?;
        Ok(Self { writer })
    }

    fn write_row(
        &mut self,
        step: usize,
        t: f64,
        cell: usize,
        position: &Vector3<f64>,
        orientation: &UnitQuaternion,
    ) -> Result<(), SwimErrors> {
        let q = &orientation.0;
        let row = [
            step.to_string(),
            t.to_string(),
            cell.to_string(),
            position[0].to_string(),
            position[1].to_string(),
            position[2].to_string(),
            q.x.to_string(),
            q.y.to_string(),
            q.z.to_string(),
            q.w.to_string(),
            kinematics::bearing(orientation).to_string(),
        ];
        self.writer
            .write_record(&row)?;
        Ok(())
    }

    pub fn write_swimmer(
        &mut self,
        step: usize,
        t: f64,
        swimmer: &dyn Swimmer,
    ) -> Result<(), SwimErrors> {
        self.write_row(step, t, 0, &swimmer.position(), &swimmer.orientation())
    }

    pub fn write_swimmers(
        &mut self,
        step: usize,
        t: f64,
        swimmers: &dyn Swimmers,
    ) -> Result<(), SwimErrors> {
        for (cell, (position, orientation)) in swimmers
            .positions()
            .iter()
            .zip(swimmers.orientations())
            .enumerate()
        {
            self.write_row(step, t, cell, position, orientation)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SwimErrors> {
        self.writer
            .flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(inner) => inner,
            Err(e) => panic!("{e}"),
        }
    }
}
