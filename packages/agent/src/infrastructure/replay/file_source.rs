//! File-backed replay source.
//!
//! Both logs are parsed once on `open` and kept in memory. Each log has its own cursor that
//! wraps to the first row when it runs past the last one, so a short GPS log and a long
//! accelerometer log drift out of phase and realign every `lcm(m, n)` reads. Rows are paired by
//! call order only; there is no timestamp alignment or resampling.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use michi_shared::{Accelerometer, Gps, Sample, time::Clock};

use super::sensor_log::{LogRecord, parse_log};
use crate::domain::{ReplayError, SampleSource};

/// Cursor over a fixed, non-empty buffer that restarts at the first row when exhausted
#[derive(Debug)]
struct CyclicCursor<T> {
    rows: Vec<T>,
    position: usize,
}

impl<T: Copy> CyclicCursor<T> {
    fn new(rows: Vec<T>) -> Self {
        Self { rows, position: 0 }
    }

    fn next_row(&mut self) -> T {
        if self.position >= self.rows.len() {
            self.position = 0;
        }
        let row = self.rows[self.position];
        self.position += 1;
        row
    }
}

#[derive(Debug)]
struct OpenLogs {
    accelerometer: CyclicCursor<Accelerometer>,
    gps: CyclicCursor<Gps>,
}

/// Endless sample stream over an accelerometer log and a GPS log
pub struct ReplaySource {
    accelerometer_path: PathBuf,
    gps_path: PathBuf,
    clock: Arc<dyn Clock>,
    user_id: i64,
    logs: Option<OpenLogs>,
}

impl ReplaySource {
    /// Create a closed source. Nothing is read until [`ReplaySource::open`].
    pub fn new(
        accelerometer_path: impl Into<PathBuf>,
        gps_path: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        user_id: i64,
    ) -> Self {
        Self {
            accelerometer_path: accelerometer_path.into(),
            gps_path: gps_path.into(),
            clock,
            user_id,
            logs: None,
        }
    }

    /// Load both logs and position both cursors on their first row.
    ///
    /// Opening an already open source reloads the files and restarts from the beginning.
    pub fn open(&mut self) -> Result<(), ReplayError> {
        let accelerometer = load_log::<Accelerometer>(&self.accelerometer_path)?;
        let gps = load_log::<Gps>(&self.gps_path)?;

        tracing::info!(
            "Replay opened: {} accelerometer rows from {}, {} GPS rows from {}",
            accelerometer.len(),
            self.accelerometer_path.display(),
            gps.len(),
            self.gps_path.display()
        );

        self.logs = Some(OpenLogs {
            accelerometer: CyclicCursor::new(accelerometer),
            gps: CyclicCursor::new(gps),
        });
        Ok(())
    }

    /// Release both logs. Reads fail with [`ReplayError::NotReady`] until the next `open`.
    pub fn close(&mut self) {
        if self.logs.take().is_some() {
            tracing::info!("Replay closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.logs.is_some()
    }

    /// Next paired sample, stamped with the clock's current time
    pub fn read(&mut self) -> Result<Sample, ReplayError> {
        let logs = self.logs.as_mut().ok_or(ReplayError::NotReady)?;

        let accelerometer = logs.accelerometer.next_row();
        let gps = logs.gps.next_row();

        Ok(Sample::new(
            accelerometer,
            gps,
            self.clock.now(),
            self.user_id,
        ))
    }
}

impl SampleSource for ReplaySource {
    fn read(&mut self) -> Result<Sample, ReplayError> {
        ReplaySource::read(self)
    }
}

fn load_log<R: LogRecord>(path: &Path) -> Result<Vec<R>, ReplayError> {
    let text = fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_log(&text, path)
}
