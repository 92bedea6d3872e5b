//! Driving the external renderer.
//!
//! netlistsvg is run as a blocking subprocess. A zero exit is not taken as
//! proof the SVG is on disk: the output is polled until its modification
//! time differs from the one it had before the call.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use log::{info, warn};
use thiserror::Error;

/// Characters of renderer stderr kept in a failure report.
pub const DIAGNOSTIC_LIMIT: usize = 400;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to run {program}: {source}")]
    LaunchError {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{} was not written within {:?}", .0.display(), .1)]
    Timeout(PathBuf, Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(PathBuf),
    /// The renderer ran and exited non-zero.
    Failed {
        status: Option<i32>,
        diagnostic: String,
    },
}

pub trait SchematicRenderer {
    /// Lay out the clean `netlist` with `skin` into `output`.
    fn render(&self, netlist: &Path, skin: &Path, output: &Path)
        -> Result<RenderOutcome, RenderError>;
}

#[derive(Debug, Clone)]
pub struct Netlistsvg {
    pub program: String,
    pub settle_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for Netlistsvg {
    fn default() -> Self {
        Netlistsvg {
            program: "netlistsvg".to_string(),
            settle_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl Netlistsvg {
    pub fn new(program: &str) -> Self {
        Netlistsvg {
            program: program.to_string(),
            ..Default::default()
        }
    }

    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }
}

impl SchematicRenderer for Netlistsvg {
    fn render(
        &self,
        netlist: &Path,
        skin: &Path,
        output: &Path,
    ) -> Result<RenderOutcome, RenderError> {
        let previous = modified_time(output);
        info!("Rendering {} with {}", netlist.display(), self.program);

        let result = Command::new(&self.program)
            .arg(netlist)
            .arg("--skin")
            .arg(skin)
            .arg("-o")
            .arg(output)
            .output()
            .map_err(|source| RenderError::LaunchError {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            let diagnostic = truncate_diagnostic(&String::from_utf8_lossy(&result.stderr));
            warn!("{} exited with {}", self.program, result.status);
            return Ok(RenderOutcome::Failed {
                status: result.status.code(),
                diagnostic,
            });
        }

        wait_for_artifact(output, previous, self.settle_timeout, self.poll_interval)?;
        Ok(RenderOutcome::Rendered(output.to_path_buf()))
    }
}

pub fn truncate_diagnostic(stderr: &str) -> String {
    stderr.chars().take(DIAGNOSTIC_LIMIT).collect()
}

pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Block until `path` exists with a modification time other than
/// `previous`, the one seen before the renderer ran, or `timeout` elapses.
pub fn wait_for_artifact(
    path: &Path,
    previous: Option<SystemTime>,
    timeout: Duration,
    interval: Duration,
) -> Result<(), RenderError> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(modified) = modified_time(path) {
            if Some(modified) != previous {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            return Err(RenderError::Timeout(path.to_path_buf(), timeout));
        }
        thread::sleep(interval);
    }
}
