//! Configuration types for loading a benchmark run from YAML.
//!
//! A run file is a thin, `serde`-deserializable description of one benchmark
//! invocation. Every field is optional so that the command line can fill in or
//! override whatever the file leaves out.
//!
//! # YAML format
//!
//! ```yaml
//! precision: "double"     # or "float"
//! n_steps: 10             # number of leapfrog steps
//! n_charges_per_dir: 8    # grid edge length, 8^3 charges (default 0)
//! dt: 1.0e-7              # step size (default 1e-7)
//! schedule: "serial"      # or "parallel"
//! ```
//!
//! [`RunConfig::into_parameters`] resolves the merged configuration into the
//! runtime [`Parameters`] plus the chosen [`Precision`].

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::params::{Parameters, Schedule, DEFAULT_DT};

/// Arithmetic precision for the whole run
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Precision {
    #[serde(rename = "float")] // f32
    Float,

    #[serde(rename = "double")] // f64
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Float => f.write_str("float"),
            Precision::Double => f.write_str("double"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("step size must be finite, got {0}")]
    InvalidStep(f64),

    #[error("failed to read run file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse run file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One benchmark invocation as written in a run file or on the command line
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub precision: Option<Precision>, // float or double
    pub n_steps: Option<usize>, // number of time steps
    pub n_charges_per_dir: Option<usize>, // charges per direction, 0 if unset
    pub dt: Option<f64>, // step size, 1e-7 if unset
    pub schedule: Option<Schedule>, // serial if unset
}

impl RunConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Fields set in `other` win over fields set in `self`
    pub fn merge(self, other: RunConfig) -> Self {
        Self {
            precision: other.precision.or(self.precision),
            n_steps: other.n_steps.or(self.n_steps),
            n_charges_per_dir: other.n_charges_per_dir.or(self.n_charges_per_dir),
            dt: other.dt.or(self.dt),
            schedule: other.schedule.or(self.schedule),
        }
    }

    /// Resolve defaults and check that precision and step count are present
    pub fn into_parameters(self) -> Result<(Precision, Parameters), ConfigError> {
        let precision = self.precision.ok_or(ConfigError::Missing("precision"))?;
        let n_steps = self.n_steps.ok_or(ConfigError::Missing("n_steps"))?;

        let dt = self.dt.unwrap_or(DEFAULT_DT);
        if !dt.is_finite() {
            return Err(ConfigError::InvalidStep(dt));
        }

        let parameters = Parameters {
            dt,
            n_steps,
            n_charges_per_dir: self.n_charges_per_dir.unwrap_or(0),
            schedule: self.schedule.unwrap_or_default(),
        };
        Ok((precision, parameters))
    }
}
