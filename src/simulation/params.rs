//! Numerical parameters for a benchmark run
//!
//! `Parameters` holds runtime settings:
//! - step size `dt` (simulation-wide constant, `1e-7` unless overridden),
//! - number of steps and grid edge length,
//! - loop schedule (serial or rayon-parallel)

use serde::Deserialize;

/// Step size used by the benchmark unless a run file or flag overrides it
pub const DEFAULT_DT: f64 = 1.0e-7;

/// How the per-particle loops of each phase are executed
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    #[default]
    #[serde(rename = "serial")] // single thread, one pass per phase
    Serial,

    #[serde(rename = "parallel")] // outer particle loop split across the rayon pool
    Parallel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub dt: f64, // step size, converted to the run's precision
    pub n_steps: usize, // number of leapfrog steps
    pub n_charges_per_dir: usize, // grid edge length k, k^3 charges
    pub schedule: Schedule, // serial or parallel loops
}

impl Parameters {
    pub fn new(n_steps: usize, n_charges_per_dir: usize) -> Self {
        Self {
            dt: DEFAULT_DT,
            n_steps,
            n_charges_per_dir,
            schedule: Schedule::Serial,
        }
    }

    /// Total number of charges, `k^3`
    pub fn n_charges(&self) -> usize {
        self.n_charges_per_dir.pow(3)
    }
}
