//! Timing and throughput reporting around the integrator.
//!
//! The wall clock covers state construction plus the full leapfrog run, the
//! same span the benchmark has always measured. Throughput is reported as
//! charge interactions per second, `n_charges^2 * n_steps / seconds`.

use std::time::Instant;

use serde::Serialize;

use crate::configuration::config::Precision;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Simulation;
use crate::simulation::states::{Real, StateError};

/// Report printed after a run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Statistics {
    pub precision: Precision,
    #[serde(rename = "num charges per direction")]
    pub n_charges_per_dir: usize,
    #[serde(rename = "num charges")]
    pub n_charges: usize,
    pub n_steps: usize,
    #[serde(rename = "runtime (seconds)")]
    pub seconds: f64,
    #[serde(rename = "charge interactions per second")]
    pub interactions_per_second: f64,
}

impl Statistics {
    pub fn new(precision: Precision, parameters: &Parameters, seconds: f64) -> Self {
        let n_charges = parameters.n_charges();
        Self {
            precision,
            n_charges_per_dir: parameters.n_charges_per_dir,
            n_charges,
            n_steps: parameters.n_steps,
            seconds,
            interactions_per_second: charge_interactions_per_second(
                n_charges,
                parameters.n_steps,
                seconds,
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `n_charges^2 * n_steps / seconds`, evaluated in f64
pub fn charge_interactions_per_second(n_charges: usize, n_steps: usize, seconds: f64) -> f64 {
    let n = n_charges as f64;
    n * n * n_steps as f64 / seconds
}

/// Build and run one simulation, returning elapsed wall-clock seconds
pub fn time_simulation<T: Real>(parameters: &Parameters) -> Result<f64, StateError> {
    let t0 = Instant::now();
    let mut sim = Simulation::<T>::build(parameters.clone())?;
    sim.run();
    Ok(t0.elapsed().as_secs_f64())
}

/// Run once in the requested precision and collect statistics
pub fn run_benchmark(precision: Precision, parameters: &Parameters) -> Result<Statistics, StateError> {
    log::info!(
        "running {} steps on {}^3 charges in {} precision",
        parameters.n_steps,
        parameters.n_charges_per_dir,
        precision
    );

    let seconds = match precision {
        Precision::Float => time_simulation::<f32>(parameters)?,
        Precision::Double => time_simulation::<f64>(parameters)?,
    };

    log::info!("finished in {:.6} s", seconds);
    Ok(Statistics::new(precision, parameters, seconds))
}

/// One row of the size sweep
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurvePoint {
    pub n_charges_per_dir: usize,
    pub n_charges: usize,
    pub seconds: f64,
    pub interactions_per_second: f64,
}

impl CurvePoint {
    pub fn csv_header() -> &'static str {
        "n_charges_per_dir,n_charges,seconds,interactions_per_second"
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.6},{:.6e}",
            self.n_charges_per_dir, self.n_charges, self.seconds, self.interactions_per_second
        )
    }
}

/// Time the run for every grid edge length `1..=max_per_dir`
/// Paste the CSV output directly into a spreadsheet to graph
pub fn bench_verlet_curve(
    precision: Precision,
    parameters: &Parameters,
    max_per_dir: usize,
) -> Result<Vec<CurvePoint>, StateError> {
    let mut points = Vec::with_capacity(max_per_dir);

    for per_dir in 1..=max_per_dir {
        let p = Parameters { n_charges_per_dir: per_dir, ..parameters.clone() };
        let stats = run_benchmark(precision, &p)?;

        points.push(CurvePoint {
            n_charges_per_dir: per_dir,
            n_charges: stats.n_charges,
            seconds: stats.seconds,
            interactions_per_second: stats.interactions_per_second,
        });
    }

    Ok(points)
}
