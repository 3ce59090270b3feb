//! Build a ready-to-run simulation from parameters
//!
//! Bundles the numerical `Parameters` with the `State` they describe:
//! - state laid out on the `k^3` grid at t = 0
//! - step size converted once to the run's precision

use crate::simulation::integrator::leapfrog;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Real, State, StateError};

/// Runtime bundle for one precision
#[derive(Debug, Clone)]
pub struct Simulation<T> {
    pub parameters: Parameters,
    pub state: State<T>,
}

impl<T: Real> Simulation<T> {
    pub fn build(parameters: Parameters) -> Result<Self, StateError> {
        let state = State::try_new(parameters.n_charges_per_dir)?;
        Ok(Self { parameters, state })
    }

    /// Advance the state by `parameters.n_steps` leapfrog steps
    pub fn run(&mut self) {
        let p = &self.parameters;
        let n_charges = self.state.n_charges();
        log::debug!(
            "advancing {} charges by {} steps ({:?})",
            n_charges,
            p.n_steps,
            p.schedule
        );

        let dt = nalgebra::convert::<f64, T>(p.dt);
        leapfrog(p.schedule, p.n_steps, n_charges, dt, self.state.arrays());
    }
}
