pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Arrays, Real, State, StateError};
pub use simulation::params::{Parameters, Schedule, DEFAULT_DT};
pub use simulation::forces::{velocity_timestep, velocity_timestep_par};
pub use simulation::integrator::{
    leapfrog, position_timestep, position_timestep_par, verlet_timesteps, verlet_timesteps_par,
};
pub use simulation::scenario::Simulation;

pub use configuration::config::{ConfigError, Precision, RunConfig};

pub use benchmark::benchmark::{
    bench_verlet_curve, charge_interactions_per_second, run_benchmark, time_simulation, CurvePoint,
    Statistics,
};
