//! Leapfrog Verlet time stepping for the charged n-body system
//!
//! Positions drift with the reflective clamp, velocities are kicked by
//! [`velocity_timestep`]. The two phases never overlap: each finishes on all
//! charges before the other starts.

use rayon::prelude::*;

use super::forces::{velocity_timestep, velocity_timestep_par};
use super::params::Schedule;
use super::states::{Arrays, Real};

/// Only update position by velocity, then clamp every coordinate to `[-1, 1]`.
///
/// Velocity is left untouched at the walls: a pinned charge leaves the wall
/// only once its velocity changes sign.
#[allow(clippy::too_many_arguments)]
pub fn position_timestep<T: Real>(
    n_charges: usize,
    dt: T,
    x: &mut [T],
    y: &mut [T],
    z: &mut [T],
    u: &[T],
    v: &[T],
    w: &[T],
) {
    drift(dt, &mut x[..n_charges], &u[..n_charges]);
    drift(dt, &mut y[..n_charges], &v[..n_charges]);
    drift(dt, &mut z[..n_charges], &w[..n_charges]);
}

/// [`position_timestep`] over the rayon pool
#[allow(clippy::too_many_arguments)]
pub fn position_timestep_par<T: Real>(
    n_charges: usize,
    dt: T,
    x: &mut [T],
    y: &mut [T],
    z: &mut [T],
    u: &[T],
    v: &[T],
    w: &[T],
) {
    drift_par(dt, &mut x[..n_charges], &u[..n_charges]);
    drift_par(dt, &mut y[..n_charges], &v[..n_charges]);
    drift_par(dt, &mut z[..n_charges], &w[..n_charges]);
}

/// Leapfrog verlet timesteps on a single thread.
///
/// Half drift, kick, then `n_steps - 1` full drift/kick pairs and a closing
/// half drift, so positions move `n_steps` full steps in total.
/// `n_steps == 0` leaves every array untouched.
#[allow(clippy::too_many_arguments)]
pub fn verlet_timesteps<T: Real>(
    n_steps: usize,
    n_charges: usize,
    dt: T,
    x: &mut [T],
    y: &mut [T],
    z: &mut [T],
    u: &mut [T],
    v: &mut [T],
    w: &mut [T],
) {
    let arrays = Arrays { x, y, z, u, v, w };
    leapfrog(Schedule::Serial, n_steps, n_charges, dt, arrays);
}

/// [`verlet_timesteps`] with both phases parallelised over charges.
/// Produces the same bits as the serial schedule.
#[allow(clippy::too_many_arguments)]
pub fn verlet_timesteps_par<T: Real>(
    n_steps: usize,
    n_charges: usize,
    dt: T,
    x: &mut [T],
    y: &mut [T],
    z: &mut [T],
    u: &mut [T],
    v: &mut [T],
    w: &mut [T],
) {
    let arrays = Arrays { x, y, z, u, v, w };
    leapfrog(Schedule::Parallel, n_steps, n_charges, dt, arrays);
}

/// Run the leapfrog schedule on borrowed state arrays
pub fn leapfrog<T: Real>(
    schedule: Schedule,
    n_steps: usize,
    n_charges: usize,
    dt: T,
    arrays: Arrays<'_, T>,
) {
    if n_steps == 0 {
        return;
    }
    let Arrays { x, y, z, u, v, w } = arrays;
    let half_dt = dt * nalgebra::convert::<f64, T>(0.5);

    drift_phase(schedule, n_charges, half_dt, x, y, z, u, v, w);
    kick_phase(schedule, n_charges, dt, x, y, z, u, v, w);

    for _ in 0..n_steps - 1 {
        drift_phase(schedule, n_charges, dt, x, y, z, u, v, w);
        kick_phase(schedule, n_charges, dt, x, y, z, u, v, w);
    }

    drift_phase(schedule, n_charges, half_dt, x, y, z, u, v, w);
}

#[allow(clippy::too_many_arguments)]
fn drift_phase<T: Real>(
    schedule: Schedule,
    n_charges: usize,
    dt: T,
    x: &mut [T],
    y: &mut [T],
    z: &mut [T],
    u: &[T],
    v: &[T],
    w: &[T],
) {
    match schedule {
        Schedule::Serial => position_timestep(n_charges, dt, x, y, z, u, v, w),
        Schedule::Parallel => position_timestep_par(n_charges, dt, x, y, z, u, v, w),
    }
}

#[allow(clippy::too_many_arguments)]
fn kick_phase<T: Real>(
    schedule: Schedule,
    n_charges: usize,
    dt: T,
    x: &[T],
    y: &[T],
    z: &[T],
    u: &mut [T],
    v: &mut [T],
    w: &mut [T],
) {
    match schedule {
        Schedule::Serial => velocity_timestep(n_charges, dt, x, y, z, u, v, w),
        Schedule::Parallel => velocity_timestep_par(n_charges, dt, x, y, z, u, v, w),
    }
}

fn drift<T: Real>(dt: T, coords: &mut [T], vels: &[T]) {
    for (c, &vel) in coords.iter_mut().zip(vels) {
        *c = clamp_unit(*c + dt * vel);
    }
}

fn drift_par<T: Real>(dt: T, coords: &mut [T], vels: &[T]) {
    coords
        .par_iter_mut()
        .zip(vels.par_iter())
        .for_each(|(c, &vel)| *c = clamp_unit(*c + dt * vel));
}

/// `max(c, -1)` then `min(c, 1)`; a NaN coordinate stays NaN
#[inline]
pub fn clamp_unit<T: Real>(c: T) -> T {
    let one = nalgebra::one::<T>();
    if c < -one {
        -one
    } else if one < c {
        one
    } else {
        c
    }
}
