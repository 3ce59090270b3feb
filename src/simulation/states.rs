//! Particle state for the charged N-body benchmark.
//!
//! `State<T>` owns six structure-of-arrays sequences:
//! - positions `x`, `y`, `z`
//! - velocities `u`, `v`, `w`
//!
//! The integrator never owns these; it borrows them through [`Arrays`].

use std::collections::TryReserveError;

use nalgebra::{RealField, Vector3};
use thiserror::Error;

/// Floating-point type the simulation can run in (`f32` or `f64`)
pub trait Real: RealField + Copy + Send + Sync {}

impl<T: RealField + Copy + Send + Sync> Real for T {}

/// Failures while building a [`State`]
#[derive(Debug, Error)]
pub enum StateError {
    #[error("{per_dir} charges per direction overflows the particle count")]
    TooManyCharges { per_dir: usize },

    #[error("failed to allocate particle arrays: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("position arrays differ in length (x: {x}, y: {y}, z: {z})")]
    LengthMismatch { x: usize, y: usize, z: usize },
}

/// Mutable, non-owning handles to the six arrays of a [`State`]
pub struct Arrays<'a, T> {
    pub x: &'a mut [T],
    pub y: &'a mut [T],
    pub z: &'a mut [T],
    pub u: &'a mut [T],
    pub v: &'a mut [T],
    pub w: &'a mut [T],
}

#[derive(Debug, Clone, PartialEq)]
pub struct State<T> {
    n_charges: usize,
    x: Vec<T>, // positions
    y: Vec<T>,
    z: Vec<T>,
    u: Vec<T>, // velocities
    v: Vec<T>,
    w: Vec<T>,
}

impl<T: Real> State<T> {
    /// Lay out `n_charges_per_dir^3` charges on a regular grid in `[-1, 1]^3`.
    ///
    /// Aborts on allocation failure like any `Vec` allocation; use
    /// [`State::try_new`] to get the failure back as an error.
    ///
    /// # Panics
    /// If `n_charges_per_dir^3` overflows `usize`.
    pub fn new(n_charges_per_dir: usize) -> Self {
        let n_charges = n_charges_per_dir.pow(3);
        let zero = nalgebra::zero::<T>();

        let mut state = Self {
            n_charges,
            x: vec![zero; n_charges],
            y: vec![zero; n_charges],
            z: vec![zero; n_charges],
            u: vec![zero; n_charges],
            v: vec![zero; n_charges],
            w: vec![zero; n_charges],
        };
        state.lay_out_grid(n_charges_per_dir);
        state
    }

    /// Same layout as [`State::new`], reporting overflow and allocation failure
    pub fn try_new(n_charges_per_dir: usize) -> Result<Self, StateError> {
        let n_charges = n_charges_per_dir
            .checked_mul(n_charges_per_dir)
            .and_then(|n| n.checked_mul(n_charges_per_dir))
            .ok_or(StateError::TooManyCharges { per_dir: n_charges_per_dir })?;

        let mut state = Self {
            n_charges,
            x: zeroed(n_charges)?,
            y: zeroed(n_charges)?,
            z: zeroed(n_charges)?,
            u: zeroed(n_charges)?,
            v: zeroed(n_charges)?,
            w: zeroed(n_charges)?,
        };
        state.lay_out_grid(n_charges_per_dir);
        log::debug!("allocated state for {} charges", n_charges);
        Ok(state)
    }

    /// Build a state from explicit positions, all velocities zero
    pub fn from_positions(x: Vec<T>, y: Vec<T>, z: Vec<T>) -> Result<Self, StateError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(StateError::LengthMismatch { x: x.len(), y: y.len(), z: z.len() });
        }
        let n_charges = x.len();
        let zero = nalgebra::zero::<T>();

        Ok(Self {
            n_charges,
            x,
            y,
            z,
            u: vec![zero; n_charges],
            v: vec![zero; n_charges],
            w: vec![zero; n_charges],
        })
    }

    pub fn n_charges(&self) -> usize {
        self.n_charges
    }

    /// Borrow all six arrays at once for the integrator
    pub fn arrays(&mut self) -> Arrays<'_, T> {
        Arrays {
            x: &mut self.x,
            y: &mut self.y,
            z: &mut self.z,
            u: &mut self.u,
            v: &mut self.v,
            w: &mut self.w,
        }
    }

    pub fn positions(&self) -> (&[T], &[T], &[T]) {
        (&self.x, &self.y, &self.z)
    }

    pub fn velocities(&self) -> (&[T], &[T], &[T]) {
        (&self.u, &self.v, &self.w)
    }

    pub fn position(&self, i: usize) -> Vector3<T> {
        Vector3::new(self.x[i], self.y[i], self.z[i])
    }

    pub fn velocity(&self, i: usize) -> Vector3<T> {
        Vector3::new(self.u[i], self.v[i], self.w[i])
    }

    // index i*k*k + j*k + l holds grid point (i, j, l)
    fn lay_out_grid(&mut self, per_dir: usize) {
        // k = 0 is empty, k = 1 is a single charge at the origin
        if per_dir < 2 {
            return;
        }

        let two = nalgebra::convert::<f64, T>(2.0);
        let incr = two / nalgebra::convert::<f64, T>((per_dir - 1) as f64);

        let mut index = 0;
        for i in 0..per_dir {
            let xi = grid_coord(incr, i, per_dir);
            for j in 0..per_dir {
                let yj = grid_coord(incr, j, per_dir);
                for l in 0..per_dir {
                    self.x[index] = xi;
                    self.y[index] = yj;
                    self.z[index] = grid_coord(incr, l, per_dir);
                    index += 1;
                }
            }
        }
    }
}

/// `-1 + incr * i`, capped at 1; the last grid line is pinned to exactly 1
fn grid_coord<T: Real>(incr: T, i: usize, per_dir: usize) -> T {
    let one = nalgebra::one::<T>();
    if i + 1 == per_dir {
        return one;
    }
    let c = -one + incr * nalgebra::convert::<f64, T>(i as f64);
    if one < c {
        one
    } else {
        c
    }
}

fn zeroed<T: Real>(n: usize) -> Result<Vec<T>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(n)?;
    buf.resize(n, nalgebra::zero::<T>());
    Ok(buf)
}
