//! Velocity update for the charged n-body system
//!
//! Every charge is kicked by the inverse-square repulsion of every other
//! charge (direct all-pairs sum, no cutoff). The positions are read-only
//! here and the velocities are written, so the two sets of slices can never
//! alias.

use rayon::prelude::*;

use crate::simulation::states::Real;

/// Only update velocity by the n-body repulsion from the other charges.
///
/// For each charge `i`, sums `dt * (p_i - p_j) / |p_i - p_j|^3` over all
/// `j != i` in ascending `j` and adds it to `(u[i], v[i], w[i])`.
/// Coincident charges are not guarded and yield non-finite velocities.
#[allow(clippy::too_many_arguments)]
pub fn velocity_timestep<T: Real>(
    n_charges: usize,
    dt: T,
    x: &[T],
    y: &[T],
    z: &[T],
    u: &mut [T],
    v: &mut [T],
    w: &mut [T],
) {
    let (x, y, z) = (&x[..n_charges], &y[..n_charges], &z[..n_charges]);

    let kicks = u[..n_charges]
        .iter_mut()
        .zip(&mut v[..n_charges])
        .zip(&mut w[..n_charges]);

    for (i, ((ui, vi), wi)) in kicks.enumerate() {
        let [du, dv, dw] = repulsion_on(i, dt, x, y, z);
        *ui += du;
        *vi += dv;
        *wi += dw;
    }
}

/// [`velocity_timestep`] with the outer loop over charges spread across the
/// rayon pool. Each charge still sums its partners in the same order, so the
/// result is bit-identical to the serial version.
#[allow(clippy::too_many_arguments)]
pub fn velocity_timestep_par<T: Real>(
    n_charges: usize,
    dt: T,
    x: &[T],
    y: &[T],
    z: &[T],
    u: &mut [T],
    v: &mut [T],
    w: &mut [T],
) {
    let (x, y, z) = (&x[..n_charges], &y[..n_charges], &z[..n_charges]);

    u[..n_charges]
        .par_iter_mut()
        .zip(v[..n_charges].par_iter_mut())
        .zip(w[..n_charges].par_iter_mut())
        .enumerate()
        .for_each(|(i, ((ui, vi), wi))| {
            let [du, dv, dw] = repulsion_on(i, dt, x, y, z);
            *ui += du;
            *vi += dv;
            *wi += dw;
        });
}

/// Summed kick on charge `i` from every other charge.
///
/// The partner range is split around `i` so the inner loops carry no
/// branch; both halves run in ascending `j`.
#[inline]
fn repulsion_on<T: Real>(i: usize, dt: T, x: &[T], y: &[T], z: &[T]) -> [T; 3] {
    let p = [x[i], y[i], z[i]];
    let mut d = [nalgebra::zero::<T>(); 3];

    accumulate(&mut d, dt, p, &x[..i], &y[..i], &z[..i]);
    accumulate(&mut d, dt, p, &x[i + 1..], &y[i + 1..], &z[i + 1..]);

    d
}

#[inline]
fn accumulate<T: Real>(d: &mut [T; 3], dt: T, p: [T; 3], xs: &[T], ys: &[T], zs: &[T]) {
    for ((&xj, &yj), &zj) in xs.iter().zip(ys).zip(zs) {
        let diff_x = p[0] - xj;
        let diff_y = p[1] - yj;
        let diff_z = p[2] - zj;
        let r2 = diff_x * diff_x + diff_y * diff_y + diff_z * diff_z;
        let r = r2.sqrt();
        let factor = dt / (r2 * r);

        d[0] += factor * diff_x;
        d[1] += factor * diff_y;
        d[2] += factor * diff_z;
    }
}
