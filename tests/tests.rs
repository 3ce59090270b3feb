use chsim::simulation::forces::velocity_timestep;
use chsim::simulation::integrator::{clamp_unit, position_timestep, verlet_timesteps, verlet_timesteps_par};
use chsim::simulation::params::{Parameters, Schedule};
use chsim::simulation::scenario::Simulation;
use chsim::simulation::states::{Real, State, StateError};
use chsim::{charge_interactions_per_second, ConfigError, Precision, RunConfig, Statistics};

/// Two charges at (-d/2, 0, 0) and (d/2, 0, 0), at rest
pub fn two_charge_state<T: Real>(dist: f64) -> State<T> {
    let half = nalgebra::convert::<f64, T>(dist / 2.0);
    let zero = nalgebra::zero::<T>();
    State::from_positions(vec![-half, half], vec![zero, zero], vec![zero, zero]).unwrap()
}

/// Run the serial leapfrog on a state
pub fn advance<T: Real>(state: &mut State<T>, n_steps: usize, dt: f64) {
    let n = state.n_charges();
    let a = state.arrays();
    verlet_timesteps(n_steps, n, nalgebra::convert::<f64, T>(dt), a.x, a.y, a.z, a.u, a.v, a.w);
}

/// Run the rayon leapfrog on a state
pub fn advance_par<T: Real>(state: &mut State<T>, n_steps: usize, dt: f64) {
    let n = state.n_charges();
    let a = state.arrays();
    verlet_timesteps_par(n_steps, n, nalgebra::convert::<f64, T>(dt), a.x, a.y, a.z, a.u, a.v, a.w);
}

fn assert_in_box<T: Real>(state: &State<T>) {
    let one = nalgebra::one::<T>();
    let (x, y, z) = state.positions();
    for c in x.iter().chain(y).chain(z) {
        assert!(*c >= -one && *c <= one, "coordinate {:?} left the box", c);
    }
}

// ==================================================================================
// State tests
// ==================================================================================

#[test]
fn empty_grid_has_no_charges() {
    let state = State::<f64>::new(0);
    assert_eq!(state.n_charges(), 0);
    let (x, y, z) = state.positions();
    assert!(x.is_empty() && y.is_empty() && z.is_empty());
}

#[test]
fn single_charge_sits_at_origin() {
    let state = State::<f32>::new(1);
    assert_eq!(state.n_charges(), 1);
    assert_eq!(state.position(0), nalgebra::Vector3::zeros());
    assert_eq!(state.velocity(0), nalgebra::Vector3::zeros());
}

#[test]
fn two_per_dir_fills_cube_corners() {
    let state = State::<f64>::new(2);
    assert_eq!(state.n_charges(), 8);

    let mut corners: Vec<[f64; 3]> = (0..8)
        .map(|i| {
            let p = state.position(i);
            [p.x, p.y, p.z]
        })
        .collect();
    corners.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut expected = Vec::new();
    for &cx in &[-1.0, 1.0] {
        for &cy in &[-1.0, 1.0] {
            for &cz in &[-1.0, 1.0] {
                expected.push([cx, cy, cz]);
            }
        }
    }
    assert_eq!(corners, expected);
}

#[test]
fn grid_index_follows_x_y_z_nesting() {
    let k = 3;
    let state = State::<f64>::new(k);
    for i in 0..k {
        for j in 0..k {
            for l in 0..k {
                let p = state.position(i * k * k + j * k + l);
                assert_eq!(p.x, -1.0 + i as f64);
                assert_eq!(p.y, -1.0 + j as f64);
                assert_eq!(p.z, -1.0 + l as f64);
            }
        }
    }
}

#[test]
fn last_grid_line_is_exactly_one() {
    for k in [3usize, 7, 10, 13] {
        let state = State::<f32>::new(k);
        let last = state.position(k * k * k - 1);
        assert_eq!(last, nalgebra::Vector3::new(1.0, 1.0, 1.0), "k = {}", k);
        assert_in_box(&state);
    }
}

#[test]
fn velocities_start_at_zero() {
    let state = State::<f64>::new(4);
    let (u, v, w) = state.velocities();
    assert!(u.iter().chain(v).chain(w).all(|&c| c == 0.0));
}

#[test]
fn try_new_matches_new() {
    let state = State::<f64>::try_new(5).unwrap();
    assert_eq!(state, State::<f64>::new(5));
}

#[test]
fn try_new_reports_count_overflow() {
    let err = State::<f32>::try_new(usize::MAX / 2).unwrap_err();
    assert!(matches!(err, StateError::TooManyCharges { .. }));
}

#[test]
fn from_positions_rejects_ragged_arrays() {
    let err = State::<f64>::from_positions(vec![0.0, 1.0], vec![0.0], vec![0.0, 1.0]).unwrap_err();
    assert!(matches!(err, StateError::LengthMismatch { x: 2, y: 1, z: 2 }));
}

// ==================================================================================
// Force / clamp tests
// ==================================================================================

#[test]
fn repulsion_pushes_charges_apart() {
    let mut state = two_charge_state::<f64>(1.0);
    let n = state.n_charges();
    let a = state.arrays();
    velocity_timestep(n, 1.0e-3, a.x, a.y, a.z, a.u, a.v, a.w);

    // unit separation: kick is exactly dt along the separation
    assert_eq!(state.velocity(0), nalgebra::Vector3::new(-1.0e-3, 0.0, 0.0));
    assert_eq!(state.velocity(1), nalgebra::Vector3::new(1.0e-3, 0.0, 0.0));
}

#[test]
fn repulsion_follows_inverse_square() {
    let kick = |dist: f64| {
        let mut state = two_charge_state::<f64>(dist);
        let a = state.arrays();
        velocity_timestep(2, 1.0, a.x, a.y, a.z, a.u, a.v, a.w);
        state.velocity(1).norm()
    };

    let ratio = kick(0.5) / kick(1.0);
    assert!((ratio - 4.0).abs() < 1e-12, "Expected 4x, got {}", ratio);
}

#[test]
fn coincident_charges_are_not_guarded() {
    let mut state = State::<f64>::from_positions(vec![0.25, 0.25], vec![0.0, 0.0], vec![0.0, 0.0]).unwrap();
    let a = state.arrays();
    velocity_timestep(2, 1.0e-7, a.x, a.y, a.z, a.u, a.v, a.w);

    let (u, _, _) = state.velocities();
    assert!(u.iter().all(|c| !c.is_finite()));
}

#[test]
fn clamp_pins_without_touching_velocity() {
    let mut state = State::<f64>::from_positions(vec![0.9], vec![-0.9], vec![0.0]).unwrap();
    let a = state.arrays();
    a.u[0] = 5.0;
    a.v[0] = -5.0;
    position_timestep(1, 1.0, a.x, a.y, a.z, a.u, a.v, a.w);

    assert_eq!(state.position(0), nalgebra::Vector3::new(1.0, -1.0, 0.0));
    assert_eq!(state.velocity(0), nalgebra::Vector3::new(5.0, -5.0, 0.0));
}

#[test]
fn clamp_keeps_nan() {
    assert!(clamp_unit(f64::NAN).is_nan());
    assert_eq!(clamp_unit(f32::INFINITY), 1.0);
    assert_eq!(clamp_unit(f32::NEG_INFINITY), -1.0);
    assert_eq!(clamp_unit(0.5f64), 0.5);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn empty_state_advance_is_noop() {
    let mut state = State::<f32>::new(0);
    advance(&mut state, 100, 1.0e-7);
    assert_eq!(state.n_charges(), 0);
}

#[test]
fn lone_charge_never_moves() {
    let mut state = State::<f64>::new(1);
    advance(&mut state, 50, 1.0e-3);
    assert_eq!(state.position(0), nalgebra::Vector3::zeros());
    assert_eq!(state.velocity(0), nalgebra::Vector3::zeros());
}

#[test]
fn zero_steps_leave_arrays_bit_identical() {
    let mut state = State::<f64>::new(3);
    {
        let a = state.arrays();
        for (i, c) in a.u.iter_mut().enumerate() {
            *c = 0.1 * i as f64;
        }
    }
    let before = state.clone();
    advance(&mut state, 0, 1.0e-3);
    assert_eq!(state, before);
}

#[test]
fn charges_stay_in_box() {
    for steps in [0usize, 1, 2, 5, 20] {
        let mut state = State::<f64>::new(3);
        advance(&mut state, steps, 1.0e-2);
        assert_in_box(&state);

        let mut state = State::<f32>::new(4);
        advance(&mut state, steps, 1.0e-2);
        assert_in_box(&state);
    }
}

#[test]
fn corner_charges_stay_pinned() {
    // every corner is pushed outward, so each stays clamped on its corner
    let mut state = State::<f64>::new(2);
    let start = state.clone();
    advance(&mut state, 10, 1.0e-3);
    assert_eq!(state.positions(), start.positions());

    let (u, _, _) = state.velocities();
    let (x, _, _) = state.positions();
    for (ui, xi) in u.iter().zip(x) {
        assert!(ui * xi > 0.0, "velocity should point out of the box");
    }
}

#[test]
fn symmetric_pair_stays_mirrored() {
    let mut double = two_charge_state::<f64>(1.0);
    advance(&mut double, 1, 1.0e-3);
    let (x, _, _) = double.positions();
    assert!((x[0] + x[1]).abs() < 1e-12);
    assert!(x[1] > 0.5, "charges should separate");

    let mut float = two_charge_state::<f32>(1.0);
    advance(&mut float, 1, 1.0e-3);
    let (x, _, _) = float.positions();
    assert!((x[0] + x[1]).abs() < 1e-6);
    assert!(x[1] > 0.5);
}

#[test]
fn float_and_double_agree() {
    let mut double = two_charge_state::<f64>(1.0);
    let mut float = two_charge_state::<f32>(1.0);
    advance(&mut double, 10, 1.0e-3);
    advance(&mut float, 10, 1.0e-3);

    for i in 0..2 {
        let pd = double.position(i);
        let pf = float.position(i);
        assert!((pd.x - pf.x as f64).abs() < 1e-6, "{} vs {}", pd.x, pf.x);
        let vd = double.velocity(i);
        let vf = float.velocity(i);
        assert!((vd.x - vf.x as f64).abs() < 1e-6, "{} vs {}", vd.x, vf.x);
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let mut a = State::<f32>::new(4);
    let mut b = State::<f32>::new(4);
    advance(&mut a, 5, 1.0e-3);
    advance(&mut b, 5, 1.0e-3);
    assert_eq!(a, b);
}

#[test]
fn parallel_schedule_matches_serial() {
    let mut serial = State::<f64>::new(5);
    let mut parallel = State::<f64>::new(5);
    advance(&mut serial, 4, 1.0e-3);
    advance_par(&mut parallel, 4, 1.0e-3);
    assert_eq!(serial, parallel);
}

#[test]
fn simulation_runs_requested_steps() {
    let mut params = Parameters::new(3, 3);
    params.dt = 1.0e-3;
    let mut sim = Simulation::<f64>::build(params.clone()).unwrap();
    sim.run();

    let mut manual = State::<f64>::new(3);
    advance(&mut manual, 3, 1.0e-3);
    assert_eq!(sim.state, manual);

    params.schedule = Schedule::Parallel;
    let mut par = Simulation::<f64>::build(params).unwrap();
    par.run();
    assert_eq!(par.state, manual);
}

// ==================================================================================
// Configuration / statistics tests
// ==================================================================================

#[test]
fn run_file_parses_all_fields() {
    let yaml = "precision: float\nn_steps: 12\nn_charges_per_dir: 6\ndt: 1.0e-5\nschedule: parallel\n";
    let cfg = RunConfig::from_reader(yaml.as_bytes()).unwrap();
    let (precision, params) = cfg.into_parameters().unwrap();

    assert_eq!(precision, Precision::Float);
    assert_eq!(params.n_steps, 12);
    assert_eq!(params.n_charges_per_dir, 6);
    assert_eq!(params.dt, 1.0e-5);
    assert_eq!(params.schedule, Schedule::Parallel);
}

#[test]
fn run_file_defaults() {
    let cfg = RunConfig::from_reader("precision: double\nn_steps: 1\n".as_bytes()).unwrap();
    let (_, params) = cfg.into_parameters().unwrap();
    assert_eq!(params, Parameters::new(1, 0));
}

#[test]
fn run_file_rejects_unknown_precision() {
    assert!(RunConfig::from_reader("precision: half\n".as_bytes()).is_err());
}

#[test]
fn missing_step_count_is_reported() {
    let cfg = RunConfig { precision: Some(Precision::Double), ..Default::default() };
    assert!(matches!(cfg.into_parameters(), Err(ConfigError::Missing("n_steps"))));
}

#[test]
fn later_config_wins_merge() {
    let file = RunConfig { n_steps: Some(5), n_charges_per_dir: Some(2), ..Default::default() };
    let cli = RunConfig { n_steps: Some(9), precision: Some(Precision::Float), ..Default::default() };
    let merged = file.merge(cli);
    assert_eq!(merged.n_steps, Some(9));
    assert_eq!(merged.n_charges_per_dir, Some(2));
    assert_eq!(merged.precision, Some(Precision::Float));
}

#[test]
fn throughput_counts_all_pairs() {
    assert_eq!(charge_interactions_per_second(10, 5, 2.0), 250.0);
}

#[test]
fn statistics_report_uses_legacy_keys() {
    let params = Parameters::new(5, 2);
    let stats = Statistics::new(Precision::Double, &params, 0.5);
    assert_eq!(stats.n_charges, 8);
    assert_eq!(stats.interactions_per_second, 640.0);

    let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
    assert_eq!(json["precision"], "double");
    assert_eq!(json["num charges per direction"], 2);
    assert_eq!(json["num charges"], 8);
    assert_eq!(json["n_steps"], 5);
    assert_eq!(json["runtime (seconds)"], 0.5);
    assert_eq!(json["charge interactions per second"], 640.0);
}
