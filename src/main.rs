use chsim::{bench_verlet_curve, run_benchmark, CurvePoint};
use chsim::{Precision, RunConfig, Schedule};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

/// Perform an n-body simulation of charged particles trapped in a box.
/// The particles are initially arranged in a regular N^3 grid.
#[derive(Parser, Debug)]
#[command(name = "chsim", version)]
struct Args {
    /// Precision for arithmetic
    #[arg(value_enum, required_unless_present = "file")]
    precision: Option<Precision>,

    /// Number of time steps to simulate
    #[arg(required_unless_present = "file")]
    n_steps: Option<usize>,

    /// Number of charges per direction (0 if omitted)
    n_charges_per_dir: Option<usize>,

    /// YAML run file; positional arguments override its values
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Step size
    #[arg(long)]
    dt: Option<f64>,

    /// Split each phase across all cores
    #[arg(long)]
    parallel: bool,

    /// Sweep grid sizes 1..=N and print a CSV curve instead of one report
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_run_config(args: &Args) -> Result<RunConfig> {
    let from_file = match &args.file {
        Some(path) => RunConfig::from_path(path)
            .with_context(|| format!("failed to load run file {}", path.display()))?,
        None => RunConfig::default(),
    };

    let from_cli = RunConfig {
        precision: args.precision,
        n_steps: args.n_steps,
        n_charges_per_dir: args.n_charges_per_dir,
        dt: args.dt,
        schedule: args.parallel.then_some(Schedule::Parallel),
    };

    Ok(from_file.merge(from_cli))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let (precision, parameters) = load_run_config(&args)?.into_parameters()?;
    log::debug!("{:?}", parameters);

    if args.bench {
        let points = bench_verlet_curve(precision, &parameters, parameters.n_charges_per_dir)?;
        println!("{}", CurvePoint::csv_header());
        for point in &points {
            println!("{}", point.to_csv_row());
        }
        return Ok(());
    }

    let stats = run_benchmark(precision, &parameters).context("simulation failed")?;
    println!("{}", stats.to_json()?);

    Ok(())
}
