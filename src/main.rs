//! blocksim demo CLI
//!
//! Runs a closed-loop tracking model: an integrator follows a setpoint
//! through a proportional gain, and a comparator flags when the output is
//! within range.
//!
//! # Example
//!
//! ```bash
//! blocksim --duration 5 --dt 0.05 --gain 1.5
//! blocksim --config settings.json --json
//! ```

use std::error::Error;
use std::path::PathBuf;

use blocksim::prelude::*;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// blocksim demo
///
/// Simulates y' = k (r - y) with a forward-Euler integrator and prints the
/// response. Sampling comes from a JSON settings file and/or flags.
#[derive(Parser, Debug)]
#[command(name = "blocksim")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with `start`, `duration` and `dt`
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Time step, overrides the config file
    #[arg(long)]
    dt: Option<f64>,

    /// Simulation duration, overrides the config file
    #[arg(short = 'd', long)]
    duration: Option<f64>,

    /// Loop gain k
    #[arg(short = 'k', long, default_value = "2.0")]
    gain: f64,

    /// Setpoint r
    #[arg(short = 'r', long, default_value = "1.0")]
    setpoint: f64,

    /// Fraction of the setpoint at which the output counts as settled
    #[arg(long, default_value = "0.95")]
    band: f64,

    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn load_settings(args: &Args) -> Result<SimulationSettings, Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => SimulationSettings::default(),
    };
    if let Some(dt) = args.dt {
        settings.dt = dt;
    }
    if let Some(duration) = args.duration {
        settings.duration = duration;
    }
    settings.validate()?;
    Ok(settings)
}

/// r -> Sum(+-) -> Gain(k) -> Integrator -> y, with y fed back into the sum
fn tracking_model(args: &Args, dt: f64) -> SimResult<Model> {
    let mut model = Model::new();
    let r = model.add_input("r", ValueType::Real)?;

    let error = model.build(|p| Sum::new("error", ValueType::Real, "+-", p))?;
    let gain = model.build(|p| Gain::new("gain", ValueType::Real, Value::Real(args.gain), p))?;
    let int = model.build(|p| Integrator::new("int", dt, p))?;
    let no_reset = model.build(|p| Constant::new("no_reset", ValueType::Boolean, Value::Bool(false), p))?;
    let ic = model.build(|p| Constant::new("ic", ValueType::Real, Value::Real(0.0), p))?;
    let band = model.build(|p| Gain::new("band", ValueType::Real, Value::Real(args.band), p))?;
    let settled = model.build(|p| Relational::parse("settled", ValueType::Real, ">=", p))?;

    let y = model.outport(int, "y")?;
    model.connect(error, "u0", r)?;
    model.connect(error, "u1", y)?;
    model.connect(gain, "u", model.outport(error, "y")?)?;
    model.connect(int, "uDot", model.outport(gain, "y")?)?;
    model.connect(int, "r", model.outport(no_reset, "y")?)?;
    model.connect(int, "IC", model.outport(ic, "y")?)?;
    model.connect(band, "u", r)?;
    model.connect(settled, "u0", y)?;
    model.connect(settled, "u1", model.outport(band, "y")?)?;

    model.add_output("y", y)?;
    model.add_output("settled", model.outport(settled, "y")?)?;
    Ok(model)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(args)?;
    let time = settings.time_vector()?;
    info!(
        start = settings.start,
        duration = settings.duration,
        dt = settings.dt,
        gain = args.gain,
        setpoint = args.setpoint,
        "Starting demo"
    );

    let mut model = tracking_model(args, settings.dt)?;
    let setpoint = vec![args.setpoint; time.len()];
    let input = SimData::new(time).with_signal("r", setpoint);
    let output = Simulation::run_model(&mut model, &input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let y = output.signal("y").and_then(Series::as_real).unwrap_or(&[]);
    let settled = output.signal("settled").and_then(Series::as_bool).unwrap_or(&[]);
    let first_settled = settled
        .iter()
        .position(|&s| s)
        .and_then(|k| output.time().get(k));

    println!("Samples:       {}", output.len());
    println!("Final output:  {:.6}", y.last().copied().unwrap_or(f64::NAN));
    match first_settled {
        Some(t) => println!("Settled at:    t = {:.4}", t),
        None => println!("Settled at:    never"),
    }

    if let Some(int) = model.find("int") {
        println!("\nIntegrator ports after the run:");
        print!("{}", model.port_table(int, PortDirection::Input)?);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,blocksim=info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!(error = %e, "simulation failed");
        std::process::exit(1);
    }
}
