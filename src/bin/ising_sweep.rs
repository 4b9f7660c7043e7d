//! Temperature sweep command-line interface.
//!
//! Reads an optional YAML configuration, applies command line overrides, runs the sweep,
//! and prints the observable table.

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ising2d::{EquilibrationSchedule, ObservableTable, Simulation, SimulationConfig};
use serde::Serialize;
use std::fs;
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Metropolis monte carlo temperature sweep of the 2D Ising model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config_file: Option<String>,

    /// Override lattice side length
    #[arg(short)]
    n: Option<usize>,

    /// Override elementary steps per sweep
    #[arg(long)]
    mc_changes: Option<usize>,

    /// Override equilibration sweeps
    #[arg(long)]
    n_steps_eq: Option<usize>,

    /// Override sampling sweeps
    #[arg(long)]
    n_steps_mc: Option<usize>,

    /// Override lowest temperature
    #[arg(long)]
    t_min: Option<f64>,

    /// Override upper temperature bound (exclusive)
    #[arg(long)]
    t_max: Option<f64>,

    /// Override number of temperatures
    #[arg(long)]
    n_points: Option<usize>,

    /// Override coupling constant J
    #[arg(long, allow_hyphen_values = true)]
    coupling: Option<f64>,

    /// Override external field H
    #[arg(long, allow_hyphen_values = true)]
    field: Option<f64>,

    /// Override master seed
    #[arg(long)]
    seed: Option<u64>,

    /// Only run n_steps_eq sweeps before sampling
    #[arg(long)]
    equilibration_only: bool,

    /// Print the table as JSON instead of columns
    #[arg(long)]
    json: bool,

    /// Write the final lattice of every temperature to this JSON file
    #[arg(long)]
    snapshots: Option<String>,

    /// Output file (default stdout)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Serialize)]
struct Snapshot {
    temperature: f64,
    acceptance_rate: Option<f64>,
    spins: Vec<Vec<f64>>,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let config = match &args.config_file {
        Some(path) => {
            info!("Reading configuration from: {}", path);
            let content = fs::read_to_string(path)
                .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;
            parse_config(&content)?
        }
        None => SimulationConfig::default(),
    };
    Ok(apply_overrides(config, args))
}

fn parse_config(content: &str) -> Result<SimulationConfig> {
    serde_yml::from_str::<SimulationConfig>(content).wrap_err("Failed to parse configuration file")
}

/// Command line values win over file values; `mc_changes` keeps following `n` unless set.
fn apply_overrides(mut config: SimulationConfig, args: &Args) -> SimulationConfig {
    config.n = args.n.unwrap_or(config.n);
    config.mc_changes = args.mc_changes.or(config.mc_changes);
    config.n_steps_eq = args.n_steps_eq.unwrap_or(config.n_steps_eq);
    config.n_steps_mc = args.n_steps_mc.unwrap_or(config.n_steps_mc);
    config.t_min = args.t_min.unwrap_or(config.t_min);
    config.t_max = args.t_max.unwrap_or(config.t_max);
    config.n_points = args.n_points.unwrap_or(config.n_points);
    config.coupling = args.coupling.unwrap_or(config.coupling);
    config.field = args.field.unwrap_or(config.field);
    config.seed = args.seed.unwrap_or(config.seed);
    if args.equilibration_only {
        config.schedule = EquilibrationSchedule::EquilibrationOnly;
    }
    config
}

fn run_with_snapshots(sim: &Simulation, path: &str) -> Result<ObservableTable> {
    let mut table = ObservableTable::default();
    let mut snapshots = Vec::with_capacity(sim.temperatures().len());
    for (index, t) in sim.temperatures().iter().enumerate() {
        let run = sim.run_index(index, *t)?;
        table.push(run.record);
        snapshots.push(Snapshot {
            temperature: *t,
            acceptance_rate: run.acceptance_rate,
            spins: run.lattice.snapshot(),
        });
    }
    let file = fs::File::create(path)
        .wrap_err_with(|| format!("Unable to create snapshot file: {}", path))?;
    serde_json::to_writer(file, &snapshots).wrap_err("Failed to write snapshots")?;
    info!("Wrote {} lattice snapshots to {}", snapshots.len(), path);
    Ok(table)
}

#[cfg(feature = "parallel")]
fn run_table(sim: &Simulation) -> Result<ObservableTable> {
    Ok(sim.par_run()?)
}

#[cfg(not(feature = "parallel"))]
fn run_table(sim: &Simulation) -> Result<ObservableTable> {
    Ok(sim.run()?)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!("Configuration loaded:\n{:?}", config);

    let sim = Simulation::new(config).wrap_err("Invalid simulation configuration")?;
    let table = match &args.snapshots {
        Some(path) => run_with_snapshots(&sim, path)?,
        None => run_table(&sim)?,
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            fs::File::create(path)
                .wrap_err_with(|| format!("Unable to create output file: {}", path))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    if args.json {
        serde_json::to_writer_pretty(&mut out, &table).wrap_err("Failed to write table")?;
        writeln!(out)?;
    } else {
        table.write_columns(&mut out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ising-sweep").chain(flags.iter().copied()))
            .unwrap()
    }

    #[test]
    fn file_and_flag_size_agree() {
        let from_file = apply_overrides(parse_config("n: 32\n").unwrap(), &args(&[]));
        let from_flag = apply_overrides(SimulationConfig::default(), &args(&["-n", "32"]));
        assert_eq!(from_file.mc_changes(), 1024);
        assert_eq!(from_file, from_flag);
    }

    #[test]
    fn flags_override_file() {
        let file = parse_config("n: 8\nmc_changes: 100\nfield: 0.5\n").unwrap();
        let config = apply_overrides(file, &args(&["-n", "32", "--field", "-0.2"]));
        assert_eq!(config.n, 32);
        assert_eq!(config.mc_changes(), 100);
        assert_eq!(config.field, -0.2);

        let config = apply_overrides(file, &args(&["--mc-changes", "7", "--equilibration-only"]));
        assert_eq!(config.mc_changes(), 7);
        assert_eq!(config.schedule, EquilibrationSchedule::EquilibrationOnly);
        assert_eq!(config.n_points, SimulationConfig::default().n_points);
    }
}
