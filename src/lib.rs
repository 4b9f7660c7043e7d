#![deny(
    missing_docs,
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

//! `ising2d` is a library for simulating the 2D Ising model on a periodic square lattice
//! using single spin flip Metropolis monte carlo.
//!
//! Spins are continuous values in `[-1, 1]` and a move negates one of them. The energy of a
//! configuration is `E = -(J/2) sum_i S_i sum_<ij> S_j - H sum_i S_i`, and every proposed move
//! is evaluated from the local field of its site alone.
//!
//! It also offers a few feature gated modules:
//! - temperature sweeps on a rayon pool with the `parallel` feature.
//! - autocorrelations of sampled energies and magnetizations: use `autocorrelations`
//! - config and observable table serialization using serde with the `serialize` feature.
//!
//! # Basic Example
//! ```
//! use ising2d::*;
//!
//! let config = SimulationConfig::default()
//!     .with_size(8)
//!     .with_sweeps(20, 20)
//!     .with_temperatures(1.0, 4.0, 6)
//!     .with_couplings(1.0, 0.01);
//!
//! let sim = Simulation::new(config).unwrap();
//! let table = sim.run().unwrap();
//! assert_eq!(table.len(), 6);
//!
//! for row in table.records() {
//!     let error = row.energy().std_error();
//!     println!("{} {} {}", row.temperature, row.energy_mean, error);
//! }
//! ```
//!
//! # Driving a lattice by hand
//! ```
//! use ising2d::*;
//! use rand::prelude::*;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(1234);
//! let mut lattice = Lattice::new(16, &mut rng).unwrap();
//! let couplings = Couplings::new(1.0, 0.01);
//! let mut sampler = MetropolisSampler::new(couplings, 2.0, rng).unwrap();
//!
//! let mc_changes = lattice.n_sites();
//! sampler.sweeps(&mut lattice, 100, mc_changes);
//! let e = couplings.total_energy(&lattice);
//! let m = magnetization(&lattice);
//! assert!(m.abs() <= 256.0);
//! println!("E = {}, M = {}", e, m);
//! ```

/// Autocorrelations of sampled time series.
#[cfg(feature = "autocorrelations")]
pub mod autocorrelations;
/// Sweep configuration and the temperature grid.
pub mod config;
/// The hamiltonian and single site energy differences.
pub mod energy;
/// Error types.
pub mod errors;
/// The periodic square lattice.
pub mod lattice;
/// Single spin flip Metropolis updates.
pub mod metropolis;
/// Running sums of observables and the output table.
pub mod observables;
/// Equilibration, sampling, and temperature sweeps.
pub mod simulation;

#[cfg(feature = "autocorrelations")]
pub use autocorrelations::*;
pub use config::{temperature_grid, EquilibrationSchedule, SimulationConfig};
pub use energy::{magnetization, Couplings};
pub use errors::{IsingError, Result};
pub use lattice::Lattice;
pub use metropolis::{acceptance_probability, MetropolisSampler, StepOutcome};
pub use observables::{Moments, ObservableAccumulator, ObservableRecord, ObservableTable, Observables};
pub use simulation::{CancelToken, SampleSeries, Simulation, TemperatureRun};
