extern crate ising2d;
extern crate rand;
use ising2d::*;
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};

fn small_config(n: usize) -> SimulationConfig {
    SimulationConfig::default()
        .with_size(n)
        .with_sweeps(20, 20)
        .with_temperatures(0.5, 5.0, 5)
        .with_couplings(1.0, 0.01)
        .with_seed(42)
}

#[test]
fn aligned_two_by_two_energy() {
    let lattice = Lattice::uniform(2, 1.0).unwrap();
    let couplings = Couplings::new(1.0, 0.01);
    // Each of the 4 sites: -(1/2) * 1 * (1 + 1 + 1 + 1) - 0.01 * 1
    let expected = 4.0 * (-0.5 * 4.0 - 0.01);
    assert!((couplings.total_energy(&lattice) - expected).abs() < 1e-12);
    assert!((expected - (-8.04)).abs() < 1e-12);
}

#[test]
fn delta_energy_consistency_along_a_run() {
    let couplings = Couplings::new(0.9, 0.3);
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let n = [1, 2, 5][seed as usize % 3];
        let mut lattice = Lattice::new(n, &mut rng).unwrap();
        let mut sampler = MetropolisSampler::new(couplings, 1.7, rng).unwrap();
        let mut energy = couplings.total_energy(&lattice);
        for _ in 0..500 {
            let outcome = sampler.step(&mut lattice);
            if outcome.accepted {
                energy += outcome.delta_e;
            }
        }
        assert!((energy - couplings.total_energy(&lattice)).abs() < 1e-8);
    }
}

#[test]
fn magnetization_bound_after_sampling() {
    let sim = Simulation::new(small_config(6)).unwrap();
    for (index, t) in sim.temperatures().iter().enumerate() {
        let run = sim.run_index(index, *t).unwrap();
        assert!(magnetization(&run.lattice).abs() <= 36.0);
        assert!(run.lattice.spins().iter().all(|s| (-1.0..=1.0).contains(s)));
        // Per-site normalization keeps the mean magnetization in [-1, 1].
        assert!(run.record.magnetization_mean.abs() <= 1.0);
    }
}

#[test]
fn low_temperature_has_lower_energy() {
    let config = small_config(8)
        .with_sweeps(100, 50)
        .with_temperatures(0.2, 20.0, 2);
    let table = Simulation::new(config).unwrap().run().unwrap();
    let rows = table.records();
    assert!(rows[0].energy_mean < rows[1].energy_mean);
}

#[test]
fn low_temperature_accepts_fewer_moves() {
    let sim = Simulation::new(small_config(8)).unwrap();
    let cold = sim.run_index(0, 0.1).unwrap().acceptance_rate.unwrap();
    let hot = sim.run_index(0, 50.0).unwrap().acceptance_rate.unwrap();
    assert!(cold < hot, "{} vs {}", cold, hot);
}

#[test]
fn zero_field_is_rejected() {
    let config = small_config(4).with_couplings(1.0, 0.0);
    assert_eq!(
        Simulation::new(config).unwrap_err(),
        IsingError::InvalidField { field: 0.0 }
    );
}

#[test]
fn zero_sampling_sweeps_is_rejected() {
    let config = small_config(4).with_sweeps(10, 0);
    assert_eq!(Simulation::new(config).unwrap_err(), IsingError::NoSamples);
}

#[test]
fn every_error_moment_is_finite() {
    let table = Simulation::new(small_config(4)).unwrap().run().unwrap();
    assert_eq!(table.len(), 5);
    for row in table.records() {
        for m in [row.energy(), row.magnetization(), row.susceptibility()] {
            assert!(m.mean.is_finite());
            assert!(m.std_error().is_finite());
        }
    }
}

#[test]
fn caller_rng_is_reproducible() {
    let sim = Simulation::new(small_config(4)).unwrap();
    let seed = SmallRng::seed_from_u64(3).gen::<u64>();
    let a = sim
        .run_temperature_with_rng(2.0, SmallRng::seed_from_u64(seed))
        .unwrap();
    let b = sim
        .run_temperature_with_rng(2.0, SmallRng::seed_from_u64(seed))
        .unwrap();
    assert_eq!(a.record, b.record);
    assert_eq!(a.lattice.snapshot(), b.lattice.snapshot());
}

#[test]
fn cancel_from_another_thread() {
    let cancel = CancelToken::new();
    let config = small_config(16).with_sweeps(1_000_000, 10);
    let sim = Simulation::new(config)
        .unwrap()
        .with_cancel_token(cancel.clone());
    let handle = std::thread::spawn(move || sim.run());
    cancel.cancel();
    let result = handle.join().unwrap();
    assert!(matches!(result, Err(IsingError::Cancelled { .. })));
}
