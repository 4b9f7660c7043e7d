use criterion::{criterion_group, criterion_main, Criterion};
use ising2d::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn make_sampler(l: usize, beta: f64) -> (Lattice, MetropolisSampler<SmallRng>) {
    let mut rng = SmallRng::seed_from_u64(1234);
    let lattice = Lattice::new(l, &mut rng).unwrap();
    let sampler = MetropolisSampler::new(Couplings::new(1.0, 0.01), 1.0 / beta, rng).unwrap();
    (lattice, sampler)
}

fn bench_sweep(c: &mut Criterion, name: &str, l: usize) {
    let (mut lattice, mut sampler) = make_sampler(l, 1.0);
    let mc_changes = lattice.n_sites();
    sampler.sweeps(&mut lattice, 100, mc_changes);
    c.bench_function(name, |b| b.iter(|| sampler.sweep(&mut lattice, mc_changes)));
}

fn two_d_08(c: &mut Criterion) {
    bench_sweep(c, "two_d_08", 8)
}

fn two_d_16(c: &mut Criterion) {
    bench_sweep(c, "two_d_16", 16)
}

fn two_d_64(c: &mut Criterion) {
    bench_sweep(c, "two_d_64", 64)
}

fn total_energy_64(c: &mut Criterion) {
    let (lattice, _) = make_sampler(64, 1.0);
    let couplings = Couplings::new(1.0, 0.01);
    c.bench_function("total_energy_64", |b| {
        b.iter(|| couplings.total_energy(&lattice))
    });
}

fn small_temperature_sweep(c: &mut Criterion) {
    let config = SimulationConfig::default()
        .with_size(8)
        .with_sweeps(10, 10)
        .with_temperatures(1.0, 4.0, 4);
    let sim = Simulation::new(config).unwrap();
    c.bench_function("small_temperature_sweep", |b| b.iter(|| sim.run().unwrap()));
}

criterion_group!(
    benches,
    two_d_08,
    two_d_16,
    two_d_64,
    total_energy_64,
    small_temperature_sweep
);
criterion_main!(benches);
