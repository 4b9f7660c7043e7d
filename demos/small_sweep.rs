use ising2d::*;

fn main() {
    let config = SimulationConfig::default()
        .with_size(16)
        .with_sweeps(200, 200)
        .with_temperatures(1.0, 4.0, 12)
        .with_couplings(1.0, 0.01);

    let sim = Simulation::new(config).unwrap();
    let table = sim.run().unwrap();
    table.write_columns(std::io::stdout().lock()).unwrap();
}
