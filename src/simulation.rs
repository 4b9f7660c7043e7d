use crate::config::SimulationConfig;
use crate::energy::magnetization;
use crate::errors::{check_temperature, IsingError, Result};
use crate::lattice::Lattice;
use crate::metropolis::MetropolisSampler;
use crate::observables::{ObservableAccumulator, ObservableRecord, ObservableTable};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared flag used to stop a running sweep between two Metropolis sweeps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Make a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed)
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Output of a single temperature.
#[derive(Debug, Clone)]
pub struct TemperatureRun {
    /// Reduced observables.
    pub record: ObservableRecord,
    /// Lattice after the last sampling sweep.
    pub lattice: Lattice,
    /// Fraction of accepted moves over all sweeps of the run.
    pub acceptance_rate: Option<f64>,
}

/// Per-measurement energy and magnetization of one temperature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    /// Temperature of the run.
    pub temperature: f64,
    /// Total energy after each sampling sweep.
    pub energy: Vec<f64>,
    /// Total magnetization after each sampling sweep.
    pub magnetization: Vec<f64>,
}

/// Drives equilibration and sampling over a temperature grid.
///
/// Each temperature starts from a fresh random lattice and draws from its own ChaCha stream
/// of the master seed, so runs are independent of evaluation order.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    temperatures: Vec<f64>,
    cancel: Option<CancelToken>,
}

impl Simulation {
    /// Make a new simulation, validating every parameter shared across the sweep.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let temperatures = config.temperatures()?;
        Ok(Self {
            config,
            temperatures,
            cancel: None,
        })
    }

    /// Check the token between sweeps and stop when it is cancelled.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Get a ref to the config.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The temperature grid.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Rng for the temperature at `index` in the grid.
    pub fn rng_for(&self, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(index as u64);
        rng
    }

    /// Run every temperature in order and collect the table.
    ///
    /// Fails as a whole: an error at any temperature discards the rows gathered so far.
    pub fn run(&self) -> Result<ObservableTable> {
        self.log_start();
        let records = self
            .temperatures
            .iter()
            .enumerate()
            .map(|(index, t)| self.run_index(index, *t).map(|run| run.record))
            .collect::<Result<Vec<_>>>()?;
        info!(rows = records.len(), "temperature sweep finished");
        Ok(ObservableTable::from_records(records))
    }

    /// Run every temperature on the rayon pool. Gives the same table as [`Simulation::run`].
    #[cfg(feature = "parallel")]
    pub fn par_run(&self) -> Result<ObservableTable> {
        use rayon::prelude::*;

        self.log_start();
        let records = self
            .temperatures
            .par_iter()
            .enumerate()
            .map(|(index, t)| self.run_index(index, *t).map(|run| run.record))
            .collect::<Result<Vec<_>>>()?;
        info!(rows = records.len(), "parallel temperature sweep finished");
        Ok(ObservableTable::from_records(records))
    }

    /// Run the grid temperature at `index`, with its own rng stream.
    pub fn run_index(&self, index: usize, temperature: f64) -> Result<TemperatureRun> {
        self.run_temperature_with_rng(temperature, self.rng_for(index))
    }

    /// Run a single temperature with a caller supplied rng.
    pub fn run_temperature_with_rng<R: Rng>(
        &self,
        temperature: f64,
        rng: R,
    ) -> Result<TemperatureRun> {
        let couplings = self.config.couplings();
        // Checked once in `new`.
        let field = couplings.field;
        let (acc, lattice, sampler) = self.timesteps_measure(
            temperature,
            rng,
            ObservableAccumulator::new(),
            |mut acc, lattice| {
                let mu = magnetization(lattice);
                acc.record(couplings.total_energy(lattice), mu, mu / field);
                Ok(acc)
            },
        )?;
        let observables = acc.finalize(self.config.n_steps_mc, lattice.n_sites())?;
        let acceptance_rate = sampler.acceptance_rate();
        debug!(
            temperature,
            energy = observables.energy.mean,
            magnetization = observables.magnetization.mean,
            acceptance_rate,
            "temperature finished"
        );
        Ok(TemperatureRun {
            record: ObservableRecord::new(temperature, &observables),
            lattice,
            acceptance_rate,
        })
    }

    /// Run a single temperature and keep the energy and magnetization of every measurement.
    pub fn sample_series<R: Rng>(&self, temperature: f64, rng: R) -> Result<SampleSeries> {
        let couplings = self.config.couplings();
        let init = SampleSeries {
            temperature,
            energy: Vec::with_capacity(self.config.n_steps_mc),
            magnetization: Vec::with_capacity(self.config.n_steps_mc),
        };
        let (series, _, _) = self.timesteps_measure(temperature, rng, init, |mut s, lattice| {
            s.energy.push(couplings.total_energy(lattice));
            s.magnetization.push(magnetization(lattice));
            Ok(s)
        })?;
        Ok(series)
    }

    /// Equilibrate a fresh lattice at `temperature`, then fold `state_fold` over the lattice
    /// after each of the `n_steps_mc` sampling sweeps.
    fn timesteps_measure<R, T, F>(
        &self,
        temperature: f64,
        mut rng: R,
        init: T,
        state_fold: F,
    ) -> Result<(T, Lattice, MetropolisSampler<R>)>
    where
        R: Rng,
        F: Fn(T, &Lattice) -> Result<T>,
    {
        let temperature = check_temperature(temperature)?;
        let mut lattice = Lattice::new(self.config.n, &mut rng)?;
        let mut sampler = MetropolisSampler::new(self.config.couplings(), temperature, rng)?;
        let mc_changes = self.config.mc_changes();

        let pre_sampling = self.config.pre_sampling_sweeps();
        debug!(temperature, sweeps = pre_sampling, "equilibrating");
        for sweep in 0..pre_sampling {
            self.check_cancelled(sweep)?;
            sampler.sweep(&mut lattice, mc_changes);
        }

        debug!(temperature, sweeps = self.config.n_steps_mc, "sampling");
        let mut acc = init;
        for sweep in 0..self.config.n_steps_mc {
            self.check_cancelled(pre_sampling + sweep)?;
            sampler.sweep(&mut lattice, mc_changes);
            acc = state_fold(acc, &lattice)?;
        }
        Ok((acc, lattice, sampler))
    }

    fn check_cancelled(&self, completed_sweeps: usize) -> Result<()> {
        match &self.cancel {
            Some(cancel) if cancel.is_cancelled() => {
                Err(IsingError::Cancelled { completed_sweeps })
            }
            _ => Ok(()),
        }
    }

    fn log_start(&self) {
        info!(
            n = self.config.n,
            mc_changes = self.config.mc_changes(),
            n_steps_eq = self.config.n_steps_eq,
            n_steps_mc = self.config.n_steps_mc,
            points = self.temperatures.len(),
            coupling = self.config.coupling,
            field = self.config.field,
            "starting temperature sweep"
        );
    }
}
