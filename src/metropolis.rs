use crate::energy::Couplings;
use crate::errors::{check_temperature, Result};
use crate::lattice::Lattice;
use rand::prelude::*;

/// Result of a single proposed spin flip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Flat index of the proposed site.
    pub site: usize,
    /// Energy change the flip would cause.
    pub delta_e: f64,
    /// Whether the flip was applied.
    pub accepted: bool,
}

/// Probability of accepting a move with energy change `delta_e` at `temperature`.
///
/// Only evaluates the Boltzmann factor for `delta_e >= 0`, where its argument is never
/// positive, so the exponential can't overflow.
#[inline]
pub fn acceptance_probability(delta_e: f64, temperature: f64) -> f64 {
    if delta_e < 0.0 {
        1.0
    } else {
        (-delta_e / temperature).exp()
    }
}

/// Randomly choose if a step should be made based on temperature and energy change.
#[inline]
pub fn should_flip<R: Rng>(rng: &mut R, temperature: f64, delta_e: f64) -> bool {
    // If dE < 0 then it will always flip, don't bother drawing.
    if delta_e < 0.0 {
        true
    } else {
        rng.gen::<f64>() < acceptance_probability(delta_e, temperature)
    }
}

/// Single spin flip Metropolis sampler at a fixed temperature.
///
/// Owns its random number generator so independent samplers never share a stream.
#[derive(Debug, Clone)]
pub struct MetropolisSampler<R: Rng> {
    couplings: Couplings,
    temperature: f64,
    rng: R,
    proposed: u64,
    accepted: u64,
}

impl<R: Rng> MetropolisSampler<R> {
    /// Make a new sampler, fails if `temperature` is not positive and finite.
    pub fn new(couplings: Couplings, temperature: f64, rng: R) -> Result<Self> {
        let temperature = check_temperature(temperature)?;
        Ok(Self {
            couplings,
            temperature,
            rng,
            proposed: 0,
            accepted: 0,
        })
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Change the temperature, used when annealing a single lattice.
    pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        self.temperature = check_temperature(temperature)?;
        Ok(())
    }

    /// Couplings used for energy deltas.
    pub fn couplings(&self) -> &Couplings {
        &self.couplings
    }

    /// Propose negating one uniformly chosen spin and accept it by the Metropolis rule.
    pub fn step(&mut self, lattice: &mut Lattice) -> StepOutcome {
        let site = self.rng.gen_range(0..lattice.n_sites());
        let delta_e = self.couplings.flip_delta(lattice, site);
        let accepted = should_flip(&mut self.rng, self.temperature, delta_e);
        if accepted {
            lattice.flip(site);
            self.accepted += 1;
        }
        self.proposed += 1;
        StepOutcome {
            site,
            delta_e,
            accepted,
        }
    }

    /// Perform `mc_changes` elementary steps, returns how many were accepted.
    pub fn sweep(&mut self, lattice: &mut Lattice, mc_changes: usize) -> usize {
        (0..mc_changes)
            .filter(|_| self.step(lattice).accepted)
            .count()
    }

    /// Perform `sweeps` sweeps of `mc_changes` steps each.
    pub fn sweeps(&mut self, lattice: &mut Lattice, sweeps: usize, mc_changes: usize) -> usize {
        (0..sweeps).map(|_| self.sweep(lattice, mc_changes)).sum()
    }

    /// Number of proposed and accepted moves since construction or the last reset.
    pub fn counts(&self) -> (u64, u64) {
        (self.proposed, self.accepted)
    }

    /// Fraction of proposed moves that were accepted, `None` before the first proposal.
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.proposed == 0 {
            None
        } else {
            Some(self.accepted as f64 / self.proposed as f64)
        }
    }

    /// Zero the move counters.
    pub fn reset_counts(&mut self) {
        self.proposed = 0;
        self.accepted = 0;
    }

    /// Get a mutable ref to the rng.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Give back the rng.
    pub fn into_rng(self) -> R {
        self.rng
    }
}
