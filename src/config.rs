use crate::energy::Couplings;
use crate::errors::{check_field, check_temperature, IsingError, Result};
use crate::lattice::site_count;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// How many unmeasured sweeps run before sampling starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum EquilibrationSchedule {
    /// `n_steps_eq + n_steps_mc` unmeasured sweeps, then `n_steps_mc` measured ones.
    #[default]
    Reference,
    /// `n_steps_eq` unmeasured sweeps, then `n_steps_mc` measured ones.
    EquilibrationOnly,
}

impl EquilibrationSchedule {
    /// Number of sweeps discarded before the first measurement.
    pub fn pre_sampling_sweeps(&self, n_steps_eq: usize, n_steps_mc: usize) -> usize {
        match self {
            EquilibrationSchedule::Reference => n_steps_eq + n_steps_mc,
            EquilibrationSchedule::EquilibrationOnly => n_steps_eq,
        }
    }
}

/// Everything needed to run a temperature sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct SimulationConfig {
    /// Lattice side length.
    pub n: usize,
    /// Elementary Metropolis steps per sweep, one per site (`n * n`) when unset.
    #[cfg_attr(
        feature = "serialize",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub mc_changes: Option<usize>,
    /// Equilibration sweeps.
    pub n_steps_eq: usize,
    /// Sampling sweeps, one measurement after each.
    pub n_steps_mc: usize,
    /// Lowest temperature of the grid (inclusive).
    pub t_min: f64,
    /// Upper bound of the grid (exclusive).
    pub t_max: f64,
    /// Number of grid temperatures.
    pub n_points: usize,
    /// Coupling constant `J`.
    pub coupling: f64,
    /// External field `H`, must be non-zero.
    pub field: f64,
    /// Master seed, each temperature draws from its own stream of it.
    pub seed: u64,
    /// Pre-sampling schedule.
    pub schedule: EquilibrationSchedule,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n: 16,
            mc_changes: None,
            n_steps_eq: 200,
            n_steps_mc: 200,
            t_min: 1.0,
            t_max: 4.0,
            n_points: 30,
            coupling: 1.0,
            field: 0.01,
            seed: 1234,
            schedule: EquilibrationSchedule::default(),
        }
    }
}

impl SimulationConfig {
    /// Set the lattice side length. Unless set explicitly, `mc_changes` follows it.
    pub fn with_size(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    /// Set the elementary steps per sweep.
    pub fn with_mc_changes(mut self, mc_changes: usize) -> Self {
        self.mc_changes = Some(mc_changes);
        self
    }

    /// Elementary steps per sweep, defaulting to one per site.
    pub fn mc_changes(&self) -> usize {
        self.mc_changes
            .unwrap_or_else(|| self.n.saturating_mul(self.n))
    }

    /// Set equilibration and sampling sweep counts.
    pub fn with_sweeps(mut self, n_steps_eq: usize, n_steps_mc: usize) -> Self {
        self.n_steps_eq = n_steps_eq;
        self.n_steps_mc = n_steps_mc;
        self
    }

    /// Set the temperature grid.
    pub fn with_temperatures(mut self, t_min: f64, t_max: f64, n_points: usize) -> Self {
        self.t_min = t_min;
        self.t_max = t_max;
        self.n_points = n_points;
        self
    }

    /// Set `J` and `H`.
    pub fn with_couplings(mut self, coupling: f64, field: f64) -> Self {
        self.coupling = coupling;
        self.field = field;
        self
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the pre-sampling schedule.
    pub fn with_schedule(mut self, schedule: EquilibrationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Couplings of the hamiltonian.
    pub fn couplings(&self) -> Couplings {
        Couplings::new(self.coupling, self.field)
    }

    /// Unmeasured sweeps per temperature.
    pub fn pre_sampling_sweeps(&self) -> usize {
        self.schedule
            .pre_sampling_sweeps(self.n_steps_eq, self.n_steps_mc)
    }

    /// Check every parameter shared across the sweep.
    pub fn validate(&self) -> Result<()> {
        site_count(self.n)?;
        if !self.coupling.is_finite() {
            return Err(IsingError::InvalidCoupling {
                coupling: self.coupling,
            });
        }
        check_field(self.field)?;
        if self.n_steps_mc == 0 {
            return Err(IsingError::NoSamples);
        }
        temperature_grid(self.t_min, self.t_max, self.n_points).map(|_| ())
    }

    /// The temperatures this config sweeps over.
    pub fn temperatures(&self) -> Result<Vec<f64>> {
        temperature_grid(self.t_min, self.t_max, self.n_points)
    }
}

/// Half-open temperature grid `t_min + k * (t_max - t_min) / n_points` for `k < n_points`.
///
/// Always yields exactly `n_points` temperatures. Each one is computed from its index rather
/// than by accumulating the step, so rounding can't add an extra point below `t_max`.
pub fn temperature_grid(t_min: f64, t_max: f64, n_points: usize) -> Result<Vec<f64>> {
    let invalid = |reason: &'static str| IsingError::InvalidTemperatureGrid {
        t_min,
        t_max,
        n_points,
        reason,
    };
    if n_points == 0 {
        return Err(invalid("at least one point is required"));
    }
    if !t_max.is_finite() || t_max <= t_min {
        return Err(invalid("t_max must be finite and above t_min"));
    }
    check_temperature(t_min)?;
    let dt = (t_max - t_min) / n_points as f64;
    Ok((0..n_points).map(|k| t_min + k as f64 * dt).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_has_exactly_n_points() {
        for n_points in 1..200 {
            let grid = temperature_grid(0.1, 0.7, n_points).unwrap();
            assert_eq!(grid.len(), n_points);
            assert_eq!(grid[0], 0.1);
            assert!(grid.iter().all(|t| *t < 0.7));
            assert!(grid.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_grid_values() {
        let grid = temperature_grid(1.0, 2.0, 4).unwrap();
        assert_eq!(grid, vec![1.0, 1.25, 1.5, 1.75]);
    }

    #[test]
    fn test_bad_grids() {
        assert!(matches!(
            temperature_grid(1.0, 2.0, 0),
            Err(IsingError::InvalidTemperatureGrid { n_points: 0, .. })
        ));
        assert!(temperature_grid(2.0, 1.0, 4).is_err());
        assert!(temperature_grid(1.0, f64::INFINITY, 4).is_err());
        assert_eq!(
            temperature_grid(0.0, 1.0, 4),
            Err(IsingError::InvalidTemperature { temperature: 0.0 })
        );
    }

    #[test]
    fn test_schedule() {
        assert_eq!(EquilibrationSchedule::Reference.pre_sampling_sweeps(10, 5), 15);
        assert_eq!(
            EquilibrationSchedule::EquilibrationOnly.pre_sampling_sweeps(10, 5),
            10
        );
    }

    #[test]
    fn test_validate() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
        let c = SimulationConfig::default().with_couplings(1.0, 0.0);
        assert_eq!(c.validate(), Err(IsingError::InvalidField { field: 0.0 }));
        let c = SimulationConfig::default().with_size(0);
        assert_eq!(c.validate(), Err(IsingError::InvalidSize { n: 0 }));
        let c = SimulationConfig::default().with_sweeps(10, 0);
        assert_eq!(c.validate(), Err(IsingError::NoSamples));
        let c = SimulationConfig::default().with_temperatures(-1.0, 2.0, 3);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_coupling() {
        for coupling in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let c = SimulationConfig::default().with_couplings(coupling, 0.01);
            assert!(matches!(
                c.validate(),
                Err(IsingError::InvalidCoupling { .. })
            ));
        }
        let c = SimulationConfig::default().with_couplings(-1.0, 0.01);
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_overflowing_size() {
        let n = usize::MAX / 2;
        let c = SimulationConfig::default().with_size(n);
        assert_eq!(c.validate(), Err(IsingError::InvalidSize { n }));
        assert_eq!(c.mc_changes(), usize::MAX);
    }

    #[test]
    fn test_mc_changes_follow_size() {
        let c = SimulationConfig::default();
        assert_eq!(c.mc_changes(), 256);
        let c = c.with_size(8);
        assert_eq!(c.mc_changes(), 64);
        let c = c.with_mc_changes(512);
        assert_eq!(c.mc_changes(), 512);
        // An explicit value survives a later size change.
        assert_eq!(c.with_size(32).mc_changes(), 512);
    }
}
