use crate::errors::{IsingError, Result};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::io::Write;

/// First and second moments of an observable, both normalized by `site_count * n_samples`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Moments {
    /// Normalized sum of samples.
    pub mean: f64,
    /// Normalized sum of squared samples.
    pub mean_sq: f64,
}

impl Moments {
    /// `mean_sq - mean^2`, clamped at zero against rounding.
    pub fn variance(&self) -> f64 {
        (self.mean_sq - self.mean * self.mean).max(0.0)
    }

    /// `sqrt(mean_sq - mean^2)`, the error bar reported next to the mean.
    pub fn std_error(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Running sum and sum of squares of one observable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RunningSums {
    sum: f64,
    sum_sq: f64,
}

impl RunningSums {
    fn add(&mut self, x: f64) {
        self.sum += x;
        self.sum_sq += x * x;
    }

    fn moments(&self, norm: f64) -> Moments {
        Moments {
            mean: self.sum / norm,
            mean_sq: self.sum_sq / norm,
        }
    }
}

/// The three observables reduced over one sampling phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Observables {
    /// Total energy.
    pub energy: Moments,
    /// Total magnetization.
    pub magnetization: Moments,
    /// Susceptibility as `mu / H`.
    pub susceptibility: Moments,
}

/// Accumulates energy, magnetization, and susceptibility over a sampling phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservableAccumulator {
    energy: RunningSums,
    magnetization: RunningSums,
    susceptibility: RunningSums,
    recorded: usize,
}

impl ObservableAccumulator {
    /// Make an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all running sums.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add one measurement.
    pub fn record(&mut self, energy: f64, magnetization: f64, susceptibility: f64) {
        self.energy.add(energy);
        self.magnetization.add(magnetization);
        self.susceptibility.add(susceptibility);
        self.recorded += 1;
    }

    /// Number of measurements recorded since the last reset.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Reduce the sums to moments normalized by `site_count * n_samples`.
    pub fn finalize(&self, n_samples: usize, site_count: usize) -> Result<Observables> {
        if n_samples == 0 {
            return Err(IsingError::NoSamples);
        }
        if site_count == 0 {
            return Err(IsingError::InvalidSize { n: 0 });
        }
        let norm = (site_count * n_samples) as f64;
        Ok(Observables {
            energy: self.energy.moments(norm),
            magnetization: self.magnetization.moments(norm),
            susceptibility: self.susceptibility.moments(norm),
        })
    }
}

/// One row of the temperature sweep output.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ObservableRecord {
    /// Temperature of the run.
    pub temperature: f64,
    /// Mean energy.
    pub energy_mean: f64,
    /// Mean squared energy.
    pub energy_mean_sq: f64,
    /// Mean magnetization.
    pub magnetization_mean: f64,
    /// Mean squared magnetization.
    pub magnetization_mean_sq: f64,
    /// Mean susceptibility.
    pub susceptibility_mean: f64,
    /// Mean squared susceptibility.
    pub susceptibility_mean_sq: f64,
}

impl ObservableRecord {
    /// Flatten reduced observables at `temperature` into a row.
    pub fn new(temperature: f64, observables: &Observables) -> Self {
        Self {
            temperature,
            energy_mean: observables.energy.mean,
            energy_mean_sq: observables.energy.mean_sq,
            magnetization_mean: observables.magnetization.mean,
            magnetization_mean_sq: observables.magnetization.mean_sq,
            susceptibility_mean: observables.susceptibility.mean,
            susceptibility_mean_sq: observables.susceptibility.mean_sq,
        }
    }

    /// Energy moments of this row.
    pub fn energy(&self) -> Moments {
        Moments {
            mean: self.energy_mean,
            mean_sq: self.energy_mean_sq,
        }
    }

    /// Magnetization moments of this row.
    pub fn magnetization(&self) -> Moments {
        Moments {
            mean: self.magnetization_mean,
            mean_sq: self.magnetization_mean_sq,
        }
    }

    /// Susceptibility moments of this row.
    pub fn susceptibility(&self) -> Moments {
        Moments {
            mean: self.susceptibility_mean,
            mean_sq: self.susceptibility_mean_sq,
        }
    }
}

/// Observable records ordered by temperature.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ObservableTable {
    records: Vec<ObservableRecord>,
}

impl ObservableTable {
    /// Make a table from records already in temperature order.
    pub fn from_records(records: Vec<ObservableRecord>) -> Self {
        Self { records }
    }

    /// Append a row.
    pub fn push(&mut self, record: ObservableRecord) {
        self.records.push(record)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a ref to the rows.
    pub fn records(&self) -> &[ObservableRecord] {
        &self.records
    }

    /// Temperatures of every row.
    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    /// Write the table as whitespace separated columns with a header line, one row per
    /// temperature, with the derived error columns appended.
    pub fn write_columns<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "# T E E2 M M2 X X2 dE dM dX")?;
        for r in &self.records {
            writeln!(
                w,
                "{:.6} {:.8e} {:.8e} {:.8e} {:.8e} {:.8e} {:.8e} {:.8e} {:.8e} {:.8e}",
                r.temperature,
                r.energy_mean,
                r.energy_mean_sq,
                r.magnetization_mean,
                r.magnetization_mean_sq,
                r.susceptibility_mean,
                r.susceptibility_mean_sq,
                r.energy().std_error(),
                r.magnetization().std_error(),
                r.susceptibility().std_error(),
            )?;
        }
        Ok(())
    }
}

impl IntoIterator for ObservableTable {
    type Item = ObservableRecord;
    type IntoIter = std::vec::IntoIter<ObservableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
