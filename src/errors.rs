use thiserror::Error;

/// Errors raised when a simulation is configured or driven with invalid parameters.
///
/// Every variant carries the offending value so callers can report which precondition
/// was violated. None of them are transient: retrying with the same input fails again.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IsingError {
    /// Lattice side length must be positive and `n * n` must fit in memory indices.
    #[error("invalid lattice size {n}: side length must be positive and n * n addressable")]
    InvalidSize {
        /// Requested side length.
        n: usize,
    },
    /// Temperature must be positive and finite.
    #[error("invalid temperature {temperature}: must be positive and finite")]
    InvalidTemperature {
        /// Requested temperature.
        temperature: f64,
    },
    /// Susceptibility is reported as `mu / h`, so the field must be non-zero.
    #[error("invalid external field {field}: must be non-zero and finite")]
    InvalidField {
        /// Requested field.
        field: f64,
    },
    /// The coupling constant must be finite.
    #[error("invalid coupling {coupling}: must be finite")]
    InvalidCoupling {
        /// Requested coupling.
        coupling: f64,
    },
    /// Raw lattice access outside of `[0, n) x [0, n)`.
    #[error("index ({i}, {j}) out of range for lattice of size {n}")]
    IndexOutOfRange {
        /// Row.
        i: usize,
        /// Column.
        j: usize,
        /// Lattice side length.
        n: usize,
    },
    /// Observables can't be reduced without at least one sample.
    #[error("cannot finalize observables from zero samples")]
    NoSamples,
    /// Temperature grid bounds or point count are unusable.
    #[error("invalid temperature grid [{t_min}, {t_max}) with {n_points} points: {reason}")]
    InvalidTemperatureGrid {
        /// Lower (inclusive) bound.
        t_min: f64,
        /// Upper (exclusive) bound.
        t_max: f64,
        /// Number of grid points.
        n_points: usize,
        /// What is wrong with the grid.
        reason: &'static str,
    },
    /// Spin rows don't form an `n x n` grid.
    #[error("spin grid is not square: row {row} has {found} values, expected {expected}")]
    ShapeMismatch {
        /// First offending row.
        row: usize,
        /// Values in that row.
        found: usize,
        /// Expected row length (the number of rows).
        expected: usize,
    },
    /// A spin value outside of `[-1, 1]` was supplied.
    #[error("invalid spin value {value} at ({i}, {j}): must lie in [-1, 1]")]
    InvalidSpin {
        /// Row.
        i: usize,
        /// Column.
        j: usize,
        /// Offending value.
        value: f64,
    },
    /// The run was cancelled between sweeps.
    #[error("simulation cancelled after {completed_sweeps} sweeps")]
    Cancelled {
        /// Sweeps completed on the affected temperature before cancellation was seen.
        completed_sweeps: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IsingError>;

/// Check that a temperature can be used in the Boltzmann factor.
pub(crate) fn check_temperature(temperature: f64) -> Result<f64> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(temperature)
    } else {
        Err(IsingError::InvalidTemperature { temperature })
    }
}

/// Check that the susceptibility ratio is defined for this field.
pub(crate) fn check_field(field: f64) -> Result<f64> {
    if field.is_finite() && field != 0.0 {
        Ok(field)
    } else {
        Err(IsingError::InvalidField { field })
    }
}
