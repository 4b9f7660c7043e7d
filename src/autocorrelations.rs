use crate::simulation::SampleSeries;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Normalized autocorrelation `rho(k)` of a series for lags `0..len`, via FFT.
///
/// The series is zero padded to twice its length so lags don't wrap around.
/// Returns `None` for fewer than two samples or a constant series.
pub fn fft_autocorrelation(series: &[f64]) -> Option<Vec<f64>> {
    let deviations = deviations(series)?;
    let n = deviations.len();
    let padded = 2 * n;

    let mut buffer = deviations
        .iter()
        .map(|d| Complex::new(*d, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(padded)
        .collect::<Vec<Complex<f64>>>();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(padded).process(&mut buffer);
    buffer
        .iter_mut()
        .for_each(|c| *c = Complex::new(c.norm_sqr(), 0.0));
    planner.plan_fft_inverse(padded).process(&mut buffer);

    let zero_lag = buffer[0].re;
    Some(buffer[..n].iter().map(|c| c.re / zero_lag).collect())
}

/// Normalized autocorrelation computed directly in `O(len^2)`.
pub fn naive_autocorrelation(series: &[f64]) -> Option<Vec<f64>> {
    let deviations = deviations(series)?;
    let n = deviations.len();
    let zero_lag = deviations.iter().map(|d| d * d).sum::<f64>();
    Some(
        (0..n)
            .map(|k| {
                deviations[..n - k]
                    .iter()
                    .zip(&deviations[k..])
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / zero_lag
            })
            .collect(),
    )
}

/// Integrated autocorrelation time `1/2 + sum_k rho(k)`, summed until `rho` first drops
/// to zero or below.
pub fn integrated_autocorrelation_time(rho: &[f64]) -> f64 {
    0.5 + rho
        .iter()
        .skip(1)
        .take_while(|r| **r > 0.0)
        .sum::<f64>()
}

fn deviations(series: &[f64]) -> Option<Vec<f64>> {
    if series.len() < 2 {
        return None;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    let deviations = series.iter().map(|x| x - mean).collect::<Vec<_>>();
    if deviations.iter().all(|d| *d == 0.0) {
        None
    } else {
        Some(deviations)
    }
}

impl SampleSeries {
    /// Autocorrelation of the sampled energies.
    pub fn energy_autocorrelation(&self) -> Option<Vec<f64>> {
        fft_autocorrelation(&self.energy)
    }

    /// Autocorrelation of the sampled magnetizations.
    pub fn magnetization_autocorrelation(&self) -> Option<Vec<f64>> {
        fft_autocorrelation(&self.magnetization)
    }

    /// Integrated autocorrelation time of the energy, in sampling sweeps.
    pub fn energy_autocorrelation_time(&self) -> Option<f64> {
        self.energy_autocorrelation()
            .map(|rho| integrated_autocorrelation_time(&rho))
    }

    /// Integrated autocorrelation time of the magnetization, in sampling sweeps.
    pub fn magnetization_autocorrelation_time(&self) -> Option<f64> {
        self.magnetization_autocorrelation()
            .map(|rho| integrated_autocorrelation_time(&rho))
    }
}
