//! Count-rate contract between the noise/exposure core and spectral synthesis.
//!
//! The core only ever asks one question: how many photo-electrons per second
//! per square centimeter of collecting area does a source of a given
//! magnitude produce through this QE, throughput and bandpass? Anything that
//! can answer it implements [`FluxCalculator`].

use thiserror::Error;

use super::photoconversion::photo_electron_flux;
use super::response::CombinedResponse;
use super::stellar::FlatStellarSpectrum;
use super::{Bandpass, QuantumEfficiency, Throughput};

/// Failures reported by a flux calculator
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FluxError {
    #[error("magnitude must be finite, got {0}")]
    InvalidMagnitude(f64),

    #[error("bandpass `{0}` does not overlap the detector response")]
    NoOverlap(String),

    #[error("count rate must be finite and non-negative, got {0}")]
    InvalidRate(f64),

    #[error("{0}")]
    Calculator(String),
}

/// Spectral synthesis collaborator.
///
/// Implementations must be pure: the same inputs always give the same rate.
pub trait FluxCalculator: Send + Sync {
    /// Photo-electron rate in e⁻ s⁻¹ cm⁻² for a source of `magnitude`.
    ///
    /// For sky background the magnitude is per square arcsecond and the
    /// rate is per square arcsecond as well.
    fn count_rate(
        &self,
        magnitude: f64,
        bandpass: &Bandpass,
        qe: &QuantumEfficiency,
        throughput: &Throughput,
    ) -> Result<f64, FluxError>;
}

/// Flux calculator for sources with a flat F_ν spectrum, magnitudes in AB.
///
/// Integrates the spectrum in 1 nm steps through QE × throughput × bandpass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticFluxCalculator;

impl FluxCalculator for SyntheticFluxCalculator {
    fn count_rate(
        &self,
        magnitude: f64,
        bandpass: &Bandpass,
        qe: &QuantumEfficiency,
        throughput: &Throughput,
    ) -> Result<f64, FluxError> {
        if !magnitude.is_finite() {
            return Err(FluxError::InvalidMagnitude(magnitude));
        }

        let response = CombinedResponse::new(qe, throughput, bandpass);
        if response.band().is_none() {
            return Err(FluxError::NoOverlap(bandpass.name().to_string()));
        }

        let spectrum = FlatStellarSpectrum::from_ab_mag(magnitude);
        let rate = photo_electron_flux(&spectrum, &response);
        log::trace!(
            "mag {:.3} through {}: {:.6e} e-/s/cm2",
            magnitude,
            bandpass.name(),
            rate
        );
        Ok(rate)
    }
}

/// Any shared reference to a calculator is itself a calculator
impl<F: FluxCalculator + ?Sized> FluxCalculator for &F {
    fn count_rate(
        &self,
        magnitude: f64,
        bandpass: &Bandpass,
        qe: &QuantumEfficiency,
        throughput: &Throughput,
    ) -> Result<f64, FluxError> {
        (**self).count_rate(magnitude, bandpass, qe, throughput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::Band;
    use approx::assert_relative_eq;

    fn visible() -> (QuantumEfficiency, Throughput, Bandpass) {
        let band = Band::from_nm_bounds(400.0, 700.0);
        (
            QuantumEfficiency::from_notch(&band, 1.0).unwrap(),
            Throughput::uniform(1.0).unwrap(),
            Bandpass::top_hat("V-ish", 400.0, 700.0).unwrap(),
        )
    }

    #[test]
    fn test_zero_mag_rate() {
        let (qe, throughput, bandpass) = visible();
        let rate = SyntheticFluxCalculator
            .count_rate(0.0, &bandpass, &qe, &throughput)
            .unwrap();
        assert_relative_eq!(rate, 3_074_446.0, max_relative = 0.02);
    }

    #[test]
    fn test_rate_follows_pogson_scale() {
        let (qe, throughput, bandpass) = visible();
        let bright = SyntheticFluxCalculator
            .count_rate(10.0, &bandpass, &qe, &throughput)
            .unwrap();
        let faint = SyntheticFluxCalculator
            .count_rate(12.5, &bandpass, &qe, &throughput)
            .unwrap();
        assert_relative_eq!(bright / faint, 10.0, max_relative = 1e-9);
    }

    #[test]
    fn test_rejects_nan_magnitude() {
        let (qe, throughput, bandpass) = visible();
        let result = SyntheticFluxCalculator.count_rate(f64::NAN, &bandpass, &qe, &throughput);
        assert!(matches!(result, Err(FluxError::InvalidMagnitude(m)) if m.is_nan()));
    }

    #[test]
    fn test_rejects_disjoint_bandpass() {
        let (qe, throughput, _) = visible();
        let far_red = Bandpass::top_hat("z'", 820.0, 1000.0).unwrap();
        assert_eq!(
            SyntheticFluxCalculator.count_rate(10.0, &far_red, &qe, &throughput),
            Err(FluxError::NoOverlap("z'".to_string()))
        );
    }
}
