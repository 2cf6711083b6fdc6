//! Flat-in-frequency source spectra parameterised by AB magnitude

use super::spectrum::{Band, Spectrum, CGS};

/// A source with constant spectral flux density F_ν
///
/// Used for both point sources (magnitudes) and sky background
/// (magnitudes per square arcsecond, giving flux per arcsec²).
#[derive(Debug, Clone, Copy)]
pub struct FlatStellarSpectrum {
    /// Spectral flux density in erg s⁻¹ cm⁻² Hz⁻¹
    spectral_flux_density: f64,
}

impl FlatStellarSpectrum {
    pub fn new(spectral_flux_density: f64) -> Self {
        Self {
            spectral_flux_density,
        }
    }

    /// F_ν = 3631 Jy · 10^(-0.4·AB)
    pub fn from_ab_mag(ab_mag: f64) -> Self {
        Self::new(CGS::AB_ZERO_POINT_FLUX_DENSITY * 10f64.powf(-0.4 * ab_mag))
    }
}

impl Spectrum for FlatStellarSpectrum {
    fn spectral_irradiance(&self, wavelength_nm: f64) -> f64 {
        if wavelength_nm <= 0.0 {
            return 0.0;
        }
        self.spectral_flux_density
    }

    fn irradiance(&self, band: &Band) -> f64 {
        if band.lower_nm >= band.upper_nm || band.lower_nm <= 0.0 {
            return 0.0;
        }
        let (lower_freq, upper_freq) = band.frequency_bounds();
        self.spectral_irradiance(band.center()) * (upper_freq - lower_freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_mag_photon_flux_400_700() {
        // ~3.07e6 photons s⁻¹ cm⁻² from an AB=0 source across 400-700nm
        let spectrum = FlatStellarSpectrum::from_ab_mag(0.0);
        let photons = spectrum.photon_flux(&Band::from_nm_bounds(400.0, 700.0));
        assert_relative_eq!(photons, 3_074_446.0, max_relative = 0.02);
    }

    #[test]
    fn test_five_magnitudes_is_factor_hundred() {
        let bright = FlatStellarSpectrum::from_ab_mag(10.0);
        let faint = FlatStellarSpectrum::from_ab_mag(15.0);
        assert_relative_eq!(
            bright.spectral_irradiance(550.0) / faint.spectral_irradiance(550.0),
            100.0,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_irradiance_degenerate_band() {
        let spectrum = FlatStellarSpectrum::from_ab_mag(0.0);
        let band = Band::from_nm_bounds(500.0, 500.0);
        assert_eq!(spectrum.irradiance(&band), 0.0);
        assert_eq!(spectrum.spectral_irradiance(-1.0), 0.0);
    }
}
