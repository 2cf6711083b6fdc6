//! Spectral primitives for the synthetic flux calculator
//!
//! Wavelength bands, CGS constants and the `Spectrum` trait used to turn a
//! source brightness into photon flux.

/// Constants in CGS units
pub struct CGS {}

impl CGS {
    /// AB magnitude system zero-point flux density
    /// Units: 3631e-23 erg s⁻¹ cm⁻² Hz⁻¹
    pub const AB_ZERO_POINT_FLUX_DENSITY: f64 = 3631e-23;

    /// Planck's constant
    /// Units: erg⋅s
    pub const PLANCK_CONSTANT: f64 = 6.62607015e-27;

    /// Speed of light in vacuum
    /// Units: cm/s
    pub const SPEED_OF_LIGHT: f64 = 2.99792458e10;
}

/// A closed wavelength interval in nanometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Lower wavelength bound in nanometers
    pub lower_nm: f64,

    /// Upper wavelength bound in nanometers
    pub upper_nm: f64,
}

impl Band {
    /// Create a band from wavelength bounds in nanometers.
    ///
    /// Bounds come from validated response curves, so a reversed, negative
    /// or non-finite range is a programming error and panics.
    pub fn from_nm_bounds(lower_nm: f64, upper_nm: f64) -> Self {
        if !lower_nm.is_finite() || !upper_nm.is_finite() {
            panic!("Wavelength range cannot contain non-finite values");
        }
        if lower_nm > upper_nm {
            panic!("Invalid wavelength range: {}..{}", lower_nm, upper_nm);
        }
        if lower_nm < 0.0 {
            panic!("Wavelengths must be non-negative, got {}", lower_nm);
        }

        Self { lower_nm, upper_nm }
    }

    /// Width of the band in nanometers
    pub fn width(&self) -> f64 {
        self.upper_nm - self.lower_nm
    }

    /// Center of the band in nanometers
    pub fn center(&self) -> f64 {
        (self.lower_nm + self.upper_nm) / 2.0
    }

    /// Frequency bounds (lower, upper) in Hz
    pub fn frequency_bounds(&self) -> (f64, f64) {
        let lower_freq = CGS::SPEED_OF_LIGHT / (self.upper_nm * 1e-7);
        let upper_freq = CGS::SPEED_OF_LIGHT / (self.lower_nm * 1e-7);
        (lower_freq, upper_freq)
    }

    /// Overlap of two bands, `None` when they share no wavelengths
    pub fn intersection(&self, other: &Band) -> Option<Band> {
        let lower_nm = self.lower_nm.max(other.lower_nm);
        let upper_nm = self.upper_nm.min(other.upper_nm);
        (lower_nm < upper_nm).then_some(Band { lower_nm, upper_nm })
    }
}

/// Split a band at integer nanometers.
///
/// The first and last pieces keep the fractional edges, so the pieces tile
/// the band exactly.
pub fn nm_sub_bands(band: &Band) -> Vec<Band> {
    let mut bands: Vec<Band> = Vec::new();

    let first_int_nm = band.lower_nm.ceil();
    let last_int_nm = band.upper_nm.floor();

    if last_int_nm < first_int_nm {
        // Band sits inside a single nanometer
        bands.push(*band);
        return bands;
    }

    if band.lower_nm < first_int_nm {
        bands.push(Band::from_nm_bounds(band.lower_nm, first_int_nm));
    }

    let mut nm = first_int_nm;
    while nm < last_int_nm {
        bands.push(Band::from_nm_bounds(nm, nm + 1.0));
        nm += 1.0;
    }

    if last_int_nm < band.upper_nm {
        bands.push(Band::from_nm_bounds(last_int_nm, band.upper_nm));
    }

    bands
}

/// Photon energy in erg for a wavelength in nanometers, E = h·c/λ
pub fn wavelength_to_ergs(wavelength_nm: f64) -> f64 {
    let wavelength_cm = wavelength_nm * 1e-7;
    CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT / wavelength_cm
}

/// A source spectrum in CGS units.
///
/// - Wavelengths in nanometers
/// - Spectral flux density in erg s⁻¹ cm⁻² Hz⁻¹
/// - Irradiance in erg s⁻¹ cm⁻²
pub trait Spectrum: Send + Sync {
    /// Spectral flux density at a wavelength, 0.0 outside the spectrum's range
    fn spectral_irradiance(&self, wavelength_nm: f64) -> f64;

    /// Energy flux integrated over a band
    fn irradiance(&self, band: &Band) -> f64;

    /// Photon flux (photons s⁻¹ cm⁻²) in a band, integrated in 1 nm steps
    fn photon_flux(&self, band: &Band) -> f64 {
        // N = P / (h·c/λ) per sub-band
        nm_sub_bands(band)
            .iter()
            .map(|sub_band| self.irradiance(sub_band) / wavelength_to_ergs(sub_band.center()))
            .sum()
    }
}
