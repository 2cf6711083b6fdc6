//! Atmospheric scintillation noise (Young 1967, with the Osborn et al. 2015
//! empirical correction factor).

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, PhotometryError, Result};

/// Young's coefficient for a fractional RMS in the 1 s, 1 cm regime
pub const YOUNG_COEFFICIENT: f64 = 0.09;

/// Atmospheric scale height in meters
pub const SCALE_HEIGHT_M: f64 = 8000.0;

/// Empirical underestimate of Young's formula at good sites
pub const EMPIRICAL_CORRECTION: f64 = 1.5;

/// Wavelength Young's coefficient is quoted at
pub const REFERENCE_WAVELENGTH_NM: f64 = 550.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScintillationOptions {
    /// Apply the λ^(-7/12) chromatic scaling at this wavelength
    pub wavelength_nm: Option<f64>,
    /// Multiply by [`EMPIRICAL_CORRECTION`]
    pub with_extra_factor: bool,
}

impl Default for ScintillationOptions {
    fn default() -> Self {
        Self {
            wavelength_nm: None,
            with_extra_factor: true,
        }
    }
}

/// Fractional scintillation noise for a single exposure.
///
/// ```text
/// σ = 0.09 · D^(-2/3) · X^1.75 · (2t)^(-1/2) · exp(-h/8000)
/// ```
///
/// with D the aperture in cm, X the airmass, t the exposure in seconds and
/// h the site altitude in meters.
///
/// # Example
/// ```
/// use photometer::noise::{scintillation_noise, ScintillationOptions};
///
/// let options = ScintillationOptions::default();
/// let sigma = scintillation_noise(61.0, 1.0, 120.0, 360.0, options).unwrap();
/// assert!(sigma > 1e-4 && sigma < 1e-3);
/// ```
pub fn scintillation_noise(
    diameter_cm: f64,
    airmass: f64,
    exptime_s: f64,
    altitude_m: f64,
    options: ScintillationOptions,
) -> Result<f64> {
    require_positive("diameter_cm", diameter_cm)?;
    require_positive("exptime_s", exptime_s)?;
    if !(airmass.is_finite() && airmass >= 1.0) {
        return Err(PhotometryError::invalid(
            "airmass",
            airmass,
            "must be finite and at least 1",
        ));
    }
    if !altitude_m.is_finite() {
        return Err(PhotometryError::invalid(
            "altitude_m",
            altitude_m,
            "must be finite",
        ));
    }

    let mut sigma = YOUNG_COEFFICIENT
        * diameter_cm.powf(-2.0 / 3.0)
        * airmass.powf(1.75)
        * (2.0 * exptime_s).powf(-0.5)
        * (-altitude_m / SCALE_HEIGHT_M).exp();

    if options.with_extra_factor {
        sigma *= EMPIRICAL_CORRECTION;
    }
    if let Some(wavelength_nm) = options.wavelength_nm {
        require_positive("wavelength_nm", wavelength_nm)?;
        sigma *= (wavelength_nm / REFERENCE_WAVELENGTH_NM).powf(-7.0 / 12.0);
    }

    Ok(sigma)
}
