//! Exposure, noise budget and cadence for a single diffused-star observation.
//!
//! [`CadenceEngine::evaluate`] threads one observation through the models in
//! order: aperture geometry from the diffused image, the star's count rate,
//! the saturation-limited exposure, star and sky counts, the aperture noise,
//! scintillation, and finally the cadence and time-binned precision.
//!
//! ```rust
//! use photometer::cadence::{CadenceEngine, ObservationRequest};
//! use photometer::hardware::telescope::models;
//! use photometer::photometry::{FilterCatalog, SyntheticFluxCalculator};
//!
//! let arc = models::arc_35m();
//! let filters = FilterCatalog::sloan();
//! let engine = CadenceEngine::new(&arc, SyntheticFluxCalculator);
//!
//! let request = ObservationRequest::new(10.0, filters.get("i'").unwrap());
//! let result = engine.evaluate(&request).unwrap();
//! assert!(result.noise_budget.total_noise_ppm > result.noise_budget.scintillation_noise_ppm);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_physical, PhotometryError, Result};
use crate::exposure::max_exposure_time;
use crate::hardware::{DiffuserGeometry, TelescopeConfig};
use crate::noise::{scintillation_noise, NoiseTerms, ScintillationOptions};
use crate::photometry::{Bandpass, FluxCalculator};

/// Inner sky annulus radius in units of the aperture radius
pub const INNER_ANNULUS_SCALE: f64 = 1.5;
/// Outer sky annulus radius in units of the aperture radius
pub const OUTER_ANNULUS_SCALE: f64 = 2.0;

const PPM: f64 = 1e6;

/// Observation parameters other than the target and its filter.
///
/// Defaults: 40000 ADU peak, 2x2 binning, one reference star, airmass 1.5,
/// 2.5 s readout and a 17.5 mag/arcsec² sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationSettings {
    /// Target level of every pixel in the top-hat
    pub max_adu_per_pixel: f64,
    /// On-chip binning factor per axis
    pub binning: u32,
    /// Comparison stars as bright as the target
    pub num_reference_stars: u32,
    pub airmass: f64,
    /// Readout and overhead between exposures in seconds
    pub read_overhead_s: f64,
    pub sky_magnitude_per_arcsec2: f64,
}

impl Default for ObservationSettings {
    fn default() -> Self {
        Self {
            max_adu_per_pixel: 40_000.0,
            binning: 2,
            num_reference_stars: 1,
            airmass: 1.5,
            read_overhead_s: 2.5,
            sky_magnitude_per_arcsec2: 17.5,
        }
    }
}

impl ObservationSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_adu_per_pixel.is_finite() && self.max_adu_per_pixel > 0.0) {
            return Err(PhotometryError::invalid(
                "max_adu_per_pixel",
                self.max_adu_per_pixel,
                "must be finite and positive",
            ));
        }
        if !self.binning.is_power_of_two() {
            return Err(PhotometryError::invalid(
                "binning",
                f64::from(self.binning),
                "must be a power of two",
            ));
        }
        if self.num_reference_stars == 0 {
            return Err(PhotometryError::invalid(
                "num_reference_stars",
                0.0,
                "at least one reference star is required",
            ));
        }
        if !(self.airmass.is_finite() && self.airmass >= 1.0) {
            return Err(PhotometryError::invalid(
                "airmass",
                self.airmass,
                "must be finite and at least 1",
            ));
        }
        require_non_negative("read_overhead_s", self.read_overhead_s)?;
        if !self.sky_magnitude_per_arcsec2.is_finite() {
            return Err(PhotometryError::invalid(
                "sky_magnitude_per_arcsec2",
                self.sky_magnitude_per_arcsec2,
                "must be finite",
            ));
        }
        Ok(())
    }
}

/// One star in one filter
#[derive(Debug, Clone, Copy)]
pub struct ObservationRequest<'a> {
    pub target_magnitude: f64,
    pub bandpass: &'a Bandpass,
    pub settings: ObservationSettings,
}

impl<'a> ObservationRequest<'a> {
    /// Request with default settings
    pub fn new(target_magnitude: f64, bandpass: &'a Bandpass) -> Self {
        Self {
            target_magnitude,
            bandpass,
            settings: ObservationSettings::default(),
        }
    }

    pub fn with_settings(self, settings: ObservationSettings) -> Self {
        Self { settings, ..self }
    }

    pub fn with_binning(mut self, binning: u32) -> Self {
        self.settings.binning = binning;
        self
    }

    pub fn with_airmass(mut self, airmass: f64) -> Self {
        self.settings.airmass = airmass;
        self
    }

    pub fn with_reference_stars(mut self, num_reference_stars: u32) -> Self {
        self.settings.num_reference_stars = num_reference_stars;
        self
    }

    pub fn with_max_adu_per_pixel(mut self, max_adu_per_pixel: f64) -> Self {
        self.settings.max_adu_per_pixel = max_adu_per_pixel;
        self
    }

    pub fn with_read_overhead(mut self, read_overhead_s: f64) -> Self {
        self.settings.read_overhead_s = read_overhead_s;
        self
    }

    pub fn with_sky_magnitude(mut self, sky_magnitude_per_arcsec2: f64) -> Self {
        self.settings.sky_magnitude_per_arcsec2 = sky_magnitude_per_arcsec2;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.target_magnitude.is_finite() {
            return Err(PhotometryError::invalid(
                "target_magnitude",
                self.target_magnitude,
                "must be finite",
            ));
        }
        self.settings.validate()
    }
}

/// Circular aperture and sky annulus in binned pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApertureGeometry {
    pub aperture_radius_pix: f64,
    pub inner_annulus_radius_pix: f64,
    pub outer_annulus_radius_pix: f64,
    /// Binned pixels in the aperture
    pub n_pix: f64,
    /// Binned pixels in the sky annulus
    pub n_b: f64,
}

impl ApertureGeometry {
    /// Aperture matched to the diffused top-hat at the given binning
    pub fn from_diffuser(geometry: &DiffuserGeometry, binning: u32) -> Result<Self> {
        if binning == 0 {
            return Err(PhotometryError::invalid(
                "binning",
                0.0,
                "must be at least 1",
            ));
        }
        let binning = f64::from(binning);

        let aperture_radius_pix = geometry.fwhm_pixels / (2.0 * binning);
        let inner = INNER_ANNULUS_SCALE * aperture_radius_pix;
        let outer = OUTER_ANNULUS_SCALE * aperture_radius_pix;

        Ok(Self {
            aperture_radius_pix,
            inner_annulus_radius_pix: inner,
            outer_annulus_radius_pix: outer,
            n_pix: geometry.total_enclosed_pixels / binning.powi(2),
            n_b: std::f64::consts::PI * (outer.powi(2) - inner.powi(2)),
        })
    }
}

/// Relative noise contributions, all in parts per million
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseBudget {
    /// Star shot noise alone, for reference; already part of the photometric term
    pub photon_noise_ppm: f64,
    /// Star, sky, dark, read and digitization noise in the aperture
    pub photometric_noise_ppm: f64,
    pub scintillation_noise_ppm: f64,
    /// Photometric and scintillation noise in quadrature
    pub total_noise_ppm: f64,
    pub noise_1min_ppm: f64,
    pub noise_30min_ppm: f64,
}

impl NoiseBudget {
    /// Combine per-exposure terms and bin the total to 1 and 30 minutes.
    ///
    /// The binned values follow `total / sqrt(window / cadence)` even when a
    /// single cadence is longer than the window.
    pub fn combine(
        photon_noise_ppm: f64,
        photometric_noise_ppm: f64,
        scintillation_noise_ppm: f64,
        cadence_s: f64,
    ) -> Self {
        let total_noise_ppm = photometric_noise_ppm.hypot(scintillation_noise_ppm);
        Self {
            photon_noise_ppm,
            photometric_noise_ppm,
            scintillation_noise_ppm,
            total_noise_ppm,
            noise_1min_ppm: bin_noise(total_noise_ppm, cadence_s, 60.0),
            noise_30min_ppm: bin_noise(total_noise_ppm, cadence_s, 1800.0),
        }
    }
}

fn bin_noise(total_noise_ppm: f64, cadence_s: f64, window_s: f64) -> f64 {
    total_noise_ppm / (window_s / cadence_s).sqrt()
}

/// Everything derived for one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceResult {
    pub exposure_time_s: f64,
    /// Exposure plus readout overhead
    pub cadence_s: f64,
    pub aperture: ApertureGeometry,
    /// √(1 + 1/N) for N reference stars
    pub reference_star_factor: f64,
    pub star_adu_total: f64,
    pub star_adu_per_pixel: f64,
    pub sky_adu_total: f64,
    pub sky_adu_per_pixel: f64,
    /// Aperture variance by source
    pub noise_terms: NoiseTerms,
    pub noise_budget: NoiseBudget,
}

impl CadenceResult {
    /// Fraction of wall-clock time spent integrating
    pub fn observing_efficiency(&self) -> f64 {
        self.exposure_time_s / self.cadence_s
    }

    /// Whether a single cadence already overruns `window_s`
    pub fn exceeds_window(&self, window_s: f64) -> bool {
        self.cadence_s > window_s
    }

    /// Total noise binned to `window_s`, `None` if one cadence does not fit in the window
    pub fn binned_noise_ppm(&self, window_s: f64) -> Option<f64> {
        if !(window_s.is_finite() && window_s > 0.0) || self.exceeds_window(window_s) {
            return None;
        }
        Some(bin_noise(
            self.noise_budget.total_noise_ppm,
            self.cadence_s,
            window_s,
        ))
    }
}

/// Evaluates observations against one telescope with one flux calculator
#[derive(Debug, Clone)]
pub struct CadenceEngine<'a, F> {
    telescope: &'a TelescopeConfig,
    flux: F,
}

impl<'a, F: FluxCalculator> CadenceEngine<'a, F> {
    pub fn new(telescope: &'a TelescopeConfig, flux: F) -> Self {
        Self { telescope, flux }
    }

    pub fn telescope(&self) -> &TelescopeConfig {
        self.telescope
    }

    pub fn evaluate(&self, request: &ObservationRequest) -> Result<CadenceResult> {
        evaluate(self.telescope, &self.flux, request)
    }

    /// Evaluate independent requests in parallel; results keep the input order
    pub fn evaluate_many(&self, requests: &[ObservationRequest]) -> Vec<Result<CadenceResult>> {
        requests
            .par_iter()
            .map(|request| self.evaluate(request))
            .collect()
    }
}

/// Exposure time, noise budget and cadence for `request` on `telescope`
pub fn evaluate<F: FluxCalculator + ?Sized>(
    telescope: &TelescopeConfig,
    flux: &F,
    request: &ObservationRequest,
) -> Result<CadenceResult> {
    request.validate()?;
    let settings = &request.settings;
    let detector = telescope.detector();
    let geometry = telescope.diffuser_geometry();

    let aperture = ApertureGeometry::from_diffuser(geometry, settings.binning)?;

    let star_rate = telescope.adu_per_sec(flux, request.target_magnitude, request.bandpass)?;
    let exposure_time_s = max_exposure_time(
        star_rate,
        geometry.total_enclosed_pixels,
        settings.max_adu_per_pixel,
        settings.binning,
    )?;
    log::debug!(
        "{} mag {:.2} in {}: {:.1} ADU/s, exposure {:.3} s",
        telescope.name(),
        request.target_magnitude,
        request.bandpass.name(),
        star_rate,
        exposure_time_s
    );

    let star_adu_total = settings.max_adu_per_pixel * aperture.n_pix;

    // Sky is integrated over the unbinned footprint on sky, then spread over the binned aperture
    let sky_rate =
        telescope.adu_per_sec(flux, settings.sky_magnitude_per_arcsec2, request.bandpass)?;
    let sky_adu_total = require_physical(
        "sky counts",
        sky_rate * exposure_time_s * geometry.solid_angle_arcsec2(),
    )?;
    let sky_adu_per_pixel = sky_adu_total / aperture.n_pix;
    log::debug!(
        "star {:.1} ADU over {:.1} pix, sky {:.2} ADU/pix, annulus {:.1} pix",
        star_adu_total,
        aperture.n_pix,
        sky_adu_per_pixel,
        aperture.n_b
    );

    let reference_star_factor = (1.0 + 1.0 / f64::from(settings.num_reference_stars)).sqrt();
    let gain = detector.gain_e_per_adu;

    let photon_noise_ppm = require_physical(
        "photon noise",
        PPM * reference_star_factor / (gain * star_adu_total).sqrt(),
    )?;

    let noise_terms = NoiseTerms::compute(
        star_adu_total,
        aperture.n_pix,
        aperture.n_b,
        sky_adu_per_pixel,
        detector.dark_electrons(exposure_time_s),
        detector.read_noise_e,
        gain,
    )?;
    let photometric_noise_ppm = require_physical(
        "photometric noise",
        PPM * reference_star_factor * noise_terms.noise_adu()? / star_adu_total,
    )?;

    let scintillation_noise_ppm = PPM
        * reference_star_factor
        * scintillation_noise(
            telescope.diameter_cm(),
            settings.airmass,
            exposure_time_s,
            telescope.altitude_m(),
            ScintillationOptions::default(),
        )?;

    let cadence_s = exposure_time_s + settings.read_overhead_s;
    let noise_budget = NoiseBudget::combine(
        photon_noise_ppm,
        photometric_noise_ppm,
        scintillation_noise_ppm,
        cadence_s,
    );
    require_physical("total noise", noise_budget.total_noise_ppm)?;
    log::debug!(
        "photometric {:.1} ppm, scintillation {:.1} ppm, total {:.1} ppm at {:.2} s cadence",
        photometric_noise_ppm,
        scintillation_noise_ppm,
        noise_budget.total_noise_ppm,
        cadence_s
    );

    Ok(CadenceResult {
        exposure_time_s,
        cadence_s,
        aperture,
        reference_star_factor,
        star_adu_total,
        star_adu_per_pixel: star_adu_total / aperture.n_pix,
        sky_adu_total,
        sky_adu_per_pixel,
        noise_terms,
        noise_budget,
    })
}
