//! Ground-based telescope configuration for diffuser-assisted photometry.
//!
//! A [`TelescopeConfig`] ties together the optics (aperture, focal length,
//! central obstruction), the site altitude, the optical throughput, the
//! science detector and the diffuser mounted in front of it. The diffused
//! image geometry is derived once at construction and carried along, so every
//! observation evaluated against the same configuration sees the same
//! footprint.
//!
//! # Light Collection
//! - **Collecting area**: A = π(D/2)²(1 − obstruction)
//! - **Count rate**: e⁻ s⁻¹ cm⁻² from the flux calculator × A / gain
//!
//! # Examples
//!
//! ```rust
//! use photometer::hardware::telescope::models;
//! use photometer::photometry::{FilterCatalog, SyntheticFluxCalculator};
//!
//! let arc = models::arc_35m();
//! let filters = FilterCatalog::sloan();
//! let i_band = filters.get("i'").unwrap();
//!
//! let seconds = arc
//!     .exposure_time_for(&SyntheticFluxCalculator, 10.0, i_band, 40_000.0, 2)
//!     .unwrap();
//! assert!(seconds > 20.0 && seconds < 45.0);
//! ```

use std::f64::consts::PI;

use once_cell::sync::Lazy;

use super::detector::DetectorConfig;
use super::diffuser::{Diffuser, DiffuserGeometry};
use crate::error::{require_positive, PhotometryError, Result};
use crate::exposure::max_exposure_time;
use crate::photometry::{Bandpass, FluxCalculator, FluxError, Throughput};

const ARCSEC_PER_RAD: f64 = 206_264.806;

/// Telescope, site, detector and diffuser, read-only once built.
///
/// Construct with [`TelescopeConfig::new`] and derive variants with the
/// `with_*` methods; each rebuild re-derives the diffuser geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeConfig {
    name: String,
    diameter_cm: f64,
    focal_length_m: f64,
    plate_scale_arcsec_per_pix: f64,
    central_obstruction: f64,
    altitude_m: f64,
    throughput: Throughput,
    detector: DetectorConfig,
    diffuser: Diffuser,
    geometry: DiffuserGeometry,
}

impl TelescopeConfig {
    /// Create a telescope with an unobstructed aperture at sea level and unit throughput.
    ///
    /// The plate scale follows from the focal length and pixel pitch; use
    /// [`with_plate_scale`](Self::with_plate_scale) to substitute a measured value.
    pub fn new(
        name: impl Into<String>,
        diameter_cm: f64,
        focal_length_m: f64,
        detector: DetectorConfig,
        diffuser: Diffuser,
    ) -> Result<Self> {
        require_positive("diameter_cm", diameter_cm)?;
        require_positive("focal_length_m", focal_length_m)?;
        detector.validate()?;

        let plate_scale = ARCSEC_PER_RAD * detector.pixel_size_micron * 1e-6 / focal_length_m;
        let geometry = diffuser.geometry(detector.pixel_size_micron, plate_scale)?;

        Ok(Self {
            name: name.into(),
            diameter_cm,
            focal_length_m,
            plate_scale_arcsec_per_pix: plate_scale,
            central_obstruction: 0.0,
            altitude_m: 0.0,
            throughput: Throughput::Uniform(1.0),
            detector,
            diffuser,
            geometry,
        })
    }

    fn rebuild(mut self) -> Result<Self> {
        self.geometry = self.diffuser.geometry(
            self.detector.pixel_size_micron,
            self.plate_scale_arcsec_per_pix,
        )?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn diameter_cm(&self) -> f64 {
        self.diameter_cm
    }

    pub fn focal_length_m(&self) -> f64 {
        self.focal_length_m
    }

    /// Focal ratio f/D
    pub fn f_number(&self) -> f64 {
        self.focal_length_m * 100.0 / self.diameter_cm
    }

    pub fn plate_scale_arcsec_per_pix(&self) -> f64 {
        self.plate_scale_arcsec_per_pix
    }

    /// Fraction of the aperture area blocked, 0 to 1
    pub fn central_obstruction(&self) -> f64 {
        self.central_obstruction
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }

    pub fn throughput(&self) -> &Throughput {
        &self.throughput
    }

    /// Representative throughput as a percentage
    pub fn throughput_percent(&self) -> f64 {
        100.0 * self.throughput.nominal()
    }

    pub fn detector(&self) -> &DetectorConfig {
        &self.detector
    }

    pub fn diffuser(&self) -> &Diffuser {
        &self.diffuser
    }

    /// Diffused image footprint on the unbinned detector
    pub fn diffuser_geometry(&self) -> &DiffuserGeometry {
        &self.geometry
    }

    /// Collecting area in cm², net of the central obstruction
    pub fn collecting_area_cm2(&self) -> f64 {
        PI * (self.diameter_cm / 2.0).powi(2) * (1.0 - self.central_obstruction)
    }

    /// Field of view across the detector in arcminutes
    pub fn field_of_view_arcmin(&self) -> f64 {
        self.plate_scale_arcsec_per_pix * f64::from(self.detector.width_pix) / 60.0
    }

    /// Count rate in ADU/s for a source of `magnitude` in `bandpass`.
    ///
    /// For sky background pass a surface brightness in mag/arcsec² and get
    /// ADU s⁻¹ arcsec⁻² back. A negative or non-finite rate from the flux
    /// calculator is reported as [`PhotometryError::UpstreamFailure`].
    pub fn adu_per_sec<F: FluxCalculator + ?Sized>(
        &self,
        flux: &F,
        magnitude: f64,
        bandpass: &Bandpass,
    ) -> Result<f64> {
        let rate = flux.count_rate(magnitude, bandpass, &self.detector.qe, &self.throughput)?;
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(FluxError::InvalidRate(rate).into());
        }

        Ok(rate * self.collecting_area_cm2() / self.detector.gain_e_per_adu)
    }

    /// Longest exposure before a `magnitude` star fills its top-hat to `max_adu_per_pixel`
    pub fn exposure_time_for<F: FluxCalculator + ?Sized>(
        &self,
        flux: &F,
        magnitude: f64,
        bandpass: &Bandpass,
        max_adu_per_pixel: f64,
        binning: u32,
    ) -> Result<f64> {
        let adu_per_sec = self.adu_per_sec(flux, magnitude, bandpass)?;
        max_exposure_time(
            adu_per_sec,
            self.geometry.total_enclosed_pixels,
            max_adu_per_pixel,
            binning,
        )
    }

    /// Same telescope with a different focal length; the plate scale scales inversely
    pub fn with_focal_length(&self, focal_length_m: f64) -> Result<TelescopeConfig> {
        require_positive("focal_length_m", focal_length_m)?;
        TelescopeConfig {
            focal_length_m,
            plate_scale_arcsec_per_pix: self.plate_scale_arcsec_per_pix * self.focal_length_m
                / focal_length_m,
            ..self.clone()
        }
        .rebuild()
    }

    pub fn with_plate_scale(&self, plate_scale_arcsec_per_pix: f64) -> Result<TelescopeConfig> {
        require_positive("plate_scale_arcsec_per_pix", plate_scale_arcsec_per_pix)?;
        TelescopeConfig {
            plate_scale_arcsec_per_pix,
            ..self.clone()
        }
        .rebuild()
    }

    pub fn with_central_obstruction(&self, central_obstruction: f64) -> Result<TelescopeConfig> {
        if !(0.0..=1.0).contains(&central_obstruction) {
            return Err(PhotometryError::invalid(
                "central_obstruction",
                central_obstruction,
                "must lie between 0 and 1",
            ));
        }
        Ok(TelescopeConfig {
            central_obstruction,
            ..self.clone()
        })
    }

    pub fn with_altitude(&self, altitude_m: f64) -> Result<TelescopeConfig> {
        if !altitude_m.is_finite() {
            return Err(PhotometryError::invalid(
                "altitude_m",
                altitude_m,
                "must be finite",
            ));
        }
        Ok(TelescopeConfig {
            altitude_m,
            ..self.clone()
        })
    }

    pub fn with_throughput(&self, throughput: Throughput) -> TelescopeConfig {
        TelescopeConfig {
            throughput,
            ..self.clone()
        }
    }

    pub fn with_diffuser(&self, diffuser: Diffuser) -> Result<TelescopeConfig> {
        TelescopeConfig {
            diffuser,
            ..self.clone()
        }
        .rebuild()
    }

    /// Swap the detector, keeping the current plate scale
    pub fn with_detector(&self, detector: DetectorConfig) -> Result<TelescopeConfig> {
        detector.validate()?;
        TelescopeConfig {
            detector,
            ..self.clone()
        }
        .rebuild()
    }
}

/// Standard telescope models
pub mod models {
    use super::*;
    use crate::hardware::detector::models::ARCTIC;

    /// ARC 3.5m at Apache Point with the ARCTIC imager and a 0.34° diffuser
    pub static ARC_35M: Lazy<TelescopeConfig> = Lazy::new(|| {
        let diffuser_transmission = 0.90;
        let lenses = 0.99_f64.powi(4);
        let mirrors = 0.96_f64.powi(2);
        // Nominal allowance for the atmosphere
        let atmosphere = 0.5;

        TelescopeConfig::new(
            "ARC 3.5m",
            350.0, // cm
            28.0,  // m, f/8
            ARCTIC.clone(),
            Diffuser::new(0.34, 200.0),
        )
        .and_then(|telescope| telescope.with_plate_scale(0.11))
        .and_then(|telescope| telescope.with_central_obstruction(0.09))
        .and_then(|telescope| telescope.with_altitude(2788.0))
        .map(|telescope| {
            telescope.with_throughput(Throughput::Uniform(
                diffuser_transmission * lenses * mirrors * atmosphere,
            ))
        })
        .expect("ARC 3.5m parameters are physical")
    });

    pub fn arc_35m() -> TelescopeConfig {
        ARC_35M.clone()
    }

    /// Named preset constructors
    pub static REGISTRY: &[(&str, fn() -> TelescopeConfig)] = &[("ARC 3.5m", arc_35m)];

    /// Preset names in registry order
    pub fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(name, _)| *name)
    }

    /// Look up a preset by name, ignoring ASCII case
    pub fn by_name(name: &str) -> Option<TelescopeConfig> {
        REGISTRY
            .iter()
            .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
            .map(|(_, build)| build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::detector::models::ARCTIC;
    use crate::photometry::{QuantumEfficiency, SyntheticFluxCalculator};
    use float_cmp::approx_eq;

    fn test_telescope() -> TelescopeConfig {
        TelescopeConfig::new("Test", 100.0, 8.0, ARCTIC.clone(), Diffuser::new(0.5, 100.0)).unwrap()
    }

    struct FixedRate(f64);

    impl FluxCalculator for FixedRate {
        fn count_rate(
            &self,
            _magnitude: f64,
            _bandpass: &Bandpass,
            _qe: &QuantumEfficiency,
            _throughput: &Throughput,
        ) -> std::result::Result<f64, FluxError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_f_number_and_plate_scale() {
        let telescope = test_telescope();
        assert!(approx_eq!(f64, telescope.f_number(), 8.0, epsilon = 1e-12));

        let expected_plate_scale = 206_264.806 * 15e-6 / 8.0;
        assert!(approx_eq!(
            f64,
            telescope.plate_scale_arcsec_per_pix(),
            expected_plate_scale,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn test_collecting_area() {
        let telescope = test_telescope().with_central_obstruction(0.25).unwrap();
        let expected = PI * 50.0 * 50.0 * 0.75;
        assert!(approx_eq!(
            f64,
            telescope.collecting_area_cm2(),
            expected,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn test_adu_per_sec_scales_by_area_over_gain() {
        let telescope = test_telescope();
        let bandpass = Bandpass::top_hat("r'", 562.0, 695.0).unwrap();

        let adu = telescope.adu_per_sec(&FixedRate(10.0), 12.0, &bandpass).unwrap();
        let expected = 10.0 * telescope.collecting_area_cm2() / 2.0;
        assert!(approx_eq!(f64, adu, expected, epsilon = 1e-9));
    }

    #[test]
    fn test_invalid_upstream_rate() {
        let telescope = test_telescope();
        let bandpass = Bandpass::top_hat("r'", 562.0, 695.0).unwrap();

        for rate in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                telescope.adu_per_sec(&FixedRate(rate), 12.0, &bandpass),
                Err(PhotometryError::UpstreamFailure(FluxError::InvalidRate(_)))
            ));
        }
    }

    #[test]
    fn test_focal_length_rescales_geometry_on_sky() {
        let telescope = test_telescope();
        let longer = telescope.with_focal_length(16.0).unwrap();

        assert!(approx_eq!(
            f64,
            longer.plate_scale_arcsec_per_pix(),
            telescope.plate_scale_arcsec_per_pix() / 2.0,
            epsilon = 1e-12
        ));
        // Footprint on the detector is unchanged, on sky it halves
        assert_eq!(
            longer.diffuser_geometry().fwhm_pixels,
            telescope.diffuser_geometry().fwhm_pixels
        );
        assert!(approx_eq!(
            f64,
            longer.diffuser_geometry().fwhm_arcsec,
            telescope.diffuser_geometry().fwhm_arcsec / 2.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn test_rejects_invalid_construction() {
        let diffuser = Diffuser::new(0.5, 100.0);
        assert!(TelescopeConfig::new("x", 0.0, 8.0, ARCTIC.clone(), diffuser).is_err());
        assert!(TelescopeConfig::new("x", 100.0, -1.0, ARCTIC.clone(), diffuser).is_err());
        assert!(
            TelescopeConfig::new("x", 100.0, 8.0, ARCTIC.clone(), Diffuser::new(180.0, 100.0))
                .is_err()
        );
        assert!(test_telescope().with_central_obstruction(1.5).is_err());
        assert!(test_telescope().with_altitude(f64::NAN).is_err());
    }

    #[test]
    fn test_synthetic_flux_through_telescope() {
        let telescope = models::arc_35m();
        let bandpass = Bandpass::top_hat("i'", 695.0, 844.0).unwrap();
        let star = telescope
            .adu_per_sec(&SyntheticFluxCalculator, 10.0, &bandpass)
            .unwrap();
        let sky = telescope
            .adu_per_sec(&SyntheticFluxCalculator, 17.5, &bandpass)
            .unwrap();

        assert!(approx_eq!(f64, star / sky, 1000.0, epsilon = 1e-6));
        assert!((1.45e6..1.6e6).contains(&star), "star rate {star}");
    }
}
