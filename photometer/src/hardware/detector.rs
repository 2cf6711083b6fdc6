//! Detector configuration for the science camera

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, PhotometryError, Result};
use crate::photometry::QuantumEfficiency;

/// Configuration for an imaging detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Name/model of the detector
    pub name: String,
    /// Quantum efficiency as a function of wavelength
    pub qe: QuantumEfficiency,
    /// Width of the (square) detector in pixels
    pub width_pix: u32,
    /// Pixel size in microns
    pub pixel_size_micron: f64,
    /// Electrons per ADU
    pub gain_e_per_adu: f64,
    /// Read noise in electrons per pixel
    pub read_noise_e: f64,
    /// Dark current in electrons per pixel per second
    pub dark_noise_e_per_pix_per_s: f64,
}

impl DetectorConfig {
    pub fn new(
        name: impl Into<String>,
        qe: QuantumEfficiency,
        width_pix: u32,
        pixel_size_micron: f64,
        gain_e_per_adu: f64,
        read_noise_e: f64,
        dark_noise_e_per_pix_per_s: f64,
    ) -> Result<Self> {
        let detector = Self {
            name: name.into(),
            qe,
            width_pix,
            pixel_size_micron,
            gain_e_per_adu,
            read_noise_e,
            dark_noise_e_per_pix_per_s,
        };
        detector.validate()?;
        Ok(detector)
    }

    /// Check the physical fields, e.g. after deserializing a profile
    pub fn validate(&self) -> Result<()> {
        if self.width_pix == 0 {
            return Err(PhotometryError::invalid(
                "width_pix",
                0.0,
                "detector must have pixels",
            ));
        }
        require_positive("pixel_size_micron", self.pixel_size_micron)?;
        require_positive("gain_e_per_adu", self.gain_e_per_adu)?;
        require_non_negative("read_noise_e", self.read_noise_e)?;
        require_non_negative("dark_noise_e_per_pix_per_s", self.dark_noise_e_per_pix_per_s)?;
        Ok(())
    }

    /// Physical width of the detector in millimeters
    pub fn width_mm(&self) -> f64 {
        f64::from(self.width_pix) * self.pixel_size_micron / 1000.0
    }

    /// Dark electrons per pixel accumulated over `exposure_s`
    pub fn dark_electrons(&self, exposure_s: f64) -> f64 {
        self.dark_noise_e_per_pix_per_s * exposure_s
    }
}

/// Standard detector models
pub mod models {
    use super::*;

    /// Approximate QE of the ARCTIC back-illuminated CCD, 350-1050 nm
    pub static ARCTIC_QE: Lazy<QuantumEfficiency> = Lazy::new(|| {
        QuantumEfficiency::from_table(
            vec![
                350.0, 400.0, 450.0, 500.0, 550.0, 600.0, 650.0, 700.0, 750.0, 800.0, 850.0,
                900.0, 950.0, 1000.0, 1050.0,
            ],
            vec![
                0.30, 0.60, 0.80, 0.88, 0.90, 0.90, 0.90, 0.88, 0.85, 0.80, 0.70, 0.55, 0.35,
                0.15, 0.03,
            ],
        )
        .expect("ARCTIC QE table is sorted and within [0, 1]")
    });

    /// ARCTIC imager on the ARC 3.5m: 4096² STA CCD, 15 µm pixels
    pub static ARCTIC: Lazy<DetectorConfig> = Lazy::new(|| {
        DetectorConfig::new("ARCTIC", ARCTIC_QE.clone(), 4096, 15.0, 2.0, 3.7, 0.0)
            .expect("ARCTIC parameters are positive")
    });
}
