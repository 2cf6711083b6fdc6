//! Diffused stellar image geometry.
//!
//! An engineered diffuser placed in front of the detector spreads each star
//! into a stable, roughly circular top-hat. Its footprint on the detector is
//! set entirely by the diffuser's full opening angle and its distance from
//! the focal plane:
//!
//! ```text
//! FWHM [pix] = 2 · tan(θ/2) · d / p
//! ```
//!
//! with θ the full cone angle, d the diffuser-to-detector spacing and p the
//! pixel pitch. The top-hat diameter is treated as the FWHM.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use uom::si::f64::{Angle, Length};

use crate::error::{require_positive, PhotometryError, Result};
use crate::units::{length_ratio, AngleExt, LengthExt};

/// Physical diffuser mounting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diffuser {
    /// Full opening angle in degrees
    pub opening_angle_deg: f64,
    /// Diffuser to detector spacing in millimeters
    pub distance_mm: f64,
}

impl Diffuser {
    pub fn new(opening_angle_deg: f64, distance_mm: f64) -> Self {
        Self {
            opening_angle_deg,
            distance_mm,
        }
    }

    /// Image geometry on a detector with the given pixel pitch and plate scale
    pub fn geometry(
        &self,
        pixel_size_micron: f64,
        plate_scale_arcsec_per_pix: f64,
    ) -> Result<DiffuserGeometry> {
        DiffuserGeometry::compute(
            self.opening_angle_deg,
            self.distance_mm,
            pixel_size_micron,
            plate_scale_arcsec_per_pix,
        )
    }
}

/// Size of the diffused stellar image on the detector (unbinned pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffuserGeometry {
    /// Top-hat diameter in unbinned pixels
    pub fwhm_pixels: f64,
    /// Top-hat diameter on sky in arcseconds
    pub fwhm_arcsec: f64,
    /// Pixels enclosed by the top-hat, π·(FWHM/2)²
    pub total_enclosed_pixels: f64,
}

/// Diameter of the diffused image in pixels.
///
/// # Arguments
/// * `opening_angle_deg` - Full cone angle of the diffuser, in (0, 180) degrees
/// * `distance_mm` - Diffuser to detector spacing in millimeters
/// * `pixel_size_micron` - Pixel pitch in microns
///
/// # Example
/// ```
/// use photometer::hardware::diffuser::fwhm_pixels;
///
/// let fwhm = fwhm_pixels(0.34, 200.0, 13.5).unwrap();
/// assert!((fwhm - 87.9).abs() < 0.1);
/// ```
pub fn fwhm_pixels(
    opening_angle_deg: f64,
    distance_mm: f64,
    pixel_size_micron: f64,
) -> Result<f64> {
    if !(opening_angle_deg.is_finite() && opening_angle_deg > 0.0 && opening_angle_deg < 180.0) {
        return Err(PhotometryError::invalid(
            "opening_angle_deg",
            opening_angle_deg,
            "must lie strictly between 0 and 180 degrees",
        ));
    }
    require_positive("distance_mm", distance_mm)?;
    require_positive("pixel_size_micron", pixel_size_micron)?;

    let half_angle = Angle::from_degrees(opening_angle_deg / 2.0);
    let spacing = Length::from_millimeters(distance_mm);
    let pixel = Length::from_micrometers(pixel_size_micron);

    Ok(2.0 * half_angle.as_radians().tan() * length_ratio(spacing, pixel))
}

impl DiffuserGeometry {
    /// Derive the image geometry for a diffuser mounted in front of a detector.
    ///
    /// `plate_scale_arcsec_per_pix` converts the pixel footprint to an on-sky size.
    pub fn compute(
        opening_angle_deg: f64,
        distance_mm: f64,
        pixel_size_micron: f64,
        plate_scale_arcsec_per_pix: f64,
    ) -> Result<Self> {
        require_positive("plate_scale_arcsec_per_pix", plate_scale_arcsec_per_pix)?;
        let fwhm_pixels = fwhm_pixels(opening_angle_deg, distance_mm, pixel_size_micron)?;

        Ok(Self {
            fwhm_pixels,
            fwhm_arcsec: fwhm_pixels * plate_scale_arcsec_per_pix,
            total_enclosed_pixels: PI * (fwhm_pixels / 2.0).powi(2),
        })
    }

    /// Top-hat radius in arcseconds
    pub fn radius_arcsec(&self) -> f64 {
        self.fwhm_arcsec / 2.0
    }

    /// Solid angle covered by the top-hat in square arcseconds
    pub fn solid_angle_arcsec2(&self) -> f64 {
        PI * self.radius_arcsec().powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_reference_diffuser_fwhm() {
        // 0.34 degree diffuser 200mm in front of 13.5 micron pixels
        let fwhm = fwhm_pixels(0.34, 200.0, 13.5).unwrap();
        let expected = 2.0 * (0.17_f64.to_radians()).tan() * 200.0 / 0.0135;
        assert_relative_eq!(fwhm, expected, max_relative = 1e-12);
        assert_relative_eq!(fwhm, 87.9, max_relative = 1e-3);
    }

    #[test]
    fn test_geometry_derived_quantities() {
        let geometry = DiffuserGeometry::compute(0.34, 200.0, 15.0, 0.11).unwrap();

        assert_relative_eq!(
            geometry.fwhm_arcsec / 0.11,
            geometry.fwhm_pixels,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            geometry.total_enclosed_pixels,
            PI * geometry.fwhm_pixels * geometry.fwhm_pixels / 4.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            geometry.solid_angle_arcsec2(),
            PI * (geometry.fwhm_arcsec / 2.0).powi(2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rejects_non_physical_angles() {
        for angle in [0.0, -1.0, 180.0, 270.0, f64::NAN] {
            let result = fwhm_pixels(angle, 200.0, 15.0);
            assert!(
                matches!(
                    result,
                    Err(PhotometryError::InvalidParameter {
                        name: "opening_angle_deg",
                        ..
                    })
                ),
                "angle {angle} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_zero_distance_and_pixel() {
        assert!(matches!(
            fwhm_pixels(0.34, 0.0, 15.0),
            Err(PhotometryError::InvalidParameter {
                name: "distance_mm",
                ..
            })
        ));
        assert!(matches!(
            fwhm_pixels(0.34, 200.0, 0.0),
            Err(PhotometryError::InvalidParameter {
                name: "pixel_size_micron",
                ..
            })
        ));
        assert!(DiffuserGeometry::compute(0.34, 200.0, 15.0, 0.0).is_err());
    }

    #[test]
    fn test_mounted_diffuser_matches_free_function() {
        let diffuser = Diffuser::new(0.34, 200.0);
        let geometry = diffuser.geometry(15.0, 0.11).unwrap();
        assert_eq!(geometry.fwhm_pixels, fwhm_pixels(0.34, 200.0, 15.0).unwrap());
        assert_relative_eq!(geometry.fwhm_pixels, 79.12, max_relative = 1e-3);
    }

    proptest! {
        #[test]
        fn prop_fwhm_increases_with_distance(
            angle in 0.01f64..120.0,
            distance in 1.0f64..1000.0,
            extra in 0.1f64..500.0,
            pixel in 1.0f64..30.0,
        ) {
            let near = fwhm_pixels(angle, distance, pixel).unwrap();
            let far = fwhm_pixels(angle, distance + extra, pixel).unwrap();
            prop_assert!(far > near);
        }

        #[test]
        fn prop_fwhm_increases_with_angle(
            angle in 0.01f64..120.0,
            extra in 0.01f64..50.0,
            distance in 1.0f64..1000.0,
            pixel in 1.0f64..30.0,
        ) {
            let narrow = fwhm_pixels(angle, distance, pixel).unwrap();
            let wide = fwhm_pixels(angle + extra, distance, pixel).unwrap();
            prop_assert!(wide > narrow);
        }

        #[test]
        fn prop_arcsec_round_trip(
            angle in 0.01f64..120.0,
            distance in 1.0f64..1000.0,
            pixel in 1.0f64..30.0,
            plate_scale in 0.01f64..5.0,
        ) {
            let geometry = DiffuserGeometry::compute(angle, distance, pixel, plate_scale).unwrap();
            let recovered = geometry.fwhm_arcsec / plate_scale;
            prop_assert!((recovered - geometry.fwhm_pixels).abs() <= 1e-9 * geometry.fwhm_pixels);
        }
    }
}
