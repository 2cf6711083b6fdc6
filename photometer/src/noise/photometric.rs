//! Aperture photometry noise for a top-hat image measured against a sky annulus.
//!
//! The CCD equation with a background-estimation penalty:
//!
//! ```text
//! σ = sqrt(g·S + n_pix·(1 + n_pix/n_b)·(g·B + D + R² + (g·σ_q)²)) / g
//! ```
//!
//! S is the star signal and B the sky per pixel (both ADU), D the dark
//! electrons per pixel, R the read noise (e⁻), g the gain (e⁻/ADU) and
//! σ_q ≈ 0.289 ADU the quantization noise of a uniform rounding error.
//! The `1 + n_pix/n_b` factor accounts for the noise in the sky level
//! estimated from `n_b` annulus pixels.

use serde::{Deserialize, Serialize};

use crate::error::{
    require_non_negative, require_physical, require_positive, PhotometryError, Result,
};

/// RMS of a uniform rounding error of one ADU, 1/√12
pub const DIGITIZATION_NOISE_ADU: f64 = 0.289;

/// Per-source variance contributions in e⁻², before the gain conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseTerms {
    pub star: f64,
    pub sky: f64,
    pub dark: f64,
    pub read: f64,
    pub digitization: f64,
    /// `1 + n_pix/n_b`, already folded into the per-pixel terms
    pub background_penalty: f64,
    gain: f64,
}

impl NoiseTerms {
    /// Break the aperture variance into its sources.
    ///
    /// # Arguments
    /// * `star_adu` - Total star signal in the aperture (ADU)
    /// * `n_pix` - Pixels in the aperture
    /// * `n_b` - Pixels in the sky annulus, must be positive
    /// * `sky_adu_per_pix` - Sky level per pixel (ADU)
    /// * `dark_e_per_pix` - Dark electrons per pixel
    /// * `read_e` - Read noise per pixel (e⁻ RMS)
    /// * `gain` - e⁻ per ADU, must be positive
    pub fn compute(
        star_adu: f64,
        n_pix: f64,
        n_b: f64,
        sky_adu_per_pix: f64,
        dark_e_per_pix: f64,
        read_e: f64,
        gain: f64,
    ) -> Result<Self> {
        if !(n_b.is_finite() && n_b > 0.0) {
            return Err(PhotometryError::invalid(
                "n_b",
                n_b,
                "sky annulus must contain pixels",
            ));
        }
        require_positive("gain", gain)?;
        require_non_negative("n_pix", n_pix)?;

        let penalty = 1.0 + n_pix / n_b;
        let per_pixel = n_pix * penalty;

        Ok(Self {
            star: gain * star_adu,
            sky: per_pixel * gain * sky_adu_per_pix,
            dark: per_pixel * dark_e_per_pix,
            read: per_pixel * read_e.powi(2),
            digitization: per_pixel * (gain * DIGITIZATION_NOISE_ADU).powi(2),
            background_penalty: penalty,
            gain,
        })
    }

    /// Total variance in e⁻²
    pub fn variance_e2(&self) -> f64 {
        self.star + self.sky + self.dark + self.read + self.digitization
    }

    /// Total noise in ADU
    pub fn noise_adu(&self) -> Result<f64> {
        let variance = require_physical("noise variance", self.variance_e2())?;
        require_physical("photometric noise", variance.sqrt() / self.gain)
    }
}

/// Aperture photometry noise in ADU (not normalized by the signal).
///
/// Fails with `InvalidParameter` for a non-positive annulus or gain and with
/// `NonPhysicalResult` when the variance comes out negative or non-finite.
pub fn photometric_noise(
    star_adu: f64,
    n_pix: f64,
    n_b: f64,
    sky_adu_per_pix: f64,
    dark_e_per_pix: f64,
    read_e: f64,
    gain: f64,
) -> Result<f64> {
    NoiseTerms::compute(star_adu, n_pix, n_b, sky_adu_per_pix, dark_e_per_pix, read_e, gain)?
        .noise_adu()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_matches_ccd_equation() {
        let (star, n_pix, n_b, sky, dark, read, gain): (f64, f64, f64, f64, f64, f64, f64) =
            (4.9e7, 1229.2, 2151.1, 2379.7, 0.0, 3.7, 2.0);

        let expected = (gain * star
            + n_pix
                * ((1.0 + n_pix / n_b)
                    * (gain * sky + dark + read * read + (gain * 0.289) * (gain * 0.289))))
            .sqrt()
            / gain;

        let noise = photometric_noise(star, n_pix, n_b, sky, dark, read, gain).unwrap();
        assert_relative_eq!(noise, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_photon_limited() {
        // Empty aperture leaves only the star's shot noise
        let noise = photometric_noise(10_000.0, 0.0, 100.0, 50.0, 5.0, 3.0, 4.0).unwrap();
        assert_relative_eq!(noise, (4.0_f64 * 10_000.0).sqrt() / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_terms_sum_to_variance() {
        let terms = NoiseTerms::compute(1e6, 300.0, 600.0, 120.0, 8.0, 4.5, 1.5).unwrap();

        assert_relative_eq!(terms.background_penalty, 1.5, max_relative = 1e-12);
        assert_relative_eq!(terms.star, 1.5e6, max_relative = 1e-12);
        assert_relative_eq!(terms.read, 300.0 * 1.5 * 4.5 * 4.5, max_relative = 1e-12);
        assert_relative_eq!(
            terms.noise_adu().unwrap(),
            terms.variance_e2().sqrt() / 1.5,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rejects_empty_annulus_and_bad_gain() {
        for n_b in [0.0, -10.0, f64::NAN] {
            assert!(matches!(
                photometric_noise(1e5, 100.0, n_b, 10.0, 0.0, 3.0, 2.0),
                Err(PhotometryError::InvalidParameter { name: "n_b", .. })
            ));
        }
        assert!(matches!(
            photometric_noise(1e5, 100.0, 200.0, 10.0, 0.0, 3.0, 0.0),
            Err(PhotometryError::InvalidParameter { name: "gain", .. })
        ));
    }

    #[test]
    fn test_negative_variance_is_non_physical() {
        assert!(matches!(
            photometric_noise(-1e6, 10.0, 20.0, 0.0, 0.0, 1.0, 1.0),
            Err(PhotometryError::NonPhysicalResult { .. })
        ));
        assert!(matches!(
            photometric_noise(f64::INFINITY, 10.0, 20.0, 0.0, 0.0, 1.0, 1.0),
            Err(PhotometryError::NonPhysicalResult { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_scaling_aperture_and_annulus_keeps_penalty(
            n_pix in 1.0f64..1e5,
            n_b in 1.0f64..1e5,
            scale in 1.0f64..16.0,
        ) {
            let base = NoiseTerms::compute(1e6, n_pix, n_b, 10.0, 1.0, 3.0, 2.0).unwrap();
            let scaled =
                NoiseTerms::compute(1e6, n_pix * scale, n_b * scale, 10.0, 1.0, 3.0, 2.0).unwrap();
            prop_assert!(
                (base.background_penalty - scaled.background_penalty).abs()
                    <= 1e-12 * base.background_penalty
            );
        }

        #[test]
        fn prop_noise_grows_with_sky(
            sky in 0.0f64..1e4,
            extra in 1.0f64..1e4,
        ) {
            let dim = photometric_noise(1e6, 500.0, 900.0, sky, 0.0, 3.7, 2.0).unwrap();
            let bright = photometric_noise(1e6, 500.0, 900.0, sky + extra, 0.0, 3.7, 2.0).unwrap();
            prop_assert!(bright > dim);
        }
    }
}
