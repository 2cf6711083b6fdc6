//! Saturation-limited exposure time for a top-hat stellar image.

use crate::error::{require_positive, PhotometryError, Result};

/// Longest exposure before the top-hat's pixels reach `max_adu_per_pixel`.
///
/// The image covers `total_pixels` unbinned pixels, i.e.
/// `total_pixels / binning²` binned ones, each of which may collect
/// `max_adu_per_pixel` before the star's `count_rate_per_s` (ADU/s) fills it.
///
/// # Example
/// ```
/// use photometer::exposure::max_exposure_time;
///
/// // 4000 pixels binned 2x2 into 1000, 40k ADU each, at 1e6 ADU/s
/// let seconds = max_exposure_time(1e6, 4000.0, 40_000.0, 2).unwrap();
/// assert!((seconds - 40.0).abs() < 1e-9);
/// ```
pub fn max_exposure_time(
    count_rate_per_s: f64,
    total_pixels: f64,
    max_adu_per_pixel: f64,
    binning: u32,
) -> Result<f64> {
    require_positive("count_rate_per_s", count_rate_per_s)?;
    require_positive("total_pixels", total_pixels)?;
    require_positive("max_adu_per_pixel", max_adu_per_pixel)?;
    if binning == 0 {
        return Err(PhotometryError::invalid(
            "binning",
            0.0,
            "must be at least 1",
        ));
    }

    let binned_pixels = total_pixels / f64::from(binning).powi(2);
    Ok(binned_pixels * max_adu_per_pixel / count_rate_per_s)
}
