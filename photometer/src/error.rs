use thiserror::Error;

use crate::photometry::flux::FluxError;

/// Errors produced by the exposure, noise and cadence models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhotometryError {
    /// A physical input lies outside its domain.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the model.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Constraint that was violated.
        reason: &'static str,
    },

    /// A derived quantity came out non-finite or negative.
    #[error("non-physical {quantity}: {value}")]
    NonPhysicalResult {
        /// Name of the derived quantity.
        quantity: &'static str,
        /// Computed value.
        value: f64,
    },

    /// The flux calculator failed or returned an unusable rate.
    #[error("flux calculation failed: {0}")]
    UpstreamFailure(#[from] FluxError),
}

pub type Result<T> = std::result::Result<T, PhotometryError>;

impl PhotometryError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        PhotometryError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Fail with `InvalidParameter` unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PhotometryError::invalid(
            name,
            value,
            "must be finite and positive",
        ))
    }
}

/// Fail with `InvalidParameter` unless `value` is finite and not negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PhotometryError::invalid(
            name,
            value,
            "must be finite and non-negative",
        ))
    }
}

/// Fail with `NonPhysicalResult` unless a derived `value` is finite and not negative.
pub(crate) fn require_physical(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PhotometryError::NonPhysicalResult { quantity, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("x", 2.5).unwrap(), 2.5);
        assert!(matches!(
            require_positive("x", 0.0),
            Err(PhotometryError::InvalidParameter { name: "x", .. })
        ));
        assert!(require_positive("x", f64::NAN).is_err());
        assert!(require_positive("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_non_negative_accepts_zero() {
        assert_eq!(require_non_negative("dark", 0.0).unwrap(), 0.0);
        assert!(require_non_negative("dark", -1e-12).is_err());
    }

    #[test]
    fn test_require_physical_reports_quantity() {
        let err = require_physical("sky counts", -3.0).unwrap_err();
        assert_eq!(
            err,
            PhotometryError::NonPhysicalResult {
                quantity: "sky counts",
                value: -3.0
            }
        );
        assert_eq!(err.to_string(), "non-physical sky counts: -3");
    }
}
