//! Type-safe physical units for the optical geometry
//!
//! Thin extension traits over `uom` quantities so the diffuser code can
//! state which unit a raw number is in.

use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length, Ratio};
use uom::si::length::{micrometer, millimeter};
use uom::si::ratio::ratio;

/// Extension trait for the focal-plane lengths of a diffuser setup
pub trait LengthExt {
    /// Create length from micrometers (pixel sizes)
    fn from_micrometers(um: f64) -> Self;

    /// Create length from millimeters (diffuser spacing)
    fn from_millimeters(mm: f64) -> Self;
}

impl LengthExt for Length {
    fn from_micrometers(um: f64) -> Self {
        Length::new::<micrometer>(um)
    }

    fn from_millimeters(mm: f64) -> Self {
        Length::new::<millimeter>(mm)
    }
}

/// Extension trait for plane angles
pub trait AngleExt {
    fn from_degrees(deg: f64) -> Self;
    fn as_radians(&self) -> f64;
}

impl AngleExt for Angle {
    fn from_degrees(deg: f64) -> Self {
        Angle::new::<degree>(deg)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }
}

/// Dimensionless quotient of two lengths, e.g. a focal-plane distance in pixels.
pub fn length_ratio(numerator: Length, denominator: Length) -> f64 {
    let quotient: Ratio = numerator / denominator;
    quotient.get::<ratio>()
}
