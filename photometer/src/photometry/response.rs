//! Spectral response curves: filter bandpasses, optical throughput, and the
//! combined detector response seen by the flux calculator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Band, QuantumEfficiency};

/// Errors raised while validating a tabulated response curve
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResponseCurveError {
    #[error("Wavelength and response vectors must have the same length")]
    LengthMismatch,

    #[error("At least two samples are required, got {0}")]
    TooFewSamples(usize),

    #[error("Wavelengths must be positive and in ascending order")]
    NotAscending,

    #[error("Response values must be between 0.0 and 1.0, got {0}")]
    OutOfRange(f64),
}

/// Piecewise-linear response (0.0 to 1.0) tabulated against wavelength in nm.
///
/// Zero outside the tabulated range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveTable", into = "CurveTable")]
pub struct ResponseCurve {
    wavelengths: Vec<f64>,
    values: Vec<f64>,
}

/// Serialized form of a curve, validated on the way back in
#[derive(Serialize, Deserialize)]
struct CurveTable {
    wavelengths_nm: Vec<f64>,
    values: Vec<f64>,
}

impl TryFrom<CurveTable> for ResponseCurve {
    type Error = ResponseCurveError;

    fn try_from(table: CurveTable) -> Result<Self, Self::Error> {
        ResponseCurve::from_table(table.wavelengths_nm, table.values)
    }
}

impl From<ResponseCurve> for CurveTable {
    fn from(curve: ResponseCurve) -> Self {
        CurveTable {
            wavelengths_nm: curve.wavelengths,
            values: curve.values,
        }
    }
}

impl ResponseCurve {
    pub fn from_table(
        wavelengths: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, ResponseCurveError> {
        if wavelengths.len() != values.len() {
            return Err(ResponseCurveError::LengthMismatch);
        }
        if wavelengths.len() < 2 {
            return Err(ResponseCurveError::TooFewSamples(wavelengths.len()));
        }
        if !wavelengths[0].is_finite()
            || wavelengths[0] <= 0.0
            || wavelengths
                .windows(2)
                .any(|pair| pair[1].is_nan() || pair[1] <= pair[0])
        {
            return Err(ResponseCurveError::NotAscending);
        }
        if let Some(&bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(ResponseCurveError::OutOfRange(bad));
        }

        Ok(Self {
            wavelengths,
            values,
        })
    }

    /// A rectangular response of height `value` across `band`
    pub fn top_hat(band: &Band, value: f64) -> Result<Self, ResponseCurveError> {
        // Edges a hair outside the band keep the response flat across the whole band
        let edge = 1e-8;
        Self::from_table(
            vec![
                band.lower_nm - edge,
                band.lower_nm,
                band.upper_nm,
                band.upper_nm + edge,
            ],
            vec![0.0, value, value, 0.0],
        )
    }

    /// Interpolated response at `wavelength_nm`
    pub fn at(&self, wavelength_nm: f64) -> f64 {
        let last = self.wavelengths.len() - 1;
        if !(self.wavelengths[0]..=self.wavelengths[last]).contains(&wavelength_nm) {
            return 0.0;
        }

        // First sample strictly above the wavelength, clamped so the segment stays in range
        let upper = self
            .wavelengths
            .partition_point(|&w| w <= wavelength_nm)
            .clamp(1, last);
        let lower = upper - 1;

        let t = (wavelength_nm - self.wavelengths[lower])
            / (self.wavelengths[upper] - self.wavelengths[lower]);
        self.values[lower] * (1.0 - t) + self.values[upper] * t
    }

    /// Tabulated wavelength range
    pub fn band(&self) -> Band {
        Band::from_nm_bounds(self.wavelengths[0], self.wavelengths[self.wavelengths.len() - 1])
    }

    /// Mean response weighted uniformly in wavelength (trapezoid rule)
    pub fn mean(&self) -> f64 {
        let area: f64 = self
            .wavelengths
            .windows(2)
            .zip(self.values.windows(2))
            .map(|(w, v)| (w[1] - w[0]) * (v[0] + v[1]) / 2.0)
            .sum();
        area / self.band().width()
    }
}

/// Telescope plus atmosphere transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Throughput {
    /// Wavelength-independent transmission
    Uniform(f64),
    /// Tabulated transmission
    Curve(ResponseCurve),
}

impl Throughput {
    pub fn uniform(transmission: f64) -> Result<Self, ResponseCurveError> {
        if !(0.0..=1.0).contains(&transmission) {
            return Err(ResponseCurveError::OutOfRange(transmission));
        }
        Ok(Throughput::Uniform(transmission))
    }

    pub fn at(&self, wavelength_nm: f64) -> f64 {
        match self {
            Throughput::Uniform(transmission) => *transmission,
            Throughput::Curve(curve) => curve.at(wavelength_nm),
        }
    }

    /// Wavelength limits, `None` for a uniform transmission
    pub fn band(&self) -> Option<Band> {
        match self {
            Throughput::Uniform(_) => None,
            Throughput::Curve(curve) => Some(curve.band()),
        }
    }

    /// Representative transmission for reports (the flat value, or the curve mean)
    pub fn nominal(&self) -> f64 {
        match self {
            Throughput::Uniform(transmission) => *transmission,
            Throughput::Curve(curve) => curve.mean(),
        }
    }
}

/// An observing filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bandpass {
    name: String,
    curve: ResponseCurve,
}

impl Bandpass {
    pub fn new(name: impl Into<String>, curve: ResponseCurve) -> Self {
        Self {
            name: name.into(),
            curve,
        }
    }

    /// Ideal filter with unit transmission between `lower_nm` and `upper_nm`
    pub fn top_hat(
        name: impl Into<String>,
        lower_nm: f64,
        upper_nm: f64,
    ) -> Result<Self, ResponseCurveError> {
        if !(lower_nm.is_finite() && upper_nm.is_finite() && lower_nm > 0.0 && lower_nm < upper_nm)
        {
            return Err(ResponseCurveError::NotAscending);
        }
        let curve = ResponseCurve::top_hat(&Band::from_nm_bounds(lower_nm, upper_nm), 1.0)?;
        Ok(Self::new(name, curve))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn at(&self, wavelength_nm: f64) -> f64 {
        self.curve.at(wavelength_nm)
    }

    pub fn band(&self) -> Band {
        self.curve.band()
    }
}

/// Product QE × throughput × bandpass, evaluated lazily
#[derive(Debug, Clone, Copy)]
pub struct CombinedResponse<'a> {
    qe: &'a QuantumEfficiency,
    throughput: &'a Throughput,
    bandpass: &'a Bandpass,
}

impl<'a> CombinedResponse<'a> {
    pub fn new(
        qe: &'a QuantumEfficiency,
        throughput: &'a Throughput,
        bandpass: &'a Bandpass,
    ) -> Self {
        Self {
            qe,
            throughput,
            bandpass,
        }
    }

    /// Wavelengths where all three responses are defined, `None` if disjoint
    pub fn band(&self) -> Option<Band> {
        let band = self.qe.band().intersection(&self.bandpass.band())?;
        match self.throughput.band() {
            Some(throughput_band) => band.intersection(&throughput_band),
            None => Some(band),
        }
    }

    pub fn at(&self, wavelength_nm: f64) -> f64 {
        self.qe.at(wavelength_nm)
            * self.throughput.at(wavelength_nm)
            * self.bandpass.at(wavelength_nm)
    }
}
