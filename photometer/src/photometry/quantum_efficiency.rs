//! Quantum efficiency modeling for the science detector

use serde::{Deserialize, Serialize};

use super::response::{ResponseCurve, ResponseCurveError};
use super::Band;

/// Detector quantum efficiency as a function of wavelength.
///
/// The flux calculator treats it as one factor of the combined response;
/// the exposure and noise models never look inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantumEfficiency(ResponseCurve);

impl QuantumEfficiency {
    /// Constant efficiency across `band`, zero elsewhere
    pub fn from_notch(band: &Band, efficiency: f64) -> Result<Self, ResponseCurveError> {
        ResponseCurve::top_hat(band, efficiency).map(Self)
    }

    /// Tabulated efficiency; wavelengths in nm, ascending, values in [0, 1]
    pub fn from_table(
        wavelengths: Vec<f64>,
        efficiencies: Vec<f64>,
    ) -> Result<Self, ResponseCurveError> {
        ResponseCurve::from_table(wavelengths, efficiencies).map(Self)
    }

    pub fn at(&self, wavelength_nm: f64) -> f64 {
        self.0.at(wavelength_nm)
    }

    pub fn band(&self) -> Band {
        self.0.band()
    }

    /// Mean efficiency over the tabulated range
    pub fn mean(&self) -> f64 {
        self.0.mean()
    }
}

impl From<ResponseCurve> for QuantumEfficiency {
    fn from(curve: ResponseCurve) -> Self {
        Self(curve)
    }
}
