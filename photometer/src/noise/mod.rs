//! Per-exposure noise models

pub mod photometric;
pub mod scintillation;

pub use photometric::{photometric_noise, NoiseTerms, DIGITIZATION_NOISE_ADU};
pub use scintillation::{scintillation_noise, ScintillationOptions};
