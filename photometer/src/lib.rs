//! Diffuser-assisted photometric precision and cadence estimation
//!
//! This crate predicts how long a ground-based telescope can expose on a
//! star spread into a top-hat by an engineered diffuser before its pixels
//! reach a target level, and what photometric precision and cadence that
//! exposure delivers once shot, sky, dark, read, digitization and
//! scintillation noise are accounted for.

pub mod cadence;
pub mod error;
pub mod exposure;
pub mod hardware;
pub mod noise;
pub mod photometry;
pub mod report;
pub mod units;

// Re-exports for easier access
pub use cadence::{
    evaluate, ApertureGeometry, CadenceEngine, CadenceResult, NoiseBudget, ObservationRequest,
    ObservationSettings,
};
pub use error::{PhotometryError, Result};
pub use exposure::max_exposure_time;
pub use hardware::diffuser::{Diffuser, DiffuserGeometry};
pub use hardware::telescope::TelescopeConfig;
pub use hardware::DetectorConfig;
pub use noise::{photometric_noise, scintillation_noise, ScintillationOptions};
pub use photometry::flux::{FluxCalculator, FluxError, SyntheticFluxCalculator};
pub use photometry::quantum_efficiency::QuantumEfficiency;
pub use photometry::response::{Bandpass, Throughput};
pub use photometry::spectrum::{Spectrum, CGS};
pub use photometry::FilterCatalog;
