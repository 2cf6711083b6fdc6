//! Photometry models and utilities

pub mod filters;
pub mod flux;
pub mod photoconversion;
pub mod quantum_efficiency;
pub mod response;
pub mod spectrum;
pub mod stellar;

pub use filters::FilterCatalog;
pub use flux::{FluxCalculator, FluxError, SyntheticFluxCalculator};
pub use quantum_efficiency::QuantumEfficiency;
pub use response::{Bandpass, CombinedResponse, ResponseCurve, Throughput};
pub use spectrum::{Band, Spectrum};
pub use stellar::FlatStellarSpectrum;
