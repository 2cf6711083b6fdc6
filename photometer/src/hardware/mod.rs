//! Hardware module for telescope, detector and diffuser configurations

pub mod detector;
pub mod diffuser;
pub mod telescope;

pub use detector::DetectorConfig;
pub use diffuser::{Diffuser, DiffuserGeometry};
pub use telescope::TelescopeConfig;
