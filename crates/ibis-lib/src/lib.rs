pub mod artifacts;
pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod signal;
pub mod synth;

pub use artifacts::*;
pub use config::{CorrectionConfig, IbisConfig};
pub use detectors::*;
pub use error::PeakError;
pub use metrics::*;
pub use signal::*;
