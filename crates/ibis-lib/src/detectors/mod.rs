//! Extrema detectors that turn a raw biosignal into peak indices.
//!
//! These feed the artifact corrector but are independent of it: every
//! detector returns sorted, de-duplicated sample indices and nothing else.

pub mod ecg;
pub mod filters;
pub mod ppg;
pub mod resp;

use crate::config::IbisConfig;
use crate::signal::{Events, TimeSeries};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use ecg::{detect_r_peaks, EcgDetectorConfig};
pub use ppg::{detect_systolic_peaks, PpgDetectorConfig};
pub use resp::{detect_breaths, detect_extrema, RespDetectorConfig, RespExtrema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Ecg,
    Ppg,
    Resp,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modality::Ecg => "ecg",
            Modality::Ppg => "ppg",
            Modality::Resp => "resp",
        };
        f.write_str(name)
    }
}

/// A configured detector for one modality.
#[derive(Debug, Clone, Copy)]
pub enum Detector {
    Ecg(EcgDetectorConfig),
    Ppg(PpgDetectorConfig),
    Resp(RespDetectorConfig),
}

impl Detector {
    pub fn for_modality(modality: Modality, config: &IbisConfig) -> Self {
        match modality {
            Modality::Ecg => Detector::Ecg(config.ecg),
            Modality::Ppg => Detector::Ppg(config.ppg),
            Modality::Resp => Detector::Resp(config.resp),
        }
    }

    pub fn modality(&self) -> Modality {
        match self {
            Detector::Ecg(_) => Modality::Ecg,
            Detector::Ppg(_) => Modality::Ppg,
            Detector::Resp(_) => Modality::Resp,
        }
    }

    pub fn detect(&self, ts: &TimeSeries) -> Events {
        let mut events = match self {
            Detector::Ecg(cfg) => detect_r_peaks(ts, cfg),
            Detector::Ppg(cfg) => detect_systolic_peaks(ts, cfg),
            Detector::Resp(cfg) => detect_breaths(ts, cfg),
        };
        events.indices.sort_unstable();
        events.indices.dedup();
        log::debug!(
            "{} detector found {} extrema in {:.1} s",
            self.modality(),
            events.len(),
            ts.duration()
        );
        events
    }
}
