use std::path::PathBuf;

use thiserror::Error;

use crate::detect::DetectorRole;

/// Which photo of the pair an input refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Front => f.write_str("front"),
            Side::Back => f.write_str("back"),
        }
    }
}

// Fatal analysis errors. Everything else degrades locally (dropped
// detections, black color sentinel, absent hair).

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{side} image missing or unreadable: {path}: {source}")]
    MissingInput {
        side: Side,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no detector registered for role {0}")]
    MissingDetector(DetectorRole),
}
