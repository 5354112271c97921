use std::fmt;

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::catalog::ClassCatalog;
use crate::mask::BinaryMask;

use super::result::{BoundingBox, RawDetection};

/// The job a detector performs in an analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorRole {
    /// Fringe / no-fringe detector run on the front image (split mode).
    HairFront,
    /// Hair length detector run on the back image (split mode).
    HairBack,
    /// Single hair detector run on both images (unified mode).
    Hair,
    /// Garment detector run on both images.
    Garment,
}

impl fmt::Display for DetectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorRole::HairFront => "hair_front",
            DetectorRole::HairBack => "hair_back",
            DetectorRole::Hair => "hair",
            DetectorRole::Garment => "garment",
        };
        f.write_str(name)
    }
}

/// Object detector collaborator.
///
/// Implementations wrap an external model or service. They receive the image
/// read-only and return boxes in the model's own output order; confidence
/// thresholds are applied by the caller.
pub trait Detector: Send {
    /// Detector identifier, used in logs.
    fn name(&self) -> &str;

    /// Class table for the ids this detector emits.
    fn catalog(&self) -> &ClassCatalog;

    /// Run detection on one image.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<RawDetection>>;
}

/// Promptable segmentation collaborator.
///
/// Segmenters are stateful: `prime` prepares the image embedding and every
/// following `predict_single` call refers to that image. Callers should go
/// through [`SegmenterSession`](super::SegmenterSession), which pairs the two.
pub trait Segmenter: Send {
    fn name(&self) -> &str;

    /// Prepare the segmenter for `image`.
    fn prime(&mut self, image: &RgbImage) -> Result<()>;

    /// Best single mask for a box prompt, or `None` when no candidate exists.
    fn predict_single(&mut self, bbox: BoundingBox) -> Result<Option<BinaryMask>>;
}
