//! Raw detections + masks -> labeled, colored detections.

use anyhow::{bail, Result};
use image::RgbImage;

use crate::catalog::ClassCatalog;
use crate::color::extract_dominant_color;

use super::result::{Detection, RawDetection};
use super::segmenter::SegmenterSession;

/// Segment and color every raw detection of one image.
///
/// `session` must be primed on the image the boxes came from; a size mismatch
/// is an error. Colors are read
/// from `color_from` when given (for example the front photo for a detection
/// found in the back photo), otherwise from the primed image itself.
///
/// Detections are dropped, not reported, when their class is unknown, their
/// box falls outside the image, or segmentation yields no pixels. Output order
/// follows `raw`.
pub fn normalize_detections(
    image: &RgbImage,
    raw: &[RawDetection],
    catalog: &ClassCatalog,
    session: &mut SegmenterSession<'_>,
    color_from: Option<&RgbImage>,
) -> Result<Vec<Detection>> {
    if (session.width(), session.height()) != image.dimensions() {
        bail!(
            "segmenter primed on a {}x{} image, detections are for {}x{}",
            session.width(),
            session.height(),
            image.width(),
            image.height()
        );
    }
    let color_source = match color_from {
        Some(other) if other.dimensions() == image.dimensions() => other,
        Some(other) => {
            log::warn!(
                "color source {}x{} does not match image {}x{}; coloring from the image itself",
                other.width(),
                other.height(),
                image.width(),
                image.height()
            );
            image
        }
        None => image,
    };

    let mut detections = Vec::with_capacity(raw.len());
    for det in raw {
        let Some(label) = catalog.label(det.class_id) else {
            log::warn!("dropping detection with unknown class id {}", det.class_id);
            continue;
        };
        let Some(bbox) = det.bbox.clamp_to(session.width(), session.height()) else {
            log::debug!("dropping {} with box outside the image: {:?}", label, det.bbox);
            continue;
        };
        let mask = match session.predict(bbox)? {
            Some(mask) if !mask.is_empty() => mask,
            _ => {
                log::debug!("dropping {} at {:?}: empty mask", label, bbox);
                continue;
            }
        };

        let color = extract_dominant_color(color_source, &mask);
        log::debug!(
            "{} conf={:.3} color={} ({} px)",
            label,
            det.confidence,
            color,
            mask.count()
        );
        detections.push(Detection::new(label, color, det.confidence, det.class_id));
    }
    Ok(detections)
}
