use anyhow::Result;
use image::RgbImage;

use crate::detect::backend::Segmenter;
use crate::detect::result::BoundingBox;
use crate::mask::BinaryMask;

/// Segmenter that returns the prompt box itself as the mask.
///
/// Stands in for a promptable segmentation model when none is available; the
/// color estimate then covers the whole box instead of the object outline.
#[derive(Default)]
pub struct BoxSegmenter {
    primed: Option<(u32, u32)>,
}

impl BoxSegmenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Segmenter for BoxSegmenter {
    fn name(&self) -> &str {
        "box"
    }

    fn prime(&mut self, image: &RgbImage) -> Result<()> {
        self.primed = Some(image.dimensions());
        Ok(())
    }

    fn predict_single(&mut self, bbox: BoundingBox) -> Result<Option<BinaryMask>> {
        let Some((width, height)) = self.primed else {
            return Err(anyhow::anyhow!("box segmenter used before prime"));
        };
        let Some(bbox) = bbox.clamp_to(width, height) else {
            return Ok(None);
        };
        Ok(Some(BinaryMask::from_fn(width, height, |x, y| {
            bbox.contains(x, y)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_segmenter_masks_the_prompt_box() {
        let mut segmenter = BoxSegmenter::new();
        assert!(segmenter.predict_single(BoundingBox::new(0, 0, 1, 1)).is_err());

        segmenter.prime(&RgbImage::new(6, 4)).unwrap();
        let mask = segmenter
            .predict_single(BoundingBox::new(1, 1, 3, 10))
            .unwrap()
            .expect("mask");
        assert_eq!((mask.width(), mask.height()), (6, 4));
        assert_eq!(mask.count(), 6);
        assert!(mask.get(2, 3));
        assert!(!mask.get(3, 1));

        assert!(segmenter
            .predict_single(BoundingBox::new(7, 0, 9, 2))
            .unwrap()
            .is_none());
    }
}
