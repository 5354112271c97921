use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Axis-aligned pixel rectangle `(x0, y0)..(x1, y1)`, exclusive on the max edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Clamp to a `width x height` image. Returns `None` when nothing remains.
    pub fn clamp_to(self, width: u32, height: u32) -> Option<Self> {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        let clamped = Self {
            x0: self.x0.clamp(0, w),
            y0: self.y0.clamp(0, h),
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
        };
        (clamped.x1 > clamped.x0 && clamped.y1 > clamped.y0).then_some(clamped)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.x0 as i64 && x < self.x1 as i64 && y >= self.y0 as i64 && y < self.y1 as i64
    }
}

/// One box as emitted by a detector, before segmentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub class_id: u32,
}

impl RawDetection {
    pub fn new(bbox: BoundingBox, confidence: f32, class_id: u32) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }
}

/// A labeled, colored detection that survived segmentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub color: HexColor,
    pub confidence: f32,
    pub class_id: u32,
}

impl Detection {
    pub fn new(label: impl Into<String>, color: HexColor, confidence: f32, class_id: u32) -> Self {
        Self {
            label: label.into(),
            color,
            confidence,
            class_id,
        }
    }
}

/// Highest-confidence detection; ties keep the earliest one.
pub fn best_by_confidence<'a, I>(detections: I) -> Option<&'a Detection>
where
    I: IntoIterator<Item = &'a Detection>,
{
    detections.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.confidence >= candidate.confidence => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_trims_and_rejects_empty_boxes() {
        let bbox = BoundingBox::new(-5, 2, 50, 8);
        assert_eq!(bbox.clamp_to(10, 10), Some(BoundingBox::new(0, 2, 10, 8)));
        assert_eq!(BoundingBox::new(12, 0, 20, 5).clamp_to(10, 10), None);
        assert_eq!(BoundingBox::new(3, 3, 3, 9).clamp_to(10, 10), None);
    }

    #[test]
    fn best_by_confidence_keeps_first_on_tie() {
        let dets = vec![
            Detection::new("a", HexColor::BLACK, 0.5, 0),
            Detection::new("b", HexColor::BLACK, 0.7, 1),
            Detection::new("c", HexColor::BLACK, 0.7, 2),
        ];
        assert_eq!(best_by_confidence(&dets).map(|d| d.label.as_str()), Some("b"));
        assert!(best_by_confidence(&Vec::<Detection>::new()).is_none());
    }

    #[test]
    fn raw_detection_uses_box_key() {
        let raw: RawDetection = serde_json::from_str(
            r#"{"box": {"x0": 1, "y0": 2, "x1": 3, "y1": 4}, "confidence": 0.5, "class_id": 7}"#,
        )
        .unwrap();
        assert_eq!(raw.bbox, BoundingBox::new(1, 2, 3, 4));
        assert_eq!(raw.class_id, 7);
    }
}
