mod backend;
pub mod backends;
mod normalize;
mod registry;
mod result;
mod segmenter;

pub use backend::{Detector, DetectorRole, Segmenter};
pub use backends::{BoxSegmenter, DetectionScript, ScriptedDetector, SideDetections};
pub use normalize::normalize_detections;
pub use registry::DetectorRegistry;
pub use result::{best_by_confidence, BoundingBox, Detection, RawDetection};
pub use segmenter::{SegmenterSession, SharedSegmenter};
