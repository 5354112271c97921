mod box_mask;
mod scripted;

pub use box_mask::BoxSegmenter;
pub use scripted::{DetectionScript, ScriptedDetector, SideDetections};
