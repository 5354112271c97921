use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;
use serde::Deserialize;

use crate::catalog::ClassCatalog;
use crate::detect::backend::Detector;
use crate::detect::result::RawDetection;

/// Replays pre-computed detector output.
///
/// Each `detect` call returns the next queued reply, ignoring the pixels; once
/// the queue is exhausted it returns no detections. Used to feed the analyzer
/// with output produced by an external detector service, and as a test fake.
pub struct ScriptedDetector {
    name: String,
    catalog: ClassCatalog,
    replies: VecDeque<Vec<RawDetection>>,
}

impl ScriptedDetector {
    pub fn new(name: impl Into<String>, catalog: ClassCatalog) -> Self {
        Self {
            name: name.into(),
            catalog,
            replies: VecDeque::new(),
        }
    }

    /// Queue the reply for the next `detect` call.
    pub fn with_reply(mut self, reply: Vec<RawDetection>) -> Self {
        self.replies.push_back(reply);
        self
    }

    pub fn pending(&self) -> usize {
        self.replies.len()
    }
}

impl Detector for ScriptedDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    fn detect(&mut self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        let reply = self.replies.pop_front().unwrap_or_default();
        log::debug!(
            "{}: replaying {} detections for {}x{} image",
            self.name,
            reply.len(),
            image.width(),
            image.height()
        );
        Ok(reply)
    }
}

/// Detector output for one photo, as written by an external detector service.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SideDetections {
    #[serde(default)]
    pub hair: Vec<RawDetection>,
    #[serde(default)]
    pub garment: Vec<RawDetection>,
}

/// Detector output for a front/back pair.
///
/// ```json
/// {
///   "front": {"hair": [...], "garment": [...]},
///   "back":  {"hair": [...], "garment": [...]}
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DetectionScript {
    #[serde(default)]
    pub front: SideDetections,
    #[serde(default)]
    pub back: SideDetections,
}

impl DetectionScript {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read detections {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid detections file {}", path.display()))
    }
}
