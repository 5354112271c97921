use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use image::RgbImage;

use crate::mask::BinaryMask;

use super::backend::Segmenter;
use super::result::BoundingBox;

/// A segmenter that has been primed on one image.
///
/// Masks can only be requested through a session, and a session can only be
/// built by priming, so predictions always refer to the image they were
/// primed on.
pub struct SegmenterSession<'a> {
    segmenter: &'a mut dyn Segmenter,
    width: u32,
    height: u32,
}

impl<'a> SegmenterSession<'a> {
    pub fn prime(segmenter: &'a mut dyn Segmenter, image: &RgbImage) -> Result<Self> {
        segmenter.prime(image)?;
        Ok(Self {
            segmenter,
            width: image.width(),
            height: image.height(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Single best mask for a box prompt.
    pub fn predict(&mut self, bbox: BoundingBox) -> Result<Option<BinaryMask>> {
        self.segmenter.predict_single(bbox)
    }
}

/// A segmenter shared between concurrent analyses.
///
/// The lock is held for a whole prime + predict sequence so two analyses
/// never interleave on the same underlying model.
#[derive(Clone)]
pub struct SharedSegmenter {
    inner: Arc<Mutex<dyn Segmenter>>,
}

impl SharedSegmenter {
    pub fn new<S: Segmenter + 'static>(segmenter: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(segmenter)),
        }
    }

    pub fn name(&self) -> Result<String> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("segmenter lock poisoned"))?;
        Ok(guard.name().to_string())
    }

    /// Prime on `image` and run `f` with exclusive access to the session.
    pub fn with_session<T>(
        &self,
        image: &RgbImage,
        f: impl FnOnce(&mut SegmenterSession<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("segmenter lock poisoned"))?;
        let mut session = SegmenterSession::prime(&mut *guard, image)?;
        f(&mut session)
    }
}
