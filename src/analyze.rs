//! Per-request analysis pipeline.
//!
//! For one front/back photo pair the analyzer runs every detector role,
//! segments and colors each box, fuses the hair picks, aggregates garments and
//! assembles the ordered result. Only unreadable input images are fatal.

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{ImageReader, RgbImage};

use crate::config::AnalyzerConfig;
use crate::detect::{
    normalize_detections, Detection, DetectorRegistry, DetectorRole, SharedSegmenter,
};
use crate::error::{AnalysisError, Side};
use crate::garment::GarmentAggregator;
use crate::hair::{HairMode, HairResolver};
use crate::profile::{assemble, AppearanceResult};

/// Load a photo as 8-bit RGB. The format is sniffed from the content, so an
/// upload saved under the wrong extension still decodes.
pub fn load_image(side: Side, path: &Path) -> Result<RgbImage, AnalysisError> {
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|source| AnalysisError::MissingInput {
            side,
            path: path.to_path_buf(),
            source,
        })?;
    Ok(image.to_rgb8())
}

/// File layout of one analysis inside the pictures directory:
/// `<dir>/<id>/<id>_f.jpg`, `<dir>/<id>/<id>_b.jpg`, results in
/// `<dir>/<id>/results/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisPaths {
    pub front: PathBuf,
    pub back: PathBuf,
    pub results_dir: PathBuf,
}

impl AnalysisPaths {
    pub fn for_id(pictures_dir: &Path, analysis_id: &str) -> Self {
        let dir = pictures_dir.join(analysis_id);
        Self {
            front: dir.join(format!("{}_f.jpg", analysis_id)),
            back: dir.join(format!("{}_b.jpg", analysis_id)),
            results_dir: dir.join("results"),
        }
    }
}

pub struct Analyzer {
    detectors: DetectorRegistry,
    segmenter: SharedSegmenter,
    hair: HairResolver,
    garments: GarmentAggregator,
    hair_threshold: f32,
    garment_threshold: f32,
    color_back_from_front: bool,
}

impl Analyzer {
    /// Build an analyzer, checking that every role the configured hair mode
    /// needs has a detector.
    pub fn new(
        config: &AnalyzerConfig,
        detectors: DetectorRegistry,
        segmenter: SharedSegmenter,
    ) -> Result<Self> {
        detectors.require(&required_roles(config.hair.mode))?;
        let garments = GarmentAggregator::new(config.garment.override_label.clone());
        log::info!(
            "analyzer ready: hair mode {}, detectors [{}], segmenter {}, override label {}",
            config.hair.mode,
            detectors
                .roles()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            segmenter.name()?,
            garments.override_label()
        );
        Ok(Self {
            detectors,
            segmenter,
            hair: HairResolver::new(config.hair.mode, config.hair.marker.clone()),
            garments,
            hair_threshold: config.hair.threshold,
            garment_threshold: config.garment.threshold,
            color_back_from_front: config.color_back_from_front,
        })
    }

    /// Analyze a pair of photos on disk.
    pub fn analyze_files(&self, front: &Path, back: &Path) -> Result<AppearanceResult> {
        let front = load_image(Side::Front, front)?;
        let back = load_image(Side::Back, back)?;
        self.analyze(&front, &back)
    }

    /// Analyze a decoded photo pair.
    pub fn analyze(&self, front: &RgbImage, back: &RgbImage) -> Result<AppearanceResult> {
        let back_color = self.color_back_from_front.then_some(front);

        let (front_hair, back_hair) = match self.hair.mode() {
            HairMode::Split => (
                self.detect(DetectorRole::HairFront, front, None, self.hair_threshold)?,
                self.detect(DetectorRole::HairBack, back, back_color, self.hair_threshold)?,
            ),
            HairMode::Unified => (
                self.detect(DetectorRole::Hair, front, None, self.hair_threshold)?,
                self.detect(DetectorRole::Hair, back, None, self.hair_threshold)?,
            ),
        };
        let hair = self.hair.resolve(&front_hair, &back_hair);

        let front_garments =
            self.detect(DetectorRole::Garment, front, None, self.garment_threshold)?;
        let back_garments =
            self.detect(DetectorRole::Garment, back, back_color, self.garment_threshold)?;
        let garments = self
            .detectors
            .with_detector(DetectorRole::Garment, |detector| {
                Ok(self
                    .garments
                    .aggregate(&front_garments, &back_garments, detector.catalog()))
            })?;

        let result = assemble(hair, &garments);
        log::info!("appearance profile: {} entries", result.len());
        Ok(result)
    }

    fn detect(
        &self,
        role: DetectorRole,
        image: &RgbImage,
        color_from: Option<&RgbImage>,
        threshold: f32,
    ) -> Result<Vec<Detection>> {
        self.detectors.with_detector(role, |detector| {
            let mut raw = detector.detect(image)?;
            let total = raw.len();
            raw.retain(|det| det.confidence > threshold);
            log::debug!(
                "{} ({}): {} of {} boxes above {:.2}",
                role,
                detector.name(),
                raw.len(),
                total,
                threshold
            );
            if raw.is_empty() {
                return Ok(Vec::new());
            }
            let catalog = detector.catalog();
            self.segmenter.with_session(image, |session| {
                normalize_detections(image, &raw, catalog, session, color_from)
            })
        })
    }
}

fn required_roles(mode: HairMode) -> Vec<DetectorRole> {
    match mode {
        HairMode::Split => vec![
            DetectorRole::HairFront,
            DetectorRole::HairBack,
            DetectorRole::Garment,
        ],
        HairMode::Unified => vec![DetectorRole::Hair, DetectorRole::Garment],
    }
}
