//! Appearance profile extraction.
//!
//! This crate reduces the raw output of a hair-style detector, a garment
//! detector and a promptable segmenter, run on a front and a back photo of a
//! person, into one canonical appearance profile: a hair label with its color
//! followed by a deduplicated list of garments with their colors.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! 1. **Mask color** (`color`): average color of a mask's pixels, ignoring
//!    highlights (HSV value >= 200). Never fails; `#000000` means no color.
//! 2. **Normalization** (`detect`): raw boxes -> segmented, labeled, colored
//!    detections. Unsubstantiated boxes are dropped.
//! 3. **Hair fusion** (`hair`): split-model or unified-model strategy.
//! 4. **Garment aggregation** (`garment`): front photo is the source, a back
//!    hoodie overrides all other tops, uncategorized labels are filtered.
//! 5. **Assembly** (`profile`): hair first, then garments in first-seen order.
//!
//! Detectors and the segmenter are injected through the [`Detector`] and
//! [`Segmenter`] traits; [`Analyzer`] wires everything together per request.
//!
//! # Example
//!
//! ```
//! use appearance_profile::{
//!     AnalyzerConfig, Analyzer, BoundingBox, BoxSegmenter, ClassCatalog, DetectorRegistry,
//!     DetectorRole, RawDetection, ScriptedDetector, SharedSegmenter,
//! };
//! use image::{Rgb, RgbImage};
//!
//! # fn main() -> anyhow::Result<()> {
//! let front = RgbImage::from_pixel(8, 8, Rgb([40, 60, 80]));
//! let back = RgbImage::from_pixel(8, 8, Rgb([40, 60, 80]));
//! let whole = BoundingBox::new(0, 0, 8, 8);
//!
//! let detectors = DetectorRegistry::new()
//!     .with(
//!         DetectorRole::HairFront,
//!         ScriptedDetector::new("front", ClassCatalog::hair_fringe())
//!             .with_reply(vec![RawDetection::new(whole, 0.9, 1)]),
//!     )
//!     .with(
//!         DetectorRole::HairBack,
//!         ScriptedDetector::new("back", ClassCatalog::hair_length())
//!             .with_reply(vec![RawDetection::new(whole, 0.8, 2)]),
//!     )
//!     .with(
//!         DetectorRole::Garment,
//!         ScriptedDetector::new("garment", ClassCatalog::garments()),
//!     );
//!
//! let analyzer = Analyzer::new(
//!     &AnalyzerConfig::default(),
//!     detectors,
//!     SharedSegmenter::new(BoxSegmenter::new()),
//! )?;
//! let result = analyzer.analyze(&front, &back)?;
//! assert_eq!(result.to_text(), "Label: no_bang_long, Color: #283c50\n");
//! # Ok(())
//! # }
//! ```

pub mod analyze;
pub mod catalog;
pub mod color;
pub mod config;
pub mod detect;
pub mod error;
pub mod garment;
pub mod hair;
pub mod mask;
pub mod profile;

pub use analyze::{load_image, AnalysisPaths, Analyzer};
pub use catalog::{Category, ClassCatalog, ClassEntry};
pub use color::{extract_dominant_color, HexColor};
pub use config::{AnalyzerConfig, Catalogs};
pub use detect::{
    normalize_detections, BoundingBox, BoxSegmenter, Detection, DetectionScript, Detector,
    DetectorRegistry, DetectorRole, RawDetection, ScriptedDetector, Segmenter, SegmenterSession,
    SharedSegmenter,
};
pub use error::{AnalysisError, Side};
pub use garment::{GarmentAggregator, GarmentProfile};
pub use hair::{FringeMarker, HairMode, HairProfile, HairResolver};
pub use mask::BinaryMask;
pub use profile::{assemble, AppearanceResult, ProfileEntry};
