use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::catalog::ClassCatalog;
use crate::garment::DEFAULT_OVERRIDE_LABEL;
use crate::hair::{FringeMarker, HairMode};

const DEFAULT_HAIR_THRESHOLD: f32 = 0.2;
const DEFAULT_GARMENT_THRESHOLD: f32 = 0.3;
const DEFAULT_PICTURES_DIR: &str = "Pictures";

#[derive(Debug, Deserialize, Default)]
struct AnalyzerConfigFile {
    pictures_dir: Option<PathBuf>,
    color_back_from_front: Option<bool>,
    hair: Option<HairConfigFile>,
    garment: Option<GarmentConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct HairConfigFile {
    mode: Option<HairMode>,
    threshold: Option<f32>,
    fringe_marker: Option<String>,
    negation_prefix: Option<String>,
    front_catalog: Option<PathBuf>,
    back_catalog: Option<PathBuf>,
    catalog: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct GarmentConfigFile {
    threshold: Option<f32>,
    override_label: Option<String>,
    catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Root of the per-analysis picture directories.
    pub pictures_dir: PathBuf,
    /// Color back-photo detections from the front photo's pixels.
    pub color_back_from_front: bool,
    pub hair: HairSettings,
    pub garment: GarmentSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HairSettings {
    pub mode: HairMode,
    pub threshold: f32,
    pub marker: FringeMarker,
    /// Class table of the split-mode front (fringe) detector.
    pub front_catalog: Option<PathBuf>,
    /// Class table of the split-mode back (length) detector.
    pub back_catalog: Option<PathBuf>,
    /// Class table of the unified-mode detector.
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GarmentSettings {
    pub threshold: f32,
    pub override_label: String,
    pub catalog: Option<PathBuf>,
}

/// Class tables for every detector role.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub hair_front: ClassCatalog,
    pub hair_back: ClassCatalog,
    pub hair: ClassCatalog,
    pub garment: ClassCatalog,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        // Defaults are infallible.
        Self::from_file(AnalyzerConfigFile::default())
    }
}

impl AnalyzerConfig {
    /// Load from `APPEARANCE_CONFIG` (if set), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("APPEARANCE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit file, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::from_file(read_config_file(path)?);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AnalyzerConfigFile) -> Self {
        let hair = file.hair.unwrap_or_default();
        let garment = file.garment.unwrap_or_default();
        let default_marker = FringeMarker::default();
        Self {
            pictures_dir: file
                .pictures_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PICTURES_DIR)),
            color_back_from_front: file.color_back_from_front.unwrap_or(true),
            hair: HairSettings {
                mode: hair.mode.unwrap_or_default(),
                threshold: hair.threshold.unwrap_or(DEFAULT_HAIR_THRESHOLD),
                marker: FringeMarker {
                    marker: hair.fringe_marker.unwrap_or(default_marker.marker),
                    negation_prefix: hair
                        .negation_prefix
                        .unwrap_or(default_marker.negation_prefix),
                },
                front_catalog: hair.front_catalog,
                back_catalog: hair.back_catalog,
                catalog: hair.catalog,
            },
            garment: GarmentSettings {
                threshold: garment.threshold.unwrap_or(DEFAULT_GARMENT_THRESHOLD),
                override_label: garment
                    .override_label
                    .unwrap_or_else(|| DEFAULT_OVERRIDE_LABEL.to_string()),
                catalog: garment.catalog,
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(mode) = std::env::var("APPEARANCE_HAIR_MODE") {
            if !mode.trim().is_empty() {
                self.hair.mode = mode.parse()?;
            }
        }
        if let Ok(threshold) = std::env::var("APPEARANCE_HAIR_THRESHOLD") {
            self.hair.threshold = parse_threshold("APPEARANCE_HAIR_THRESHOLD", &threshold)?;
        }
        if let Ok(threshold) = std::env::var("APPEARANCE_GARMENT_THRESHOLD") {
            self.garment.threshold = parse_threshold("APPEARANCE_GARMENT_THRESHOLD", &threshold)?;
        }
        if let Ok(dir) = std::env::var("APPEARANCE_PICTURES_DIR") {
            if !dir.trim().is_empty() {
                self.pictures_dir = PathBuf::from(dir);
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        for (name, threshold) in [
            ("hair", self.hair.threshold),
            ("garment", self.garment.threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(anyhow!(
                    "{} threshold must be within [0, 1], got {}",
                    name,
                    threshold
                ));
            }
        }
        self.hair.marker.marker = self.hair.marker.marker.trim().to_string();
        if self.hair.marker.marker.is_empty() {
            return Err(anyhow!("hair fringe marker must not be empty"));
        }
        self.hair.marker.negation_prefix = self.hair.marker.negation_prefix.trim().to_string();
        if self.hair.marker.negation_prefix.is_empty() {
            return Err(anyhow!("hair negation prefix must not be empty"));
        }
        self.garment.override_label = self.garment.override_label.trim().to_string();
        if self.garment.override_label.is_empty() {
            return Err(anyhow!("garment override label must not be empty"));
        }
        Ok(())
    }

    /// Load every configured class table, falling back to the built-in ones.
    pub fn load_catalogs(&self) -> Result<Catalogs> {
        let load = |path: &Option<PathBuf>, fallback: fn() -> ClassCatalog| match path {
            Some(path) => ClassCatalog::load(path),
            None => Ok(fallback()),
        };
        Ok(Catalogs {
            hair_front: load(&self.hair.front_catalog, ClassCatalog::hair_fringe)?,
            hair_back: load(&self.hair.back_catalog, ClassCatalog::hair_length)?,
            hair: load(&self.hair.catalog, ClassCatalog::hair_unified)?,
            garment: load(&self.garment.catalog, ClassCatalog::garments)?,
        })
    }
}

fn read_config_file(path: &Path) -> Result<AnalyzerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn parse_threshold(var: &str, value: &str) -> Result<f32> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a number between 0 and 1", var))
}
