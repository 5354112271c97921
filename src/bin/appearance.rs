//! appearance - build the appearance profile of one front/back photo pair
//!
//! Detector output is read from a JSON file produced by the external detector
//! service (see `DetectionScript`); segmentation falls back to box masks.
//! The flat text record is written to `results/result.txt` next to the photos.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use appearance_profile::{
    AnalysisPaths, Analyzer, AnalyzerConfig, BoxSegmenter, Catalogs, DetectionScript,
    DetectorRegistry, DetectorRole, HairMode, ScriptedDetector, SharedSegmenter,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "APPEARANCE_CONFIG")]
    config: Option<PathBuf>,
    /// Analysis id; photos are read from <pictures-dir>/<id>/<id>_f.jpg and _b.jpg.
    #[arg(long, conflicts_with_all = ["front", "back"])]
    analysis_id: Option<String>,
    /// Front photo path.
    #[arg(long, requires = "back")]
    front: Option<PathBuf>,
    /// Back photo path.
    #[arg(long, requires = "front")]
    back: Option<PathBuf>,
    /// Override the pictures directory from the config.
    #[arg(long)]
    pictures_dir: Option<PathBuf>,
    /// Detector output for the pair (JSON).
    #[arg(long)]
    detections: PathBuf,
    /// Override the hair mode (split|unified).
    #[arg(long)]
    hair_mode: Option<HairMode>,
    /// Directory for result.txt (defaults to a results/ dir beside the photos).
    #[arg(long)]
    results_dir: Option<PathBuf>,
    /// Also write the JSON response to this path.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => AnalyzerConfig::load_from(path)?,
        None => AnalyzerConfig::load()?,
    };
    if let Some(dir) = args.pictures_dir.clone() {
        cfg.pictures_dir = dir;
    }
    if let Some(mode) = args.hair_mode {
        cfg.hair.mode = mode;
    }

    let paths = resolve_paths(&args, &cfg)?;
    log::info!(
        "analyzing front={} back={} (hair mode {})",
        paths.front.display(),
        paths.back.display(),
        cfg.hair.mode
    );

    let script = DetectionScript::load(&args.detections)?;
    let catalogs = cfg.load_catalogs()?;
    let detectors = replay_registry(cfg.hair.mode, script, catalogs);
    let analyzer = Analyzer::new(&cfg, detectors, SharedSegmenter::new(BoxSegmenter::new()))?;

    let result = analyzer.analyze_files(&paths.front, &paths.back)?;

    let record = result.write_text_record(&paths.results_dir)?;
    log::info!("result written to {}", record.display());
    if let Some(json_path) = &args.json {
        std::fs::write(json_path, result.to_json()?)
            .map_err(|e| anyhow!("failed to write {}: {}", json_path.display(), e))?;
        log::info!("json response written to {}", json_path.display());
    }
    print!("{}", result.to_text());
    Ok(())
}

fn resolve_paths(args: &Args, cfg: &AnalyzerConfig) -> Result<AnalysisPaths> {
    let mut paths = match (&args.analysis_id, &args.front, &args.back) {
        (Some(id), _, _) => AnalysisPaths::for_id(&cfg.pictures_dir, id),
        (None, Some(front), Some(back)) => {
            let results_dir = front
                .parent()
                .map(|dir| dir.join("results"))
                .unwrap_or_else(|| PathBuf::from("results"));
            AnalysisPaths {
                front: front.clone(),
                back: back.clone(),
                results_dir,
            }
        }
        _ => return Err(anyhow!("pass either --analysis-id or both --front and --back")),
    };
    if let Some(dir) = &args.results_dir {
        paths.results_dir = dir.clone();
    }
    Ok(paths)
}

/// Detectors that replay the script in the order the analyzer calls them:
/// front image first, then back.
fn replay_registry(mode: HairMode, script: DetectionScript, catalogs: Catalogs) -> DetectorRegistry {
    let registry = DetectorRegistry::new().with(
        DetectorRole::Garment,
        ScriptedDetector::new("garment", catalogs.garment)
            .with_reply(script.front.garment)
            .with_reply(script.back.garment),
    );
    match mode {
        HairMode::Split => registry
            .with(
                DetectorRole::HairFront,
                ScriptedDetector::new("hair_front", catalogs.hair_front)
                    .with_reply(script.front.hair),
            )
            .with(
                DetectorRole::HairBack,
                ScriptedDetector::new("hair_back", catalogs.hair_back).with_reply(script.back.hair),
            ),
        HairMode::Unified => registry.with(
            DetectorRole::Hair,
            ScriptedDetector::new("hair", catalogs.hair)
                .with_reply(script.front.hair)
                .with_reply(script.back.hair),
        ),
    }
}
