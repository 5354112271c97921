//! Final appearance result and its serialized forms.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::garment::GarmentProfile;
use crate::hair::HairProfile;

/// File name of the flat text record inside a results directory.
pub const RESULT_FILE_NAME: &str = "result.txt";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub label: String,
    pub color: HexColor,
}

/// Ordered appearance profile: hair first when present, then garments in
/// first-seen order. Immutable once assembled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceResult {
    results: Vec<ProfileEntry>,
}

impl AppearanceResult {
    pub fn entries(&self) -> &[ProfileEntry] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// One `Label: …, Color: …` line per entry.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.results {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "Label: {}, Color: {}", entry.label, entry.color);
        }
        out
    }

    /// `{"results": [{"label": …, "color": …}, …]}`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the text record to `dir/result.txt`, creating `dir` if needed.
    pub fn write_text_record(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create results dir {}", dir.display()))?;
        let path = dir.join(RESULT_FILE_NAME);
        std::fs::write(&path, self.to_text())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Combine the hair and garment profiles into the final ordered result.
pub fn assemble(hair: Option<HairProfile>, garments: &GarmentProfile) -> AppearanceResult {
    let mut results = Vec::with_capacity(garments.len() + 1);
    if let Some(hair) = hair {
        results.push(ProfileEntry {
            label: hair.label,
            color: hair.color,
        });
    }
    results.extend(garments.iter().map(|(label, color)| ProfileEntry {
        label: label.to_string(),
        color,
    }));
    AppearanceResult { results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ClassCatalog;
    use crate::detect::Detection;
    use crate::garment::GarmentAggregator;

    fn garments() -> GarmentProfile {
        let catalog = ClassCatalog::garments();
        let det = |label: &str, color: &str| {
            Detection::new(label, color.parse().unwrap(), 0.5, catalog.id_of(label).unwrap())
        };
        GarmentAggregator::default().aggregate(
            &[det("jacket", "#abcdef"), det("pants_long", "#0000ff")],
            &[det("hoodie", "#000011")],
            &catalog,
        )
    }

    #[test]
    fn hair_first_then_garments_in_order() {
        let hair = HairProfile {
            label: "no_bang_long".into(),
            color: "#112233".parse().unwrap(),
        };
        let result = assemble(Some(hair), &garments());
        let labels: Vec<_> = result.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["no_bang_long", "jacket", "pants_long", "hoodie"]);
    }

    #[test]
    fn no_hair_means_garments_only() {
        let result = assemble(None, &garments());
        assert_eq!(result.len(), 3);
        assert_eq!(result.entries()[0].label, "jacket");
    }

    #[test]
    fn text_and_json_forms() {
        let hair = HairProfile {
            label: "bang_short".into(),
            color: "#010203".parse().unwrap(),
        };
        let result = assemble(Some(hair), &GarmentProfile::default());
        assert_eq!(result.to_text(), "Label: bang_short, Color: #010203\n");
        assert_eq!(
            result.to_json().unwrap(),
            r##"{"results":[{"label":"bang_short","color":"#010203"}]}"##
        );
    }

    #[test]
    fn writes_text_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results_dir = dir.path().join("abc").join("results");
        let result = assemble(None, &garments());
        let path = result.write_text_record(&results_dir).unwrap();
        assert_eq!(path, results_dir.join(RESULT_FILE_NAME));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("Label: jacket, Color: #abcdef\n"));
    }
}
