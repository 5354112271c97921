//! Detector class tables.
//!
//! A `ClassCatalog` maps a detector's class ids to labels (and back) and tags
//! each class with an optional garment [`Category`]. Catalogs are loaded once at
//! startup from a TOML or JSON table and are read-only afterward.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Coarse garment grouping used for output filtering and the hoodie override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Outer,
    Bottom,
}

/// One row of a class table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: u32,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct ClassTableFile {
    classes: Vec<ClassEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct ClassCatalog {
    by_id: HashMap<u32, ClassEntry>,
    by_label: HashMap<String, u32>,
}

// Deployed garment detector layout: ids 0..13 are tops, 13..17 outerwear,
// 17..23 bottoms, the rest uncategorized.
const GARMENT_LABELS: &[&str] = &[
    "sleeveless",
    "strapless",
    "crop_sleeve",
    "short_sleeve",
    "long_collar",
    "long_sleeve_collar",
    "crop_vneck",
    "hoodie",
    "shirt_short",
    "blouse_short",
    "shirt_long",
    "round_long",
    "vneck",
    "cardigan",
    "coat",
    "jumper",
    "jacket",
    "pants_mini",
    "pants_midi",
    "pants_long",
    "skirt_mini",
    "skirt_midi",
    "skirt_long",
    "mini_dress",
    "shoes",
];

impl ClassCatalog {
    /// Build a catalog, rejecting duplicate ids and duplicate labels.
    pub fn from_entries(entries: impl IntoIterator<Item = ClassEntry>) -> Result<Self> {
        let mut catalog = Self::default();
        for entry in entries {
            let label = entry.label.trim();
            if label.is_empty() {
                return Err(anyhow!("class {} has an empty label", entry.id));
            }
            if catalog.by_label.contains_key(label) {
                return Err(anyhow!("duplicate class label '{}'", label));
            }
            if catalog.by_id.contains_key(&entry.id) {
                return Err(anyhow!("duplicate class id {}", entry.id));
            }
            catalog.by_label.insert(label.to_string(), entry.id);
            catalog.by_id.insert(
                entry.id,
                ClassEntry {
                    label: label.to_string(),
                    ..entry
                },
            );
        }
        Ok(catalog)
    }

    /// Uncategorized catalog whose ids are the positions in `labels`.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        Self::from_entries(labels.iter().enumerate().map(|(id, label)| ClassEntry {
            id: id as u32,
            label: label.as_ref().to_string(),
            category: None,
        }))
    }

    /// Load a class table from disk. `.toml` files are parsed as TOML, anything
    /// else as JSON. Both use a top-level `classes` array.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read class table {}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let table: ClassTableFile = if is_toml {
            toml::from_str(&raw)
                .map_err(|e| anyhow!("invalid class table {}: {}", path.display(), e))?
        } else {
            serde_json::from_str(&raw)
                .map_err(|e| anyhow!("invalid class table {}: {}", path.display(), e))?
        };
        let catalog = Self::from_entries(table.classes)
            .with_context(|| format!("invalid class table {}", path.display()))?;
        log::debug!(
            "loaded {} classes from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Built-in garment table.
    pub fn garments() -> Self {
        let entries = GARMENT_LABELS.iter().enumerate().map(|(id, label)| {
            let category = match id {
                0..=12 => Some(Category::Top),
                13..=16 => Some(Category::Outer),
                17..=22 => Some(Category::Bottom),
                _ => None,
            };
            ClassEntry {
                id: id as u32,
                label: label.to_string(),
                category,
            }
        });
        Self::from_entries(entries).unwrap_or_default()
    }

    /// Built-in front hair table (fringe / no fringe).
    pub fn hair_fringe() -> Self {
        Self::from_labels(&["bang", "no_bang"]).unwrap_or_default()
    }

    /// Built-in back hair table (length).
    pub fn hair_length() -> Self {
        Self::from_labels(&["short", "medium", "long"]).unwrap_or_default()
    }

    /// Built-in table for a single detector covering fringe and length.
    pub fn hair_unified() -> Self {
        Self::from_labels(&[
            "bang_short",
            "bang_medium",
            "bang_long",
            "no_bang_short",
            "no_bang_medium",
            "no_bang_long",
        ])
        .unwrap_or_default()
    }

    pub fn label(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(|entry| entry.label.as_str())
    }

    pub fn id_of(&self, label: &str) -> Option<u32> {
        self.by_label.get(label).copied()
    }

    pub fn category(&self, id: u32) -> Option<Category> {
        self.by_id.get(&id).and_then(|entry| entry.category)
    }

    /// Category of a label; unknown labels are uncategorized.
    pub fn category_of(&self, label: &str) -> Option<Category> {
        self.id_of(label).and_then(|id| self.category(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_garments_follow_deployed_layout() {
        let catalog = ClassCatalog::garments();
        assert_eq!(catalog.id_of("hoodie"), Some(7));
        assert_eq!(catalog.category_of("hoodie"), Some(Category::Top));
        assert_eq!(catalog.category_of("vneck"), Some(Category::Top));
        assert_eq!(catalog.category_of("cardigan"), Some(Category::Outer));
        assert_eq!(catalog.category_of("jacket"), Some(Category::Outer));
        assert_eq!(catalog.category_of("pants_mini"), Some(Category::Bottom));
        assert_eq!(catalog.category_of("skirt_long"), Some(Category::Bottom));
        assert_eq!(catalog.category_of("mini_dress"), None);
        assert_eq!(catalog.category_of("unknown"), None);
    }

    #[test]
    fn label_lookup_is_bijective() {
        let catalog = ClassCatalog::garments();
        for id in 0..catalog.len() as u32 {
            let label = catalog.label(id).expect("label");
            assert_eq!(catalog.id_of(label), Some(id));
        }
    }

    #[test]
    fn rejects_duplicates() {
        let dup_label = ClassCatalog::from_labels(&["a", "a"]);
        assert!(dup_label.is_err());

        let dup_id = ClassCatalog::from_entries(vec![
            ClassEntry {
                id: 1,
                label: "a".into(),
                category: None,
            },
            ClassEntry {
                id: 1,
                label: "b".into(),
                category: None,
            },
        ]);
        assert!(dup_id.is_err());
    }

    #[test]
    fn loads_toml_and_json_tables() {
        let mut toml_file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp toml");
        writeln!(
            toml_file,
            r#"
            [[classes]]
            id = 0
            label = "tshirt"
            category = "top"

            [[classes]]
            id = 4
            label = "scarf"
            "#
        )
        .unwrap();
        let catalog = ClassCatalog::load(toml_file.path()).expect("load toml");
        assert_eq!(catalog.category_of("tshirt"), Some(Category::Top));
        assert_eq!(catalog.label(4), Some("scarf"));
        assert_eq!(catalog.category(4), None);

        let mut json_file = NamedTempFile::new().expect("temp json");
        json_file
            .write_all(br#"{"classes": [{"id": 2, "label": "coat", "category": "outer"}]}"#)
            .unwrap();
        let catalog = ClassCatalog::load(json_file.path()).expect("load json");
        assert_eq!(catalog.category_of("coat"), Some(Category::Outer));
    }

    #[test]
    fn rejects_malformed_table() {
        let mut file = NamedTempFile::new().expect("temp json");
        file.write_all(br#"{"classes": [{"id": 0, "label": "x", "category": "hat"}]}"#)
            .unwrap();
        assert!(ClassCatalog::load(file.path()).is_err());
    }
}
