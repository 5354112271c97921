//! Garment aggregation across the front and back photos.
//!
//! The front photo is the garment source. The back photo is only consulted for
//! the override label (a hoodie seen from behind): its first occurrence
//! replaces every other upper-body entry.

use indexmap::IndexMap;
use serde::Serialize;

use crate::catalog::{Category, ClassCatalog};
use crate::color::HexColor;
use crate::detect::Detection;

pub const DEFAULT_OVERRIDE_LABEL: &str = "hoodie";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GarmentEntry {
    pub color: HexColor,
    /// Number of front detections seen for this label. Diagnostic only.
    pub count: u32,
}

/// Deduplicated label -> color mapping in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GarmentProfile {
    entries: IndexMap<String, GarmentEntry>,
}

impl GarmentProfile {
    pub fn get(&self, label: &str) -> Option<HexColor> {
        self.entries.get(label).map(|entry| entry.color)
    }

    pub fn count(&self, label: &str) -> Option<u32> {
        self.entries.get(label).map(|entry| entry.count)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(label, color)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, HexColor)> {
        self.entries
            .iter()
            .map(|(label, entry)| (label.as_str(), entry.color))
    }
}

#[derive(Clone, Debug)]
pub struct GarmentAggregator {
    override_label: String,
}

impl Default for GarmentAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERRIDE_LABEL)
    }
}

impl GarmentAggregator {
    pub fn new(override_label: impl Into<String>) -> Self {
        Self {
            override_label: override_label.into(),
        }
    }

    pub fn override_label(&self) -> &str {
        &self.override_label
    }

    /// Build the garment profile for one front/back pair.
    ///
    /// Within the front photo the last detection of a label sets its color.
    /// Only labels categorized TOP, OUTER or BOTTOM are kept.
    pub fn aggregate(
        &self,
        front: &[Detection],
        back: &[Detection],
        catalog: &ClassCatalog,
    ) -> GarmentProfile {
        let mut entries: IndexMap<String, GarmentEntry> = IndexMap::new();
        for det in front {
            entries
                .entry(det.label.clone())
                .and_modify(|entry| {
                    entry.color = det.color;
                    entry.count += 1;
                })
                .or_insert(GarmentEntry {
                    color: det.color,
                    count: 1,
                });
        }

        if let Some(hoodie) = back.iter().find(|d| d.label == self.override_label) {
            entries.insert(
                self.override_label.clone(),
                GarmentEntry {
                    color: hoodie.color,
                    count: 1,
                },
            );
            let before = entries.len();
            entries.retain(|label, _| {
                label == &self.override_label || catalog.category_of(label) != Some(Category::Top)
            });
            log::debug!(
                "back {} {} overrides {} upper-body entries",
                self.override_label,
                hoodie.color,
                before - entries.len()
            );
        }

        entries.retain(|label, _| {
            let keep = catalog.category_of(label).is_some();
            if !keep {
                log::debug!("dropping uncategorized garment {}", label);
            }
            keep
        });

        log::info!(
            "garments: {}",
            entries
                .iter()
                .map(|(label, entry)| format!("{}={}", label, entry.color))
                .collect::<Vec<_>>()
                .join(", ")
        );
        GarmentProfile { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, color: &str) -> Detection {
        let catalog = ClassCatalog::garments();
        let class_id = catalog.id_of(label).unwrap_or(999);
        Detection::new(label, color.parse().unwrap(), 0.5, class_id)
    }

    fn aggregate(front: &[Detection], back: &[Detection]) -> GarmentProfile {
        GarmentAggregator::default().aggregate(front, back, &ClassCatalog::garments())
    }

    #[test]
    fn last_front_detection_sets_color() {
        let front = vec![
            det("short_sleeve", "#010101"),
            det("pants_long", "#020202"),
            det("short_sleeve", "#030303"),
        ];
        let profile = aggregate(&front, &[]);
        assert_eq!(profile.labels().collect::<Vec<_>>(), vec!["short_sleeve", "pants_long"]);
        assert_eq!(profile.get("short_sleeve").unwrap().to_string(), "#030303");
        assert_eq!(profile.count("short_sleeve"), Some(2));
    }

    #[test]
    fn back_detections_ignored_without_hoodie() {
        let front = vec![det("short_sleeve", "#010101")];
        let back = vec![det("coat", "#020202"), det("skirt_long", "#030303")];
        let profile = aggregate(&front, &back);
        assert_eq!(profile.labels().collect::<Vec<_>>(), vec!["short_sleeve"]);
    }

    #[test]
    fn back_hoodie_replaces_every_top() {
        let front = vec![
            det("short_sleeve", "#ff0000"),
            det("jacket", "#abcdef"),
            det("vneck", "#00ff00"),
            det("pants_long", "#0000ff"),
        ];
        let back = vec![det("hoodie", "#000011")];
        let profile = aggregate(&front, &back);
        assert_eq!(
            profile.labels().collect::<Vec<_>>(),
            vec!["jacket", "pants_long", "hoodie"]
        );
        assert_eq!(profile.get("hoodie").unwrap().to_string(), "#000011");
        let catalog = ClassCatalog::garments();
        let tops: Vec<_> = profile
            .labels()
            .filter(|l| catalog.category_of(l) == Some(Category::Top))
            .collect();
        assert_eq!(tops, vec!["hoodie"]);
    }

    #[test]
    fn first_back_hoodie_wins_and_keeps_front_position() {
        let front = vec![
            det("hoodie", "#111111"),
            det("hoodie", "#121212"),
            det("pants_mini", "#222222"),
        ];
        let back = vec![det("hoodie", "#333333"), det("hoodie", "#444444")];
        let profile = aggregate(&front, &back);
        assert_eq!(profile.labels().collect::<Vec<_>>(), vec!["hoodie", "pants_mini"]);
        assert_eq!(profile.get("hoodie").unwrap().to_string(), "#333333");
        assert_eq!(profile.count("hoodie"), Some(1));
    }

    #[test]
    fn override_label_is_configurable() {
        let aggregator = GarmentAggregator::new("coat");
        assert_eq!(aggregator.override_label(), "coat");
        assert_eq!(GarmentAggregator::default().override_label(), "hoodie");

        let front = vec![det("short_sleeve", "#010101"), det("hoodie", "#020202")];
        let back = vec![det("hoodie", "#030303"), det("coat", "#040404")];
        let profile = aggregator.aggregate(&front, &back, &ClassCatalog::garments());
        assert_eq!(profile.labels().collect::<Vec<_>>(), vec!["coat"]);
        assert_eq!(profile.get("coat").unwrap().to_string(), "#040404");
    }

    #[test]
    fn uncategorized_labels_are_dropped() {
        let front = vec![det("mini_dress", "#010101"), det("shoes", "#020202"), det("coat", "#030303")];
        let back = vec![det("hoodie", "#040404")];
        let profile = aggregate(&front, &back);
        assert_eq!(profile.labels().collect::<Vec<_>>(), vec!["coat", "hoodie"]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let front = vec![det("round_long", "#101010"), det("skirt_midi", "#202020")];
        let back = vec![det("hoodie", "#303030")];
        let a = serde_json::to_string(&aggregate(&front, &back)).unwrap();
        let b = serde_json::to_string(&aggregate(&front, &back)).unwrap();
        assert_eq!(a, b);
    }
}
