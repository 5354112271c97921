//! Front/back hair fusion.
//!
//! Two detector topologies are supported and selected at construction time:
//!
//! - [`HairMode::Split`]: a fringe detector on the front photo and a length
//!   detector on the back photo. Labels are concatenated `front_back`; color
//!   always comes from the front pick when there is one.
//! - [`HairMode::Unified`]: one detector on both photos whose labels carry a
//!   fringe marker (`bang_long`, `no_bang_short`, ...).

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::detect::{best_by_confidence, Detection};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HairMode {
    #[default]
    Split,
    Unified,
}

impl fmt::Display for HairMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HairMode::Split => f.write_str("split"),
            HairMode::Unified => f.write_str("unified"),
        }
    }
}

impl FromStr for HairMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "split" => Ok(HairMode::Split),
            "unified" => Ok(HairMode::Unified),
            other => Err(anyhow!("unknown hair mode '{}' (expected split|unified)", other)),
        }
    }
}

/// Final hair label and color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HairProfile {
    pub label: String,
    pub color: HexColor,
}

impl HairProfile {
    fn from_detection(det: &Detection) -> Self {
        Self {
            label: det.label.clone(),
            color: det.color,
        }
    }
}

/// Label convention for fringe presence, e.g. `bang` / `no_bang`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FringeMarker {
    pub marker: String,
    pub negation_prefix: String,
}

impl Default for FringeMarker {
    fn default() -> Self {
        Self {
            marker: "bang".to_string(),
            negation_prefix: "no_".to_string(),
        }
    }
}

impl FringeMarker {
    pub fn new(marker: impl Into<String>, negation_prefix: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            negation_prefix: negation_prefix.into(),
        }
    }

    fn negated(&self) -> String {
        format!("{}{}", self.negation_prefix, self.marker)
    }

    /// `Some(true)` for fringe, `Some(false)` for no fringe, `None` when the
    /// label carries no marker.
    pub fn state(&self, label: &str) -> Option<bool> {
        if !label.contains(&self.marker) {
            return None;
        }
        Some(!label.contains(&self.negated()))
    }

    /// Marker token of a state, e.g. `bang` or `no_bang`.
    fn token(&self, fringe: bool) -> String {
        if fringe {
            self.marker.clone()
        } else {
            self.negated()
        }
    }

    /// Label with its marker token and adjoining separator removed.
    fn strip(&self, label: &str) -> String {
        let token = match self.state(label) {
            Some(fringe) => self.token(fringe),
            None => return label.to_string(),
        };
        let stripped = label.replacen(&token, "", 1);
        stripped.trim_matches('_').replace("__", "_")
    }
}

#[derive(Clone, Debug, Default)]
pub struct HairResolver {
    mode: HairMode,
    marker: FringeMarker,
}

impl HairResolver {
    pub fn new(mode: HairMode, marker: FringeMarker) -> Self {
        Self { mode, marker }
    }

    pub fn mode(&self) -> HairMode {
        self.mode
    }

    /// Fuse front and back detections into one hair profile.
    pub fn resolve(&self, front: &[Detection], back: &[Detection]) -> Option<HairProfile> {
        let resolved = match self.mode {
            HairMode::Split => self.resolve_split(front, back),
            HairMode::Unified => self.resolve_unified(front, back),
        };
        match &resolved {
            Some(hair) => log::info!("hair ({}): {} {}", self.mode, hair.label, hair.color),
            None => log::info!("hair ({}): no detection in either image", self.mode),
        }
        resolved
    }

    fn resolve_split(&self, front: &[Detection], back: &[Detection]) -> Option<HairProfile> {
        match (best_by_confidence(front), best_by_confidence(back)) {
            (Some(f), Some(b)) => Some(HairProfile {
                label: format!("{}_{}", f.label, b.label),
                color: f.color,
            }),
            (Some(only), None) | (None, Some(only)) => Some(HairProfile::from_detection(only)),
            (None, None) => None,
        }
    }

    fn resolve_unified(&self, front: &[Detection], back: &[Detection]) -> Option<HairProfile> {
        let with_marker = |dets: &[Detection]| {
            best_by_confidence(
                dets.iter()
                    .filter(|d| self.marker.state(&d.label).is_some()),
            )
            .cloned()
        };

        match (with_marker(front), with_marker(back)) {
            (Some(f), Some(b)) => {
                let front_state = self.marker.state(&f.label);
                let back_state = self.marker.state(&b.label);
                if front_state == back_state {
                    return Some(HairProfile::from_detection(&f));
                }
                // Disagreement: keep the back image's length and color, the
                // front image's fringe state.
                let fringe = front_state.unwrap_or_default();
                let rest = self.marker.strip(&b.label);
                let label = if rest.is_empty() {
                    self.marker.token(fringe)
                } else {
                    format!("{}_{}", self.marker.token(fringe), rest)
                };
                Some(HairProfile {
                    label,
                    color: b.color,
                })
            }
            (Some(only), None) | (None, Some(only)) => Some(HairProfile::from_detection(&only)),
            (None, None) => None,
        }
    }
}
