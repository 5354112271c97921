//! Dominant-color estimation over a segmentation mask.
//!
//! The estimator averages the masked pixels of an RGB image after dropping
//! specular highlights and overexposed regions (HSV value >= `MAX_VALUE`).
//! It never fails: when nothing qualifies it returns [`HexColor::BLACK`].

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use image::RgbImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::mask::BinaryMask;

/// Pixels at or above this HSV value (8-bit scale) are rejected.
pub const MAX_VALUE: u8 = 200;

/// 24-bit RGB color rendered as lowercase `#rrggbb`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HexColor([u8; 3]);

impl HexColor {
    /// Sentinel for "no dominant color".
    pub const BLACK: HexColor = HexColor([0, 0, 0]);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self([red, green, blue])
    }

    pub fn channels(self) -> [u8; 3] {
        self.0
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for HexColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("color '{}' must start with '#'", s))?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("color '{}' must have exactly 6 hex digits", s));
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// HSV value channel on the 8-bit scale (`max(r, g, b)`).
fn hsv_value(pixel: [u8; 3]) -> u8 {
    pixel[0].max(pixel[1]).max(pixel[2])
}

/// Average color of the masked, non-highlight pixels of `image`.
///
/// Channel means are truncated, not rounded. Returns [`HexColor::BLACK`] when
/// the mask is empty, when every masked pixel is too bright, or when the mask
/// does not cover the image.
pub fn extract_dominant_color(image: &RgbImage, mask: &BinaryMask) -> HexColor {
    if image.width() != mask.width() || image.height() != mask.height() {
        log::warn!(
            "mask {}x{} does not match image {}x{}; no dominant color",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        );
        return HexColor::BLACK;
    }

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for (x, y) in mask.iter_set() {
        let pixel = image.get_pixel(x, y).0;
        if hsv_value(pixel) >= MAX_VALUE {
            continue;
        }
        for (sum, channel) in sums.iter_mut().zip(pixel) {
            *sum += channel as u64;
        }
        count += 1;
    }

    if count == 0 {
        return HexColor::BLACK;
    }
    let mean = |sum: u64| (sum / count) as u8;
    HexColor::new(mean(sums[0]), mean(sums[1]), mean(sums[2]))
}
