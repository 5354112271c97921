//! Binary segmentation masks.

use anyhow::{anyhow, Result};

/// Row-major boolean mask with the same resolution as the image it covers.
///
/// A mask is produced by a segmenter for one detection and dropped right after
/// color extraction. It is deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BinaryMask {
    /// All-false mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// All-true mask.
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Build from a flat row-major buffer, validating its length.
    pub fn from_vec(width: u32, height: u32, bits: Vec<bool>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("mask dimensions overflow"))?;
        if bits.len() != expected {
            return Err(anyhow!(
                "mask length mismatch: expected {}, got {}",
                expected,
                bits.len()
            ));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.bits[idx] = value;
        }
    }

    /// Number of true pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True when no pixel is set.
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Coordinates of the set pixels in row-major order.
    pub fn iter_set(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_is_row_major() {
        let mask = BinaryMask::from_fn(3, 2, |x, y| x == 2 && y == 1);
        assert_eq!(mask.count(), 1);
        assert!(mask.get(2, 1));
        assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![(2, 1)]);
    }

    #[test]
    fn from_vec_validates_length() {
        assert!(BinaryMask::from_vec(2, 2, vec![true; 3]).is_err());
        let mask = BinaryMask::from_vec(2, 2, vec![false, true, false, false]).unwrap();
        assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![(1, 0)]);
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut mask = BinaryMask::new(2, 2);
        mask.set(5, 5, true);
        assert!(mask.is_empty());
        assert!(!mask.get(5, 5));
    }
}
