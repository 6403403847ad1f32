//! One-dimensional tile partitioning.
//!
//! [`Range1`] partitions a contiguous element range `[a, b)` into tiles by a strictly increasing
//! sequence of `t + 1` offsets. A [`TiledRange`](super::TiledRange) is the rank-*r* product of *r*
//! `Range1` objects.

use crate::error::{Error, Result};
use std::ops::Range;

/// A single dimension's tile partitioning: a strictly increasing sequence of element offsets.
///
/// `offsets = [a_0, a_1, ..., a_t]` partitions `[a_0, a_t)` into `t` tiles, tile `i` spanning
/// `[a_i, a_{i+1})`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range1 {
	offsets: Vec<usize>,
}

impl Range1 {
	/// Builds a `Range1` from a sequence of element offsets.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `offsets` has fewer than two entries, or if the sequence
	/// is not strictly increasing.
	pub fn new(offsets: impl Into<Vec<usize>>) -> Result<Self> {
		let offsets = offsets.into();
		if offsets.len() < 2 {
			return Err(Error::out_of_range(
				"Range1 offsets",
				format!("need at least 2 offsets to form one tile, got {}", offsets.len()),
			));
		}
		if !offsets.windows(2).all(|w| w[0] < w[1]) {
			return Err(Error::out_of_range("Range1 offsets", "offsets must be strictly increasing"));
		}
		Ok(Self { offsets })
	}

	/// Builds a `Range1` of `tile_count` equal-sized tiles, each `tile_size` elements wide,
	/// starting at element offset `start`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `tile_count == 0` or `tile_size == 0`.
	pub fn uniform(start: usize, tile_size: usize, tile_count: usize) -> Result<Self> {
		if tile_count == 0 || tile_size == 0 {
			return Err(Error::out_of_range(
				"Range1 uniform",
				"tile_count and tile_size must both be non-zero",
			));
		}
		let offsets = (0..=tile_count).map(|i| start + i * tile_size).collect();
		Self::new(offsets)
	}

	/// The number of tiles in this dimension.
	pub fn tile_count(&self) -> usize {
		self.offsets.len() - 1
	}

	/// The number of elements spanned by this dimension.
	pub fn element_count(&self) -> usize {
		self.offsets.last().unwrap() - self.offsets[0]
	}

	/// The element sub-range `[a, b)` of tile `i`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `i >= tile_count()`.
	pub fn tile_range(&self, i: usize) -> Result<Range<usize>> {
		if i >= self.tile_count() {
			return Err(Error::out_of_range(
				"tile index",
				format!("{i} not in [0, {})", self.tile_count()),
			));
		}
		Ok(self.offsets[i]..self.offsets[i + 1])
	}

	/// The enclosing element range `[a_0, a_t)`.
	pub fn element_range(&self) -> Range<usize> {
		self.offsets[0]..*self.offsets.last().unwrap()
	}

	/// Whether tile index `i` lies within this dimension's tile count.
	pub fn includes(&self, i: usize) -> bool {
		i < self.tile_count()
	}

	/// Whether element `e` lies within the enclosing element range.
	pub fn includes_element(&self, e: usize) -> bool {
		self.element_range().contains(&e)
	}

	/// The tile index containing element `e`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `e` lies outside the enclosing element range.
	pub fn element_to_tile(&self, e: usize) -> Result<usize> {
		if !self.includes_element(e) {
			return Err(Error::out_of_range(
				"element",
				format!("{e} not in {:?}", self.element_range()),
			));
		}
		// offsets is strictly increasing, so partition_point finds the tile boundary directly.
		let idx = self.offsets.partition_point(|&a| a <= e);
		Ok(idx - 1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Range1 {
		Range1::new(vec![0, 3, 7, 10, 20, 50]).unwrap()
	}

	#[test]
	fn rejects_non_increasing_offsets() {
		assert!(Range1::new(vec![0, 3, 3]).is_err());
		assert!(Range1::new(vec![0, 5, 2]).is_err());
	}

	#[test]
	fn rejects_too_few_offsets() {
		assert!(Range1::new(vec![0]).is_err());
		assert!(Range1::new(Vec::<usize>::new()).is_err());
	}

	/// Offsets [0,3,7,10,20,50] give 5 tiles.
	#[test]
	fn tile_ranges_match_offsets() {
		let r = sample();
		assert_eq!(r.tile_count(), 5);
		assert_eq!(r.tile_range(0).unwrap(), 0..3);
		assert_eq!(r.tile_range(4).unwrap(), 20..50);
		assert!(r.tile_range(5).is_err());
	}

	#[test]
	fn includes_element_respects_bounds() {
		let r = sample();
		assert!(!r.includes_element(50));
		assert!(r.includes_element(49));
		assert!(r.includes_element(0));
	}

	#[test]
	fn element_to_tile_round_trips() {
		let r = sample();
		for i in 0..r.tile_count() {
			let range = r.tile_range(i).unwrap();
			for e in range {
				assert_eq!(r.element_to_tile(e).unwrap(), i);
			}
		}
	}

	#[test]
	fn element_to_tile_out_of_range() {
		let r = sample();
		assert!(r.element_to_tile(50).is_err());
		assert!(r.element_to_tile(1000).is_err());
	}

	#[test]
	fn uniform_builds_equal_tiles() {
		let r = Range1::uniform(10, 5, 3).unwrap();
		assert_eq!(r.tile_count(), 3);
		assert_eq!(r.tile_range(0).unwrap(), 10..15);
		assert_eq!(r.tile_range(2).unwrap(), 20..25);
		assert_eq!(r.element_count(), 15);
	}

	#[test]
	fn uniform_rejects_zero_sizes() {
		assert!(Range1::uniform(0, 0, 3).is_err());
		assert!(Range1::uniform(0, 5, 0).is_err());
	}
}
