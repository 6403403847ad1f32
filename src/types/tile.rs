//! A single local block of an array: an element range plus its contiguous buffer.

use super::ElementRange;
use crate::error::{Error, Result};

/// A contiguous, local block of an array: an [`ElementRange`] paired with a buffer of
/// `range.volume()` elements of type `T`.
///
/// A `Tile` is a value type, constructed once and never mutated after publication into a
/// [`DistributedTileStore`](crate::store::DistributedTileStore). A default-constructed (empty)
/// `Tile` represents a structurally zero tile and carries no element range to index into.
#[derive(Clone, Debug)]
pub struct Tile<T> {
	range: Option<ElementRange>,
	storage: Vec<T>,
}

impl<T> Tile<T> {
	/// The empty tile: `volume() == 0`, representing a structurally zero tile.
	pub fn empty() -> Self {
		Self {
			range: None,
			storage: Vec::new(),
		}
	}

	/// Builds a tile over `range`, filled by repeatedly calling `init()`.
	///
	/// # Errors
	/// Never fails directly, but mirrors the other constructors' signature for consistency.
	pub fn from_fn(range: ElementRange, mut init: impl FnMut() -> T) -> Self {
		let volume = range.volume();
		let storage = (0..volume).map(|_| init()).collect();
		Self {
			range: Some(range),
			storage,
		}
	}

	/// Builds a tile over `range`, consuming exactly `range.volume()` items from `iter`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `iter` yields fewer than `range.volume()` items.
	pub fn from_iter(range: ElementRange, iter: impl IntoIterator<Item = T>) -> Result<Self> {
		let volume = range.volume();
		let storage: Vec<T> = iter.into_iter().take(volume).collect();
		if storage.len() != volume {
			return Err(Error::out_of_range(
				"tile element iterator",
				format!("expected {} elements, got {}", volume, storage.len()),
			));
		}
		Ok(Self {
			range: Some(range),
			storage,
		})
	}

	/// Builds a tile over `range` with every element set to `value`.
	pub fn broadcast(range: ElementRange, value: T) -> Self
	where
		T: Clone,
	{
		let volume = range.volume();
		Self {
			range: Some(range),
			storage: vec![value; volume],
		}
	}

	/// The tile's element range, or `None` if this is the empty tile.
	pub fn range(&self) -> Option<&ElementRange> {
		self.range.as_ref()
	}

	/// The number of elements stored in this tile.
	pub fn volume(&self) -> usize {
		self.storage.len()
	}

	/// Whether this is the empty (structurally zero) tile.
	pub fn is_empty(&self) -> bool {
		self.storage.is_empty()
	}

	/// A slice over the tile's contiguous element buffer, in the array's storage order.
	pub fn data(&self) -> &[T] {
		&self.storage
	}

	/// Iterates over the tile's elements.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.storage.iter()
	}

	/// Consumes the tile, returning its element buffer.
	pub(crate) fn data_into_vec(self) -> Vec<T> {
		self.storage
	}
}

impl<T: PartialEq> PartialEq for Tile<T> {
	fn eq(&self, other: &Self) -> bool {
		self.range == other.range && self.storage == other.storage
	}
}

impl<T: Eq> Eq for Tile<T> {}

impl<T> Default for Tile<T> {
	fn default() -> Self {
		Self::empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_tile_has_zero_volume() {
		let t: Tile<f64> = Tile::empty();
		assert_eq!(t.volume(), 0);
		assert!(t.is_empty());
		assert!(t.range().is_none());
	}

	#[test]
	fn from_iter_fills_in_order() {
		let range = ElementRange::new(vec![0..2, 0..3]);
		let tile = Tile::from_iter(range, 0..6).unwrap();
		assert_eq!(tile.volume(), 6);
		assert_eq!(tile.data(), &[0, 1, 2, 3, 4, 5]);
	}

	#[test]
	fn from_iter_rejects_short_iterators() {
		let range = ElementRange::new(vec![0..2, 0..3]);
		assert!(Tile::from_iter(range, 0..4).is_err());
	}

	#[test]
	fn broadcast_fills_every_element() {
		let range = ElementRange::new(vec![0..2, 0..2]);
		let tile = Tile::broadcast(range, 7u32);
		assert_eq!(tile.data(), &[7, 7, 7, 7]);
	}

	#[test]
	fn equality_is_element_wise() {
		let range = ElementRange::new(vec![0..3]);
		let a = Tile::from_iter(range.clone(), [1, 2, 3]).unwrap();
		let b = Tile::from_iter(range, [1, 2, 3]).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn default_is_empty() {
		let t: Tile<i32> = Tile::default();
		assert!(t.is_empty());
	}
}
