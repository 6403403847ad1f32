//! Multi-dimensional tile coordinates.

use std::fmt;
use std::ops::Index;

/// An ordered tuple of tile coordinates, one per dimension of a [`TiledRange`](super::TiledRange).
///
/// `TileIndex` is a plain coordinate; it carries no knowledge of the tile grid it names. Ordinal
/// conversion (`TiledRange::tile_ordinal` / `tile_index`) requires the owning `TiledRange`'s
/// per-dimension tile counts.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TileIndex(Vec<usize>);

impl TileIndex {
	/// Builds a `TileIndex` from per-dimension coordinates.
	pub fn new(coords: impl Into<Vec<usize>>) -> Self {
		Self(coords.into())
	}

	/// The rank (number of dimensions) of this index.
	pub fn rank(&self) -> usize {
		self.0.len()
	}

	/// The coordinates as a slice.
	pub fn as_slice(&self) -> &[usize] {
		&self.0
	}
}

impl Index<usize> for TileIndex {
	type Output = usize;

	fn index(&self, dim: usize) -> &usize {
		&self.0[dim]
	}
}

impl fmt::Debug for TileIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileIndex{:?}", self.0)
	}
}

impl From<Vec<usize>> for TileIndex {
	fn from(coords: Vec<usize>) -> Self {
		Self(coords)
	}
}

impl<const N: usize> From<[usize; N]> for TileIndex {
	fn from(coords: [usize; N]) -> Self {
		Self(coords.to_vec())
	}
}
