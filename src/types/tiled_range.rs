//! The rank-*r* product of per-dimension tile partitions.

use super::{ElementRange, Range1, TileIndex};
use crate::error::{Error, Result};

/// Names every tile of a rank-*r* array and maps tile coordinates to element sub-ranges.
///
/// `TiledRange` is the rank-*r* product of *r* [`Range1`] partitions. Per-dimension strides are
/// precomputed at construction so ordinal conversion is `O(r)` additions, no division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledRange {
	dims: Vec<Range1>,
	/// `strides[d]` is the ordinal weight of dimension `d` in row-major order:
	/// `strides[r-1] == 1`, `strides[d] == strides[d+1] * tile_count(d+1)`.
	strides: Vec<usize>,
}

impl TiledRange {
	/// Builds a `TiledRange` from one [`Range1`] per dimension.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `dims` is empty.
	pub fn new(dims: impl Into<Vec<Range1>>) -> Result<Self> {
		let dims = dims.into();
		if dims.is_empty() {
			return Err(Error::out_of_range("TiledRange", "must have rank >= 1"));
		}
		let mut strides = vec![1usize; dims.len()];
		for d in (0..dims.len() - 1).rev() {
			strides[d] = strides[d + 1] * dims[d + 1].tile_count();
		}
		Ok(Self { dims, strides })
	}

	/// The rank (number of dimensions).
	pub fn rank(&self) -> usize {
		self.dims.len()
	}

	/// Per-dimension tile counts, `tᵢ` for each dimension.
	pub fn tile_counts(&self) -> Vec<usize> {
		self.dims.iter().map(Range1::tile_count).collect()
	}

	/// The total number of tiles, `∏ tᵢ`.
	pub fn tile_count(&self) -> usize {
		self.dims.iter().map(Range1::tile_count).product()
	}

	/// The total number of elements, `∏ (bᵢ − aᵢ)`.
	pub fn element_count(&self) -> usize {
		self.dims.iter().map(Range1::element_count).product()
	}

	/// The element sub-range of tile `index`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `index`'s rank mismatches, or any coordinate is out of
	/// bounds for its dimension.
	pub fn tile_range(&self, index: &TileIndex) -> Result<ElementRange> {
		self.check_rank(index)?;
		let ranges = self
			.dims
			.iter()
			.zip(index.as_slice())
			.map(|(dim, &i)| dim.tile_range(i))
			.collect::<Result<Vec<_>>>()?;
		Ok(ElementRange::new(ranges))
	}

	/// The enclosing element range of the whole array.
	pub fn element_range(&self) -> ElementRange {
		ElementRange::new(self.dims.iter().map(Range1::element_range).collect())
	}

	/// Converts a multi-index to its row-major ordinal.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `index`'s rank mismatches or any coordinate is out of
	/// bounds.
	pub fn tile_ordinal(&self, index: &TileIndex) -> Result<usize> {
		self.check_rank(index)?;
		let mut ordinal = 0;
		for (d, &i) in index.as_slice().iter().enumerate() {
			if !self.dims[d].includes(i) {
				return Err(Error::out_of_range(
					"tile index",
					format!("dimension {d}: {i} not in [0, {})", self.dims[d].tile_count()),
				));
			}
			ordinal += i * self.strides[d];
		}
		Ok(ordinal)
	}

	/// Converts a row-major ordinal back to a multi-index.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `ordinal >= tile_count()`.
	pub fn tile_index(&self, ordinal: usize) -> Result<TileIndex> {
		if ordinal >= self.tile_count() {
			return Err(Error::out_of_range(
				"ordinal",
				format!("{ordinal} not in [0, {})", self.tile_count()),
			));
		}
		let mut remainder = ordinal;
		let mut coords = vec![0usize; self.rank()];
		for d in 0..self.rank() {
			coords[d] = remainder / self.strides[d];
			remainder %= self.strides[d];
		}
		Ok(TileIndex::new(coords))
	}

	/// Whether `index` names a tile within this range.
	pub fn includes(&self, index: &TileIndex) -> bool {
		if index.rank() != self.rank() {
			return false;
		}
		self
			.dims
			.iter()
			.zip(index.as_slice())
			.all(|(dim, &i)| dim.includes(i))
	}

	/// Whether the element multi-index `e` lies within the enclosing element range.
	pub fn includes_element(&self, e: &[usize]) -> bool {
		e.len() == self.rank()
			&& self
				.dims
				.iter()
				.zip(e)
				.all(|(dim, &x)| dim.includes_element(x))
	}

	/// The tile index containing element multi-index `e`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `e`'s rank mismatches or any coordinate lies outside the
	/// enclosing element range.
	pub fn element_to_tile(&self, e: &[usize]) -> Result<TileIndex> {
		if e.len() != self.rank() {
			return Err(Error::out_of_range(
				"element",
				format!("rank {} does not match TiledRange rank {}", e.len(), self.rank()),
			));
		}
		let coords = self
			.dims
			.iter()
			.zip(e)
			.map(|(dim, &x)| dim.element_to_tile(x))
			.collect::<Result<Vec<_>>>()?;
		Ok(TileIndex::new(coords))
	}

	fn check_rank(&self, index: &TileIndex) -> Result<()> {
		if index.rank() != self.rank() {
			return Err(Error::out_of_range(
				"tile index",
				format!("rank {} does not match TiledRange rank {}", index.rank(), self.rank()),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matrix_2x2() -> TiledRange {
		TiledRange::new(vec![
			Range1::uniform(0, 5, 2).unwrap(),
			Range1::uniform(0, 5, 2).unwrap(),
		])
		.unwrap()
	}

	#[test]
	fn tile_count_and_element_count() {
		let tr = matrix_2x2();
		assert_eq!(tr.tile_count(), 4);
		assert_eq!(tr.element_count(), 100);
	}

	#[test]
	fn ordinal_round_trips_for_all_indices() {
		let tr = matrix_2x2();
		for ord in 0..tr.tile_count() {
			let idx = tr.tile_index(ord).unwrap();
			assert_eq!(tr.tile_ordinal(&idx).unwrap(), ord);
		}
	}

	/// Round-trip through both tile and element coordinates.
	#[test]
	fn tile_and_element_coordinates_round_trip() {
		let tr = TiledRange::new(vec![
			Range1::new(vec![0, 3, 7, 10]).unwrap(),
			Range1::new(vec![0, 4, 9]).unwrap(),
		])
		.unwrap();

		for x_tile in 0..3 {
			for y_tile in 0..2 {
				let idx = TileIndex::from([x_tile, y_tile]);
				let range = tr.tile_range(&idx).unwrap();
				for e0 in range.dim(0).clone() {
					for e1 in range.dim(1).clone() {
						let found = tr.element_to_tile(&[e0, e1]).unwrap();
						assert_eq!(found, idx);
					}
				}
			}
		}
	}

	#[test]
	fn row_major_ordinal_matches_expected_layout() {
		// A 2x3 grid in row-major order: ordinal = x * 3 + y.
		let tr = TiledRange::new(vec![
			Range1::uniform(0, 1, 2).unwrap(),
			Range1::uniform(0, 1, 3).unwrap(),
		])
		.unwrap();
		assert_eq!(tr.tile_ordinal(&TileIndex::from([0, 0])).unwrap(), 0);
		assert_eq!(tr.tile_ordinal(&TileIndex::from([0, 2])).unwrap(), 2);
		assert_eq!(tr.tile_ordinal(&TileIndex::from([1, 0])).unwrap(), 3);
		assert_eq!(tr.tile_ordinal(&TileIndex::from([1, 2])).unwrap(), 5);
	}

	#[test]
	fn out_of_range_tile_index_is_rejected() {
		let tr = matrix_2x2();
		assert!(tr.tile_range(&TileIndex::from([2, 0])).is_err());
		assert!(tr.tile_ordinal(&TileIndex::from([0, 5])).is_err());
	}

	#[test]
	fn out_of_range_ordinal_is_rejected() {
		let tr = matrix_2x2();
		assert!(tr.tile_index(4).is_err());
	}

	#[test]
	fn rank_mismatch_is_rejected() {
		let tr = matrix_2x2();
		assert!(tr.tile_ordinal(&TileIndex::from([0, 0, 0])).is_err());
	}

	#[test]
	fn rejects_empty_dims() {
		assert!(TiledRange::new(Vec::<Range1>::new()).is_err());
	}
}
