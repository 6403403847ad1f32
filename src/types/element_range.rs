//! A rank-*r* element sub-range: one `Range<usize>` per dimension.

use std::fmt;
use std::ops::Range;

/// The element sub-range spanned by a tile (or by a whole [`TiledRange`](super::TiledRange)).
#[derive(Clone, PartialEq, Eq)]
pub struct ElementRange {
	dims: Vec<Range<usize>>,
}

impl ElementRange {
	/// Builds an `ElementRange` from one `Range<usize>` per dimension.
	pub fn new(dims: impl Into<Vec<Range<usize>>>) -> Self {
		Self { dims: dims.into() }
	}

	/// The rank (number of dimensions).
	pub fn rank(&self) -> usize {
		self.dims.len()
	}

	/// The element range of dimension `d`.
	pub fn dim(&self, d: usize) -> &Range<usize> {
		&self.dims[d]
	}

	/// The per-dimension extents (`bᵢ − aᵢ`).
	pub fn shape(&self) -> Vec<usize> {
		self.dims.iter().map(|r| r.end - r.start).collect()
	}

	/// The total number of elements, `∏ (bᵢ − aᵢ)`.
	pub fn volume(&self) -> usize {
		self.shape().iter().product()
	}

	/// Whether the element multi-index `e` lies within this range.
	pub fn contains(&self, e: &[usize]) -> bool {
		e.len() == self.rank() && self.dims.iter().zip(e).all(|(r, &x)| r.contains(&x))
	}
}

impl fmt::Debug for ElementRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ElementRange{:?}", self.dims)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn volume_is_product_of_extents() {
		let r = ElementRange::new(vec![0..3, 2..9]);
		assert_eq!(r.shape(), vec![3, 7]);
		assert_eq!(r.volume(), 21);
	}

	#[test]
	fn contains_checks_every_dimension() {
		let r = ElementRange::new(vec![0..3, 2..9]);
		assert!(r.contains(&[1, 5]));
		assert!(!r.contains(&[3, 5]));
		assert!(!r.contains(&[1, 9]));
		assert!(!r.contains(&[1]));
	}
}
