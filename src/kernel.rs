//! Tile-level numeric kernels (C4 extension point).
//!
//! `DistributedTileStore` and the shape-propagation layer are numerics-agnostic: the actual
//! per-tile arithmetic (BLAS-level GEMM for contiguous contraction, element-wise loops for
//! add/multiply, stride-based permutation) is delegated to an external `TileKernel`. This module
//! specifies the trait boundary plus one reference element-wise kernel, sufficient to exercise the
//! store and shape-propagation machinery end-to-end; it does not specify or optimize numeric
//! internals beyond that.

use crate::error::{Error, Result};
use crate::types::Tile;

/// A binary, element-wise numeric operation over two same-shaped Tiles, producing a new Tile of
/// the same element range.
///
/// Implementations are expected to be pure functions of their inputs: no kernel mutates a `Tile`
/// in place, since tiles are immutable once published into a store.
pub trait TileKernel<T> {
	/// Applies the kernel to `a` and `b`, producing the output tile.
	///
	/// # Errors
	/// Returns [`Error::ShapeMismatch`] if `a` and `b` have different element ranges.
	fn apply(&self, a: &Tile<T>, b: &Tile<T>) -> Result<Tile<T>>;
}

/// A reference element-wise kernel built from a closure, e.g. `ElementwiseKernel::new(|a, b| a +
/// b)` for addition.
pub struct ElementwiseKernel<F> {
	op: F,
}

impl<F> ElementwiseKernel<F> {
	/// Builds a kernel applying `op` to each corresponding pair of elements.
	pub fn new(op: F) -> Self {
		Self { op }
	}
}

impl<T, F> TileKernel<T> for ElementwiseKernel<F>
where
	T: Clone,
	F: Fn(&T, &T) -> T,
{
	fn apply(&self, a: &Tile<T>, b: &Tile<T>) -> Result<Tile<T>> {
		let range = match (a.range(), b.range()) {
			(None, None) => return Ok(Tile::empty()),
			(Some(r), None) | (None, Some(r)) => {
				return Err(Error::ShapeMismatch(format!("one operand is empty, the other has range {r:?}")));
			}
			(Some(ra), Some(rb)) => {
				if ra != rb {
					return Err(Error::ShapeMismatch(format!("element ranges disagree: {ra:?} vs {rb:?}")));
				}
				ra.clone()
			}
		};
		let values: Vec<T> = a.iter().zip(b.iter()).map(|(x, y)| (self.op)(x, y)).collect();
		Ok(Tile::from_iter(range, values).expect("volume matches by construction"))
	}
}

/// Convenience: the element-wise sum kernel for any `T: Clone + Add<Output = T>`.
pub fn add_kernel<T: Clone + std::ops::Add<Output = T>>() -> ElementwiseKernel<impl Fn(&T, &T) -> T> {
	ElementwiseKernel::new(|a: &T, b: &T| a.clone() + b.clone())
}
