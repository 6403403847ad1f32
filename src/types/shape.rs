//! Structural sparsity of a tiled array.

use crate::error::{Error, Result};
use bitvec::prelude::*;

/// The structural-sparsity descriptor of an array: either `Dense` (every tile present) or
/// `Sparse`, carrying a bitset of length `tile_count` where bit `k` set means tile `k` is
/// structurally non-zero.
///
/// A `Shape` is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
	/// Every tile in the producing `TiledRange` is present.
	Dense {
		/// The tile count of the producing `TiledRange`.
		tile_count: usize,
	},
	/// Only the tiles marked in `bits` are present; all others are structurally zero.
	Sparse {
		/// Bit `k` set means tile `k` is structurally non-zero.
		bits: BitVec,
	},
}

impl Shape {
	/// Builds a `Dense` shape over `tile_count` tiles.
	pub fn dense(tile_count: usize) -> Self {
		Shape::Dense { tile_count }
	}

	/// Builds a `Sparse` shape from an explicit bitset.
	pub fn sparse(bits: BitVec) -> Self {
		Shape::Sparse { bits }
	}

	/// Builds a `Sparse` shape over `tile_count` tiles, with exactly the ordinals in `nonzero`
	/// marked present.
	pub fn sparse_from_ordinals(tile_count: usize, nonzero: impl IntoIterator<Item = usize>) -> Self {
		let mut bits = bitvec![0; tile_count];
		for k in nonzero {
			bits.set(k, true);
		}
		Shape::Sparse { bits }
	}

	/// Whether this shape is `Dense`.
	pub fn is_dense(&self) -> bool {
		matches!(self, Shape::Dense { .. })
	}

	/// The number of tiles this shape describes.
	pub fn tile_count(&self) -> usize {
		match self {
			Shape::Dense { tile_count } => *tile_count,
			Shape::Sparse { bits } => bits.len(),
		}
	}

	/// Whether tile `k` is structurally zero. Always `false` for `Dense`.
	///
	/// # Panics
	/// Panics if `k >= tile_count()`, mirroring slice-indexing semantics: a caller always knows
	/// the shape's `tile_count` ahead of time.
	pub fn is_zero(&self, k: usize) -> bool {
		match self {
			Shape::Dense { tile_count } => {
				assert!(k < *tile_count, "ordinal {k} out of range for tile_count {tile_count}");
				false
			}
			Shape::Sparse { bits } => !bits[k],
		}
	}

	/// The underlying bitset.
	///
	/// # Errors
	/// Returns [`Error::NotApplicable`] if this shape is `Dense`.
	pub fn bitset(&self) -> Result<&BitVec> {
		match self {
			Shape::Dense { .. } => Err(Error::NotApplicable),
			Shape::Sparse { bits } => Ok(bits),
		}
	}

	/// The fraction of tiles that are structurally zero; `0.0` for `Dense`. Diagnostic only.
	pub fn sparsity(&self) -> f64 {
		match self {
			Shape::Dense { .. } => 0.0,
			Shape::Sparse { bits } => {
				if bits.is_empty() {
					0.0
				} else {
					let zeros = bits.iter().filter(|b| !**b).count();
					zeros as f64 / bits.len() as f64
				}
			}
		}
	}

	/// Element-wise sum shape: `shape_C[k] = shape_A[k] ∨ shape_B[k]`. Dense if either operand is
	/// Dense.
	///
	/// # Errors
	/// Returns [`Error::ShapeMismatch`] if `a` and `b` describe different tile counts.
	pub fn sum(a: &Shape, b: &Shape) -> Result<Shape> {
		check_same_tile_count(a, b)?;
		Ok(match (a, b) {
			(Shape::Dense { tile_count }, _) | (_, Shape::Dense { tile_count }) => Shape::Dense {
				tile_count: *tile_count,
			},
			(Shape::Sparse { bits: a }, Shape::Sparse { bits: b }) => Shape::Sparse {
				bits: a.clone() | b.clone(),
			},
		})
	}

	/// Element-wise (Hadamard) product shape: `shape_C[k] = shape_A[k] ∧ shape_B[k]`. Sparse
	/// unless both operands are Dense, since the product is zero-annihilating.
	///
	/// # Errors
	/// Returns [`Error::ShapeMismatch`] if `a` and `b` describe different tile counts.
	pub fn product(a: &Shape, b: &Shape) -> Result<Shape> {
		check_same_tile_count(a, b)?;
		Ok(match (a, b) {
			(Shape::Dense { tile_count }, Shape::Dense { .. }) => Shape::Dense {
				tile_count: *tile_count,
			},
			(Shape::Dense { tile_count }, Shape::Sparse { bits }) | (Shape::Sparse { bits }, Shape::Dense { tile_count }) => {
				debug_assert_eq!(*tile_count, bits.len());
				Shape::Sparse { bits: bits.clone() }
			}
			(Shape::Sparse { bits: a }, Shape::Sparse { bits: b }) => Shape::Sparse {
				bits: a.clone() & b.clone(),
			},
		})
	}

	/// The shape resulting from permuting tile axes by `perm`: `shape_C[π(i)] = shape_A[i]`.
	///
	/// `perm[d]` gives the destination axis of source axis `d`. `dims` gives the source
	/// `TiledRange`'s per-axis tile counts, needed to re-linearize ordinals under the new axis
	/// order.
	///
	/// # Errors
	/// Returns [`Error::ShapeMismatch`] if `perm`'s length does not match `dims`'s length, or if
	/// `perm` is not a permutation of `0..dims.len()`.
	pub fn permute(shape: &Shape, dims: &[usize], perm: &[usize]) -> Result<Shape> {
		if perm.len() != dims.len() {
			return Err(Error::ShapeMismatch(format!(
				"permutation length {} does not match rank {}",
				perm.len(),
				dims.len()
			)));
		}
		let mut seen = vec![false; perm.len()];
		for &p in perm {
			if p >= perm.len() || std::mem::replace(&mut seen[p], true) {
				return Err(Error::ShapeMismatch(format!("{perm:?} is not a valid permutation")));
			}
		}

		if shape.is_dense() {
			return Ok(Shape::Dense {
				tile_count: shape.tile_count(),
			});
		}
		let bits = shape.bitset()?;

		let src_strides = row_major_strides(dims);
		let mut dst_dims = vec![0usize; dims.len()];
		for (d, &p) in perm.iter().enumerate() {
			dst_dims[p] = dims[d];
		}
		let dst_strides = row_major_strides(&dst_dims);

		let mut out = bitvec![0; bits.len()];
		for (ordinal, bit) in bits.iter().enumerate() {
			if !*bit {
				continue;
			}
			let src_coords = unravel(ordinal, dims, &src_strides);
			let mut dst_coords = vec![0usize; dims.len()];
			for (d, &p) in perm.iter().enumerate() {
				dst_coords[p] = src_coords[d];
			}
			let dst_ordinal: usize = dst_coords.iter().zip(&dst_strides).map(|(c, s)| c * s).sum();
			out.set(dst_ordinal, true);
		}
		Ok(Shape::Sparse { bits: out })
	}
}

fn check_same_tile_count(a: &Shape, b: &Shape) -> Result<()> {
	if a.tile_count() != b.tile_count() {
		return Err(Error::ShapeMismatch(format!(
			"tile counts differ: {} vs {}",
			a.tile_count(),
			b.tile_count()
		)));
	}
	Ok(())
}

fn row_major_strides(dims: &[usize]) -> Vec<usize> {
	let mut strides = vec![1usize; dims.len()];
	for d in (0..dims.len().saturating_sub(1)).rev() {
		strides[d] = strides[d + 1] * dims[d + 1];
	}
	strides
}

fn unravel(mut ordinal: usize, dims: &[usize], strides: &[usize]) -> Vec<usize> {
	let mut coords = vec![0usize; dims.len()];
	for d in 0..dims.len() {
		coords[d] = ordinal / strides[d];
		ordinal %= strides[d];
	}
	coords
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dense_is_never_zero() {
		let s = Shape::dense(4);
		assert!(s.is_dense());
		for k in 0..4 {
			assert!(!s.is_zero(k));
		}
		assert!(s.bitset().is_err());
	}

	/// Bitset `1011`: ordinal 1 is zero, ordinals 0, 2, 3 are present.
	#[test]
	fn sparse_bitset_marks_holes_correctly() {
		let s = Shape::sparse_from_ordinals(4, [0, 2, 3]);
		assert!(!s.is_dense());
		assert!(!s.is_zero(0));
		assert!(s.is_zero(1));
		assert!(!s.is_zero(2));
		assert!(!s.is_zero(3));
	}

	/// Product of two Sparse shapes is bitwise AND.
	#[test]
	fn product_of_sparse_is_and() {
		let a = Shape::sparse_from_ordinals(4, [0, 1, 2]);
		let b = Shape::sparse_from_ordinals(4, [1, 2, 3]);
		let c = Shape::product(&a, &b).unwrap();
		assert!(!c.is_dense());
		assert!(c.is_zero(0));
		assert!(!c.is_zero(1));
		assert!(!c.is_zero(2));
		assert!(c.is_zero(3));
	}

	#[test]
	fn sum_of_sparse_is_or() {
		let a = Shape::sparse_from_ordinals(4, [0]);
		let b = Shape::sparse_from_ordinals(4, [3]);
		let c = Shape::sum(&a, &b).unwrap();
		assert!(!c.is_zero(0));
		assert!(c.is_zero(1));
		assert!(c.is_zero(2));
		assert!(!c.is_zero(3));
	}

	#[test]
	fn dense_operand_makes_sum_dense() {
		let a = Shape::dense(4);
		let b = Shape::sparse_from_ordinals(4, [0]);
		let c = Shape::sum(&a, &b).unwrap();
		assert!(c.is_dense());
	}

	#[test]
	fn dense_operand_does_not_save_product_from_sparsity() {
		let a = Shape::dense(4);
		let b = Shape::sparse_from_ordinals(4, [1]);
		let c = Shape::product(&a, &b).unwrap();
		assert!(!c.is_dense());
		assert!(!c.is_zero(1));
		assert!(c.is_zero(0));
	}

	#[test]
	fn both_dense_product_is_dense() {
		let a = Shape::dense(4);
		let b = Shape::dense(4);
		assert!(Shape::product(&a, &b).unwrap().is_dense());
	}

	#[test]
	fn mismatched_tile_counts_are_rejected() {
		let a = Shape::dense(4);
		let b = Shape::dense(5);
		assert!(Shape::sum(&a, &b).is_err());
		assert!(Shape::product(&a, &b).is_err());
	}

	#[test]
	fn permute_transposes_a_2x3_grid() {
		// Row-major 2x3: ordinal = x*3 + y. Mark (x=0,y=2) -> ordinal 2, and (x=1,y=0) -> ordinal 3.
		let shape = Shape::sparse_from_ordinals(6, [2, 3]);
		let permuted = Shape::permute(&shape, &[2, 3], &[1, 0]).unwrap();
		// After swapping axes, new grid is 3x2 (dims reordered), ordinal = y*2 + x.
		// (x=0,y=2) -> (y=2,x=0) -> ordinal 2*2+0=4
		// (x=1,y=0) -> (y=0,x=1) -> ordinal 0*2+1=1
		assert!(!permuted.is_zero(4));
		assert!(!permuted.is_zero(1));
		assert_eq!(permuted.bitset().unwrap().count_ones(), 2);
	}

	#[test]
	fn permute_rejects_invalid_permutation() {
		let shape = Shape::sparse_from_ordinals(4, [0]);
		assert!(Shape::permute(&shape, &[2, 2], &[0, 0]).is_err());
		assert!(Shape::permute(&shape, &[2, 2], &[0]).is_err());
	}

	#[test]
	fn sparsity_reports_zero_fraction() {
		let s = Shape::sparse_from_ordinals(4, [0, 1]);
		assert!((s.sparsity() - 0.5).abs() < f64::EPSILON);
		assert_eq!(Shape::dense(4).sparsity(), 0.0);
	}
}
