//! Shape-propagation rules: the algebra that produces a binary expression's output `Shape`
//! from its operands' shapes, before any tile is computed.
//!
//! Element-wise sum, element-wise product, and permutation are thin wrappers over
//! [`Shape::sum`]/[`Shape::product`]/[`Shape::permute`]; contraction needs more context than a
//! `Shape` alone carries (which axes of each operand are free vs. contracted), so it lives here.

use crate::error::{Error, Result};
use crate::types::Shape;
use bitvec::prelude::*;
use itertools::Itertools;

/// Which axes of a binary contraction's two operands are free (survive into the output, in
/// left-to-right order of `free_a` then `free_b`) and which are contracted against each other.
///
/// `contracted_a[i]` and `contracted_b[i]` name the paired axis in each operand; the corresponding
/// tile-grid dimension sizes must agree.
#[derive(Debug, Clone)]
pub struct ContractionIndexMap {
	/// Axis indices of operand A that survive into the output, in output order.
	pub free_a: Vec<usize>,
	/// Axis indices of operand B that survive into the output, in output order (after `free_a`'s).
	pub free_b: Vec<usize>,
	/// Axis indices of operand A that are summed over.
	pub contracted_a: Vec<usize>,
	/// Axis indices of operand B that are summed over, paired positionally with `contracted_a`.
	pub contracted_b: Vec<usize>,
}

/// The element-wise sum shape: `shape_C[k] = shape_A[k] ∨ shape_B[k]`. Dense if either operand is
/// Dense.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if the operands describe different tile counts.
pub fn elementwise_sum(a: &Shape, b: &Shape) -> Result<Shape> {
	Shape::sum(a, b)
}

/// The element-wise (Hadamard) product shape: `shape_C[k] = shape_A[k] ∧ shape_B[k]`. Sparse
/// unless both operands are Dense.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if the operands describe different tile counts.
pub fn elementwise_product(a: &Shape, b: &Shape) -> Result<Shape> {
	Shape::product(a, b)
}

/// The permutation shape: `shape_C[π(i)] = shape_A[i]`.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if `perm` is not a valid permutation of `dims`'s axes.
pub fn permute(shape: &Shape, dims: &[usize], perm: &[usize]) -> Result<Shape> {
	Shape::permute(shape, dims, perm)
}

/// The contraction shape: `shape_C[i,j] = ∨_k (shape_A[i,k] ∧ shape_B[k,j])`, computed over the
/// tile grid. Dense only if both operands are Dense and every contracted dimension is non-empty.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if `map`'s axis counts disagree with `dims_a`/`dims_b`'s
/// ranks, or if paired contracted dimensions have different sizes.
pub fn contract(shape_a: &Shape, dims_a: &[usize], shape_b: &Shape, dims_b: &[usize], map: &ContractionIndexMap) -> Result<Shape> {
	if map.free_a.len() + map.contracted_a.len() != dims_a.len() {
		return Err(Error::ShapeMismatch("index map does not cover every axis of operand A".to_string()));
	}
	if map.free_b.len() + map.contracted_b.len() != dims_b.len() {
		return Err(Error::ShapeMismatch("index map does not cover every axis of operand B".to_string()));
	}
	if map.contracted_a.len() != map.contracted_b.len() {
		return Err(Error::ShapeMismatch("contracted axis counts disagree between operands".to_string()));
	}
	for (&ca, &cb) in map.contracted_a.iter().zip(&map.contracted_b) {
		if dims_a[ca] != dims_b[cb] {
			return Err(Error::ShapeMismatch(format!(
				"contracted dimension sizes disagree: {} (A axis {ca}) vs {} (B axis {cb})",
				dims_a[ca], dims_b[cb]
			)));
		}
	}

	let contracted_dims: Vec<usize> = map.contracted_a.iter().map(|&ca| dims_a[ca]).collect();
	let contracted_nonempty = contracted_dims.iter().all(|&d| d > 0);

	let free_a_dims: Vec<usize> = map.free_a.iter().map(|&a| dims_a[a]).collect();
	let free_b_dims: Vec<usize> = map.free_b.iter().map(|&b| dims_b[b]).collect();
	let out_tile_count: usize = free_a_dims.iter().chain(&free_b_dims).product();

	if shape_a.is_dense() && shape_b.is_dense() && contracted_nonempty {
		return Ok(Shape::Dense { tile_count: out_tile_count });
	}

	let strides_a = row_major_strides(dims_a);
	let strides_b = row_major_strides(dims_b);

	let free_a_ranges: Vec<std::ops::Range<usize>> = free_a_dims.iter().map(|&d| 0..d).collect();
	let free_b_ranges: Vec<std::ops::Range<usize>> = free_b_dims.iter().map(|&d| 0..d).collect();
	let contracted_ranges: Vec<std::ops::Range<usize>> = contracted_dims.iter().map(|&d| 0..d).collect();

	let mut bits = bitvec![0; out_tile_count];
	let mut out_ordinal = 0usize;
	for free_a_coords in cartesian(&free_a_ranges) {
		for free_b_coords in cartesian(&free_b_ranges) {
			let mut nonzero = false;
			for contracted_coords in cartesian(&contracted_ranges) {
				let ordinal_a = full_ordinal(dims_a.len(), &map.free_a, &free_a_coords, &map.contracted_a, &contracted_coords, &strides_a);
				let ordinal_b = full_ordinal(dims_b.len(), &map.free_b, &free_b_coords, &map.contracted_b, &contracted_coords, &strides_b);
				if !shape_a.is_zero(ordinal_a) && !shape_b.is_zero(ordinal_b) {
					nonzero = true;
					break;
				}
			}
			bits.set(out_ordinal, nonzero);
			out_ordinal += 1;
		}
	}
	Ok(Shape::Sparse { bits })
}

fn row_major_strides(dims: &[usize]) -> Vec<usize> {
	let mut strides = vec![1usize; dims.len()];
	for d in (0..dims.len().saturating_sub(1)).rev() {
		strides[d] = strides[d + 1] * dims[d + 1];
	}
	strides
}

fn full_ordinal(rank: usize, free_axes: &[usize], free_coords: &[usize], contracted_axes: &[usize], contracted_coords: &[usize], strides: &[usize]) -> usize {
	let mut coords = vec![0usize; rank];
	for (&axis, &c) in free_axes.iter().zip(free_coords) {
		coords[axis] = c;
	}
	for (&axis, &c) in contracted_axes.iter().zip(contracted_coords) {
		coords[axis] = c;
	}
	coords.iter().zip(strides).map(|(c, s)| c * s).sum()
}

/// The cartesian product of a list of `Range<usize>`, each yielded as a `Vec<usize>` of one
/// coordinate per range, in row-major order (the first range varies slowest). Empty `ranges`
/// yields exactly one empty coordinate vector (the degenerate rank-0 case).
fn cartesian(ranges: &[std::ops::Range<usize>]) -> Vec<Vec<usize>> {
	if ranges.is_empty() {
		return vec![Vec::new()];
	}
	ranges.iter().cloned().multi_cartesian_product().collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Contraction shape equals the OR over the contracted axis of bitwise-ANDs, computed over
	/// the tile grid.
	#[test]
	fn contraction_is_or_of_ands_over_contracted_axis() {
		// A is 2x2 (rows free, cols contracted): [[1,0],[1,1]] nonzero pattern.
		let a = Shape::sparse_from_ordinals(4, [0, 2, 3]);
		// B is 2x2 (rows contracted, cols free): [[1,1],[0,1]] nonzero pattern.
		let b = Shape::sparse_from_ordinals(4, [0, 1, 3]);
		let map = ContractionIndexMap {
			free_a: vec![0],
			free_b: vec![1],
			contracted_a: vec![1],
			contracted_b: vec![0],
		};
		let c = contract(&a, &[2, 2], &b, &[2, 2], &map).unwrap();
		assert_eq!(c.tile_count(), 4);
		// C[0,0] = A[0,0]&B[0,0] | A[0,1]&B[1,0] = (1&1)|(0&0) = 1
		assert!(!c.is_zero(0));
		// C[0,1] = A[0,0]&B[0,1] | A[0,1]&B[1,1] = (1&1)|(0&1) = 1
		assert!(!c.is_zero(1));
		// C[1,0] = A[1,0]&B[0,0] | A[1,1]&B[1,0] = (1&1)|(1&0) = 1
		assert!(!c.is_zero(2));
		// C[1,1] = A[1,0]&B[0,1] | A[1,1]&B[1,1] = (1&1)|(1&1) = 1
		assert!(!c.is_zero(3));
	}

	#[test]
	fn contraction_over_empty_operand_is_all_zero() {
		let a = Shape::sparse_from_ordinals(2, []);
		let b = Shape::sparse_from_ordinals(2, [0, 1]);
		let map = ContractionIndexMap {
			free_a: vec![],
			free_b: vec![1],
			contracted_a: vec![0],
			contracted_b: vec![0],
		};
		let c = contract(&a, &[2], &b, &[2, 1], &map).unwrap();
		assert_eq!(c.tile_count(), 1);
		assert!(c.is_zero(0));
	}

	#[test]
	fn dense_operands_with_nonempty_contraction_stay_dense() {
		let a = Shape::dense(4);
		let b = Shape::dense(4);
		let map = ContractionIndexMap {
			free_a: vec![0],
			free_b: vec![1],
			contracted_a: vec![1],
			contracted_b: vec![0],
		};
		let c = contract(&a, &[2, 2], &b, &[2, 2], &map).unwrap();
		assert!(c.is_dense());
	}

	#[test]
	fn mismatched_contracted_dimensions_are_rejected() {
		let a = Shape::dense(6);
		let b = Shape::dense(4);
		let map = ContractionIndexMap {
			free_a: vec![0],
			free_b: vec![1],
			contracted_a: vec![1],
			contracted_b: vec![0],
		};
		assert!(contract(&a, &[2, 3], &b, &[2, 2], &map).is_err());
	}

	#[test]
	fn elementwise_wrappers_delegate_to_shape() {
		let a = Shape::sparse_from_ordinals(2, [0]);
		let b = Shape::sparse_from_ordinals(2, [1]);
		assert_eq!(elementwise_sum(&a, &b).unwrap(), Shape::sum(&a, &b).unwrap());
		assert_eq!(elementwise_product(&a, &b).unwrap(), Shape::product(&a, &b).unwrap());
		assert_eq!(permute(&a, &[2], &[0]).unwrap(), Shape::permute(&a, &[2], &[0]).unwrap());
	}
}
