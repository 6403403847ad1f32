//! 2-D cyclic ownership for matrix-shaped tile grids.

use super::{check_bounds, compute_local_ordinals, Pmap};
use crate::error::Result;

/// Maps an `m`×`n` tile grid onto a `proc_rows`×`proc_cols` process grid cyclically: tile `(i, j)`
/// is owned by process `(i mod proc_rows, j mod proc_cols)`.
///
/// Tile ordinals are row-major over the `m`×`n` grid, so `owner(k) = ((k / n) mod proc_rows) *
/// proc_cols + ((k mod n) mod proc_cols)`.
#[derive(Debug, Clone)]
pub struct CyclicPmap {
	tile_rows: usize,
	tile_cols: usize,
	proc_rows: usize,
	proc_cols: usize,
	rank: usize,
	local_ordinals: Vec<usize>,
}

impl CyclicPmap {
	/// Builds a `CyclicPmap` over a `tile_rows`×`tile_cols` tile grid, distributed across a
	/// `proc_rows`×`proc_cols` process grid, for this process's `rank`.
	pub fn new(tile_rows: usize, tile_cols: usize, proc_rows: usize, proc_cols: usize, rank: usize) -> Self {
		let owner = |k: usize| Self::owner_raw(k, tile_cols, proc_rows, proc_cols);
		let local_ordinals = compute_local_ordinals(tile_rows * tile_cols, rank, owner);
		Self {
			tile_rows,
			tile_cols,
			proc_rows,
			proc_cols,
			rank,
			local_ordinals,
		}
	}

	fn owner_raw(k: usize, tile_cols: usize, proc_rows: usize, proc_cols: usize) -> usize {
		let row = k / tile_cols;
		let col = k % tile_cols;
		(row % proc_rows) * proc_cols + (col % proc_cols)
	}
}

impl Pmap for CyclicPmap {
	fn size(&self) -> usize {
		self.tile_rows * self.tile_cols
	}

	fn num_processes(&self) -> usize {
		self.proc_rows * self.proc_cols
	}

	fn rank(&self) -> usize {
		self.rank
	}

	fn owner(&self, k: usize) -> Result<usize> {
		check_bounds(k, self.size())?;
		Ok(Self::owner_raw(k, self.tile_cols, self.proc_rows, self.proc_cols))
	}

	fn local_ordinals(&self) -> &[usize] {
		&self.local_ordinals
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pmap::test_support::assert_partition;

	/// A 2x2 process grid over a 4x4 tile grid.
	#[test]
	fn cyclic_ownership_over_2x2_process_grid() {
		let map = CyclicPmap::new(4, 4, 2, 2, 0);
		let ord = |i: usize, j: usize| i * 4 + j;
		assert_eq!(map.owner(ord(0, 0)).unwrap(), 0);
		assert_eq!(map.owner(ord(0, 1)).unwrap(), 1);
		assert_eq!(map.owner(ord(1, 0)).unwrap(), 2);
		assert_eq!(map.owner(ord(1, 1)).unwrap(), 3);
		assert_eq!(map.owner(ord(2, 2)).unwrap(), 0);
	}

	#[test]
	fn every_ordinal_has_exactly_one_owner() {
		let maps: Vec<Box<dyn crate::pmap::Pmap>> = (0..4)
			.map(|rank| Box::new(CyclicPmap::new(4, 4, 2, 2, rank)) as Box<dyn crate::pmap::Pmap>)
			.collect();
		assert_partition(&maps);
	}

	#[test]
	fn out_of_range_ordinal_is_rejected() {
		let map = CyclicPmap::new(4, 4, 2, 2, 0);
		assert!(map.owner(16).is_err());
	}
}
