//! Balanced contiguous ownership: `owner(k) = k / ceil(size / P)`.

use super::{check_bounds, compute_local_ordinals, Pmap};
use crate::error::Result;

/// Splits `size` tiles into `num_processes` contiguous, near-equal blocks.
///
/// `owner(k) = k / ceil(size / P)`. The last process may own a smaller tail block when `size`
/// does not divide evenly.
#[derive(Debug, Clone)]
pub struct BlockedPmap {
	size: usize,
	num_processes: usize,
	rank: usize,
	block_size: usize,
	local_ordinals: Vec<usize>,
}

impl BlockedPmap {
	/// Builds a `BlockedPmap` over `size` tiles, `num_processes` processes, for this process's
	/// `rank`.
	pub fn new(size: usize, num_processes: usize, rank: usize) -> Self {
		let block_size = size.div_ceil(num_processes.max(1)).max(1);
		let owner = |k: usize| (k / block_size).min(num_processes - 1);
		let local_ordinals = compute_local_ordinals(size, rank, owner);
		Self {
			size,
			num_processes,
			rank,
			block_size,
			local_ordinals,
		}
	}
}

impl Pmap for BlockedPmap {
	fn size(&self) -> usize {
		self.size
	}

	fn num_processes(&self) -> usize {
		self.num_processes
	}

	fn rank(&self) -> usize {
		self.rank
	}

	fn owner(&self, k: usize) -> Result<usize> {
		check_bounds(k, self.size)?;
		Ok((k / self.block_size).min(self.num_processes - 1))
	}

	fn local_ordinals(&self) -> &[usize] {
		&self.local_ordinals
	}
}
