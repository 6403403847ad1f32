//! Every process owns every tile: `owner(k) = self` everywhere.

use super::{check_bounds, Pmap};
use crate::error::Result;

/// Every process considers itself the owner of every tile, appropriate for small, broadcast
/// operands where replicating the whole array is cheaper than distributing it.
#[derive(Debug, Clone)]
pub struct ReplicatedPmap {
	size: usize,
	num_processes: usize,
	rank: usize,
	local_ordinals: Vec<usize>,
}

impl ReplicatedPmap {
	/// Builds a `ReplicatedPmap` over `size` tiles, `num_processes` processes, for this process's
	/// `rank`.
	pub fn new(size: usize, num_processes: usize, rank: usize) -> Self {
		Self {
			size,
			num_processes,
			rank,
			local_ordinals: (0..size).collect(),
		}
	}
}

impl Pmap for ReplicatedPmap {
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
		Ok(self.rank)
	}

	fn is_local(&self, k: usize) -> Result<bool> {
		check_bounds(k, self.size)?;
		Ok(true)
	}

	fn local_ordinals(&self) -> &[usize] {
		&self.local_ordinals
	}
}
