//! Randomised load-balancing via a seeded, seed-combining hash.

use super::{check_bounds, compute_local_ordinals, Pmap};
use crate::error::Result;

/// Maps tile ordinals to processes via a fast, non-cryptographic hash combined with a caller-
/// supplied seed, so several distinct `HashedPmap`s can coexist deterministically on the same
/// world by choosing different seeds.
#[derive(Debug, Clone)]
pub struct HashedPmap {
	size: usize,
	num_processes: usize,
	rank: usize,
	seed: u64,
	local_ordinals: Vec<usize>,
}

impl HashedPmap {
	/// Builds a `HashedPmap` over `size` tiles, `num_processes` processes, for this process's
	/// `rank`, hashed with `seed`.
	pub fn new(size: usize, num_processes: usize, rank: usize, seed: u64) -> Self {
		let owner = |k: usize| Self::owner_raw(k, seed, num_processes);
		let local_ordinals = compute_local_ordinals(size, rank, owner);
		Self {
			size,
			num_processes,
			rank,
			seed,
			local_ordinals,
		}
	}

	/// The seed distinguishing this map from other `HashedPmap`s on the same world.
	pub fn seed(&self) -> u64 {
		self.seed
	}

	fn owner_raw(k: usize, seed: u64, num_processes: usize) -> usize {
		(seed_combine(seed, k) % num_processes as u64) as usize
	}
}

/// Combines `seed` with the hash of `value`, in the spirit of Boost's `hash_combine`.
fn seed_combine(seed: u64, value: usize) -> u64 {
	let h = fxhash::hash64(&value);
	seed ^ h
		.wrapping_add(0x9e37_79b9_7f4a_7c15)
		.wrapping_add(seed << 6)
		.wrapping_add(seed >> 2)
}

impl Pmap for HashedPmap {
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
		Ok(Self::owner_raw(k, self.seed, self.num_processes))
	}

	fn local_ordinals(&self) -> &[usize] {
		&self.local_ordinals
	}
}
