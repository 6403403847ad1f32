//! Process maps: the pure, deterministic function from tile ordinal to owning process.
//!
//! Four variants are provided: [`BlockedPmap`], [`CyclicPmap`], [`HashedPmap`], and
//! [`ReplicatedPmap`], covering the load-balancing strategies applications pick between at array
//! creation.

mod blocked;
pub use blocked::BlockedPmap;

mod cyclic;
pub use cyclic::CyclicPmap;

mod hashed;
pub use hashed::HashedPmap;

mod replicated;
pub use replicated::ReplicatedPmap;

use crate::error::{Error, Result};
use std::fmt::Debug;

/// A pure, deterministic function from tile ordinal to owning process, plus the set of ordinals
/// local to the current process.
///
/// Implementations must be pure for their lifetime: the same `(world_size, size, seed)` always
/// yields the same `owner(k)` on every process.
pub trait Pmap: Debug + Send + Sync {
	/// The number of tiles this map assigns ownership over.
	fn size(&self) -> usize;

	/// The number of processes participating in this map.
	fn num_processes(&self) -> usize;

	/// This map's own process rank.
	fn rank(&self) -> usize;

	/// The process that owns tile ordinal `k`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `k >= size()`.
	fn owner(&self, k: usize) -> Result<usize>;

	/// Whether tile ordinal `k` is owned by this map's own process.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `k >= size()`.
	fn is_local(&self, k: usize) -> Result<bool> {
		Ok(self.owner(k)? == self.rank())
	}

	/// The ordinals owned by this map's own process, in ascending order.
	fn local_ordinals(&self) -> &[usize];
}

pub(crate) fn check_bounds(k: usize, size: usize) -> Result<()> {
	if k >= size {
		return Err(Error::out_of_range("tile ordinal", format!("{k} not in [0, {size})")));
	}
	Ok(())
}

pub(crate) fn compute_local_ordinals(size: usize, rank: usize, owner: impl Fn(usize) -> usize) -> Vec<usize> {
	(0..size).filter(|&k| owner(k) == rank).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::Pmap;
	use std::collections::HashMap;

	/// Checks that every ordinal has exactly one owner in `[0, P)`, and the
	/// union over all processes' local sets is a disjoint partition of `[0, size)`.
	pub fn assert_partition(maps: &[Box<dyn Pmap>]) {
		let size = maps[0].size();
		let num_processes = maps[0].num_processes();
		assert_eq!(maps.len(), num_processes, "one Pmap instance per rank is expected");

		let mut owner_of: HashMap<usize, usize> = HashMap::new();
		for k in 0..size {
			let owner = maps[0].owner(k).unwrap();
			assert!(owner < num_processes, "owner {owner} out of range for P={num_processes}");
			owner_of.insert(k, owner);
			for map in maps {
				assert_eq!(map.owner(k).unwrap(), owner, "owner(k) must agree across all ranks");
			}
		}

		for (rank, map) in maps.iter().enumerate() {
			let expected: Vec<usize> = (0..size).filter(|k| owner_of[k] == rank).collect();
			assert_eq!(map.local_ordinals(), expected.as_slice());
		}
	}
}

#[cfg(test)]
mod partition_property_tests {
	use super::test_support::assert_partition;
	use super::Pmap;
	use crate::pmap::{BlockedPmap, CyclicPmap, HashedPmap, ReplicatedPmap};
	use rstest::rstest;

	#[rstest]
	#[case(20, 4)]
	#[case(7, 3)]
	#[case(1, 1)]
	#[case(100, 10)]
	fn blocked_partitions_for_any_size_and_process_count(#[case] size: usize, #[case] num_processes: usize) {
		let maps: Vec<Box<dyn Pmap>> = (0..num_processes)
			.map(|rank| Box::new(BlockedPmap::new(size, num_processes, rank)) as Box<dyn Pmap>)
			.collect();
		assert_partition(&maps);
	}

	#[rstest]
	#[case(4, 4, 2, 2)]
	#[case(3, 3, 3, 1)]
	#[case(1, 1, 1, 1)]
	fn cyclic_partitions_for_any_process_grid(#[case] tile_rows: usize, #[case] tile_cols: usize, #[case] proc_rows: usize, #[case] proc_cols: usize) {
		let maps: Vec<Box<dyn Pmap>> = (0..proc_rows * proc_cols)
			.map(|rank| Box::new(CyclicPmap::new(tile_rows, tile_cols, proc_rows, proc_cols, rank)) as Box<dyn Pmap>)
			.collect();
		assert_partition(&maps);
	}

	#[rstest]
	#[case(100, 5)]
	#[case(13, 4)]
	#[case(1, 1)]
	fn hashed_partitions_for_any_size_and_process_count(#[case] size: usize, #[case] num_processes: usize) {
		let maps: Vec<Box<dyn Pmap>> = (0..num_processes)
			.map(|rank| Box::new(HashedPmap::new(size, num_processes, rank, 42)) as Box<dyn Pmap>)
			.collect();
		assert_partition(&maps);
	}

	#[rstest]
	#[case(10, 3)]
	#[case(1, 1)]
	fn replicated_is_not_a_partition_but_every_rank_owns_everything(#[case] size: usize, #[case] num_processes: usize) {
		for rank in 0..num_processes {
			let map = ReplicatedPmap::new(size, num_processes, rank);
			for k in 0..size {
				assert!(map.is_local(k).unwrap());
			}
		}
	}
}
