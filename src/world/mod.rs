//! The collective context a store and a Pmap are bound to.
//!
//! This module specifies the `World` trait boundary the store's remote-resolution protocol is
//! built on, plus one concrete, in-process implementation ([`LocalCluster`] /
//! [`LocalWorld`](local::LocalWorld)) used by tests and single-process demos. A production
//! deployment supplies its own `World` backed by a real MPI-like transport; that transport is out
//! of scope for this crate (see the crate-level docs).

mod local;
pub use local::{LocalChannel, LocalCluster, LocalWorld, WireMessage};

use async_trait::async_trait;
use std::fmt::Debug;

/// The collective rank/size/fence surface a [`DistributedTileStore`](crate::store::DistributedTileStore)
/// is bound to.
#[async_trait]
pub trait World: Debug + Send + Sync {
	/// This process's rank, in `[0, size())`.
	fn rank(&self) -> usize;

	/// The number of processes in the world.
	fn size(&self) -> usize;

	/// A collective barrier: returns only once every process in the world has called `fence`.
	async fn fence(&self);

	/// A deterministic pseudo-random value derived from `seed` and this world's internal call
	/// counter. Used only for diagnostics and self-tests; the Hashed Pmap's `owner()` must stay
	/// a pure function of `(seed, k, P)`, never of this stream.
	fn rand(&self, seed: u64) -> u64;
}
