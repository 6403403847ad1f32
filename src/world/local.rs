//! An in-process `World` that multiplexes simulated ranks over `tokio` tasks and channels.
//!
//! `LocalWorld` gives the store something real to drive in tests and single-machine demos without
//! a network dependency. A `LocalCluster` owns the shared barrier every rank's `fence()` waits on,
//! plus the ability to open a private [`LocalChannel<T>`] per distributed array: one store's
//! `REQ_TILE`/`REPLY_TILE` traffic never crosses into another's.

use super::World;
use crate::types::Tile;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Barrier};

/// Shared state backing every [`LocalWorld`] cut from the same cluster: the rank count and the
/// collective barrier `fence()` waits on.
#[derive(Debug)]
pub struct LocalCluster {
	size: usize,
	barrier: Arc<Barrier>,
}

impl LocalCluster {
	/// Builds a cluster of `size` simulated ranks.
	pub fn new(size: usize) -> Self {
		Self {
			size,
			barrier: Arc::new(Barrier::new(size.max(1))),
		}
	}

	/// The number of ranks in this cluster.
	pub fn size(&self) -> usize {
		self.size
	}

	/// A `World` handle for `rank`.
	///
	/// # Panics
	/// Panics if `rank >= size()`.
	pub fn rank_world(&self, rank: usize) -> LocalWorld {
		assert!(rank < self.size, "rank {rank} out of range for cluster of size {}", self.size);
		LocalWorld {
			rank,
			size: self.size,
			barrier: self.barrier.clone(),
			call_counter: Arc::new(AtomicU64::new(0)),
		}
	}

	/// Opens a new private channel shared by all ranks of this cluster, for one store's wire
	/// traffic. Returns one endpoint per rank, in rank order.
	pub fn open_channel<T: Send + 'static>(&self) -> Vec<LocalChannel<T>> {
		let (senders, receivers): (Vec<_>, Vec<_>) = (0..self.size).map(|_| mpsc::unbounded_channel::<WireMessage<T>>()).unzip();

		receivers
			.into_iter()
			.enumerate()
			.map(|(rank, inbox)| LocalChannel {
				rank,
				outboxes: senders.clone(),
				inbox: tokio::sync::Mutex::new(inbox),
			})
			.collect()
	}
}

/// A `World` handle for one simulated rank.
#[derive(Debug, Clone)]
pub struct LocalWorld {
	rank: usize,
	size: usize,
	barrier: Arc<Barrier>,
	call_counter: Arc<AtomicU64>,
}

#[async_trait]
impl World for LocalWorld {
	fn rank(&self) -> usize {
		self.rank
	}

	fn size(&self) -> usize {
		self.size
	}

	async fn fence(&self) {
		self.barrier.wait().await;
	}

	fn rand(&self, seed: u64) -> u64 {
		let call_index = self.call_counter.fetch_add(1, Ordering::Relaxed);
		splitmix64(seed.wrapping_add(call_index))
	}
}

fn splitmix64(mut x: u64) -> u64 {
	x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
	let mut z = x;
	z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
	z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
	z ^ (z >> 31)
}

/// The two wire messages the store's remote-resolution protocol exchanges.
pub enum WireMessage<T> {
	/// `REQ_TILE(k)`: sender → `owner(k)`.
	ReqTile {
		/// The requesting rank.
		from: usize,
		/// The ordinal being requested.
		ordinal: usize,
	},
	/// `REPLY_TILE(k, tile|empty)`: owner → requester. `None` means the ordinal resolved to the
	/// empty tile (either structurally zero or absent after `process_pending`).
	ReplyTile {
		/// The ordinal this reply answers.
		ordinal: usize,
		/// The resolved tile, or `None` for an empty/absent tile.
		tile: Option<Arc<Tile<T>>>,
	},
}

/// One rank's private endpoint on a [`LocalCluster`]-wide channel dedicated to a single store's
/// wire traffic.
pub struct LocalChannel<T> {
	rank: usize,
	outboxes: Vec<mpsc::UnboundedSender<WireMessage<T>>>,
	inbox: tokio::sync::Mutex<mpsc::UnboundedReceiver<WireMessage<T>>>,
}

impl<T> LocalChannel<T> {
	/// This endpoint's own rank.
	pub(crate) fn rank(&self) -> usize {
		self.rank
	}

	/// Sends `REQ_TILE(ordinal)` to `dest`.
	pub(crate) fn send_req(&self, dest: usize, ordinal: usize) {
		let _ = self.outboxes[dest].send(WireMessage::ReqTile { from: self.rank, ordinal });
	}

	/// Sends `REPLY_TILE(ordinal, tile)` to `dest`.
	pub(crate) fn send_reply(&self, dest: usize, ordinal: usize, tile: Option<Arc<Tile<T>>>) {
		let _ = self.outboxes[dest].send(WireMessage::ReplyTile { ordinal, tile });
	}

	/// Awaits the next incoming wire message for this rank.
	pub(crate) async fn recv(&self) -> Option<WireMessage<T>> {
		self.inbox.lock().await.recv().await
	}
}
