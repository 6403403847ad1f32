//! The wire-level boundary the store's remote-resolution protocol runs over.
//!
//! [`LocalChannel`](crate::world::LocalChannel) is the one concrete implementation this crate
//! ships; a production deployment backed by a real MPI-like transport supplies its own.

use crate::types::Tile;
use crate::world::{LocalChannel, WireMessage};
use async_trait::async_trait;
use std::sync::Arc;

/// The send/receive surface a [`DistributedTileStore`](super::DistributedTileStore) drives its
/// `REQ_TILE`/`REPLY_TILE` protocol over.
#[async_trait]
pub trait Transport<T>: Send + Sync {
	/// This endpoint's own rank.
	fn rank(&self) -> usize;

	/// Sends `REQ_TILE(ordinal)` to `dest`.
	fn send_req(&self, dest: usize, ordinal: usize);

	/// Sends `REPLY_TILE(ordinal, tile)` to `dest`. `None` means the ordinal resolved to empty.
	fn send_reply(&self, dest: usize, ordinal: usize, tile: Option<Arc<Tile<T>>>);

	/// Awaits the next incoming wire message addressed to this rank.
	async fn recv(&self) -> Option<WireMessage<T>>;
}

#[async_trait]
impl<T: Send + 'static> Transport<T> for LocalChannel<T> {
	fn rank(&self) -> usize {
		LocalChannel::rank(self)
	}

	fn send_req(&self, dest: usize, ordinal: usize) {
		LocalChannel::send_req(self, dest, ordinal)
	}

	fn send_reply(&self, dest: usize, ordinal: usize, tile: Option<Arc<Tile<T>>>) {
		LocalChannel::send_reply(self, dest, ordinal, tile)
	}

	async fn recv(&self) -> Option<WireMessage<T>> {
		LocalChannel::recv(self).await
	}
}
