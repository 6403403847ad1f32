//! The per-ordinal one-shot cell: the unit the store's resolution protocol operates on.

use crate::error::{Error, Result};
use crate::types::Tile;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

enum CellState<T> {
	Unresolved {
		/// Local `find()` callers awaiting resolution.
		local_waiters: Vec<oneshot::Sender<Arc<Tile<T>>>>,
		/// Remote requester ranks awaiting a `REPLY_TILE`. Only populated on cells this process
		/// owns.
		remote_waiters: Vec<usize>,
	},
	Resolved(Arc<Tile<T>>),
}

/// A one-shot, multi-waiter resolvable cell for a single tile ordinal.
///
/// Guarded by a `parking_lot::Mutex` rather than an async mutex: every critical section below is
/// a plain vector push/drain, never held across an `.await`.
pub(crate) struct Cell<T> {
	state: Mutex<CellState<T>>,
}

impl<T> Cell<T> {
	pub(crate) fn unresolved() -> Self {
		Self {
			state: Mutex::new(CellState::Unresolved {
				local_waiters: Vec::new(),
				remote_waiters: Vec::new(),
			}),
		}
	}

	pub(crate) fn resolved(value: Arc<Tile<T>>) -> Self {
		Self {
			state: Mutex::new(CellState::Resolved(value)),
		}
	}

	pub(crate) fn is_resolved(&self) -> bool {
		matches!(*self.state.lock(), CellState::Resolved(_))
	}

	pub(crate) fn get_if_resolved(&self) -> Option<Arc<Tile<T>>> {
		match &*self.state.lock() {
			CellState::Resolved(value) => Some(value.clone()),
			CellState::Unresolved { .. } => None,
		}
	}

	/// Registers a new local waiter, returning a [`FutureTile`] that resolves once this cell is
	/// set (or immediately, if it already is).
	pub(crate) fn subscribe(&self, ordinal: usize) -> FutureTile<T> {
		let mut state = self.state.lock();
		match &mut *state {
			CellState::Resolved(value) => FutureTile::ready(value.clone()),
			CellState::Unresolved { local_waiters, .. } => {
				let (tx, rx) = oneshot::channel();
				local_waiters.push(tx);
				FutureTile::pending(ordinal, rx)
			}
		}
	}

	/// Registers a remote requester. If the cell is already resolved, returns the value so the
	/// caller can reply immediately; otherwise the rank is queued for when `resolve` runs.
	pub(crate) fn add_remote_waiter(&self, rank: usize) -> Option<Arc<Tile<T>>> {
		let mut state = self.state.lock();
		match &mut *state {
			CellState::Resolved(value) => Some(value.clone()),
			CellState::Unresolved { remote_waiters, .. } => {
				remote_waiters.push(rank);
				None
			}
		}
	}

	/// Resolves the cell to `value`, fulfilling every local and remote waiter.
	///
	/// Returns the ranks that were waiting remotely, so the caller can send them
	/// `REPLY_TILE(ordinal, value)`.
	///
	/// # Errors
	/// Returns [`Error::AlreadySet`] if the cell was already resolved.
	pub(crate) fn resolve(&self, ordinal: usize, value: Arc<Tile<T>>) -> Result<Vec<usize>> {
		let mut state = self.state.lock();
		let (local_waiters, remote_waiters) = match std::mem::replace(&mut *state, CellState::Resolved(value.clone())) {
			CellState::Resolved(_) => {
				// Restore prior (already-resolved) state; this call must not clobber it.
				*state = CellState::Resolved(value);
				return Err(Error::AlreadySet { ordinal });
			}
			CellState::Unresolved {
				local_waiters,
				remote_waiters,
			} => (local_waiters, remote_waiters),
		};
		drop(state);

		for tx in local_waiters {
			let _ = tx.send(value.clone());
		}
		Ok(remote_waiters)
	}
}

/// A one-shot future resolving to a tile, returned by
/// [`DistributedTileStore::find`](crate::store::DistributedTileStore::find).
///
/// Never blocks the calling thread: constructing one never suspends, only polling/awaiting it
/// does, and only when the backing cell is not yet resolved.
pub struct FutureTile<T> {
	ordinal: usize,
	inner: FutureTileInner<T>,
}

enum FutureTileInner<T> {
	Ready(Option<Arc<Tile<T>>>),
	Pending(oneshot::Receiver<Arc<Tile<T>>>),
}

impl<T> FutureTile<T> {
	pub(crate) fn ready(value: Arc<Tile<T>>) -> Self {
		Self {
			ordinal: 0,
			inner: FutureTileInner::Ready(Some(value)),
		}
	}

	pub(crate) fn pending(ordinal: usize, rx: oneshot::Receiver<Arc<Tile<T>>>) -> Self {
		Self {
			ordinal,
			inner: FutureTileInner::Pending(rx),
		}
	}
}

impl<T> Future for FutureTile<T> {
	type Output = Result<Arc<Tile<T>>>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.get_mut();
		match &mut this.inner {
			FutureTileInner::Ready(value) => Poll::Ready(Ok(value.take().expect("FutureTile polled after completion"))),
			FutureTileInner::Pending(rx) => Pin::new(rx).poll(cx).map(|result| {
				result.map_err(|_| Error::TransportError {
					ordinal: this.ordinal,
					message: "owner dropped before replying".to_string(),
				})
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::ElementRange;

	fn sample_tile() -> Arc<Tile<i32>> {
		Arc::new(Tile::broadcast(ElementRange::new(vec![0..2]), 7))
	}

	#[tokio::test]
	async fn resolved_cell_resolves_immediately() {
		let cell: Cell<i32> = Cell::resolved(sample_tile());
		let value = cell.subscribe(0).await.unwrap();
		assert_eq!(value.data(), &[7, 7]);
	}

	#[tokio::test]
	async fn unresolved_cell_resolves_after_set() {
		let cell: Cell<i32> = Cell::unresolved();
		let fut = cell.subscribe(0);
		cell.resolve(0, sample_tile()).unwrap();
		let value = fut.await.unwrap();
		assert_eq!(value.data(), &[7, 7]);
	}

	#[tokio::test]
	async fn multiple_waiters_receive_the_same_value() {
		let cell: Cell<i32> = Cell::unresolved();
		let a = cell.subscribe(0);
		let b = cell.subscribe(0);
		cell.resolve(0, sample_tile()).unwrap();
		let (va, vb) = (a.await.unwrap(), b.await.unwrap());
		assert!(Arc::ptr_eq(&va, &vb));
	}

	#[test]
	fn double_resolve_is_rejected() {
		let cell: Cell<i32> = Cell::unresolved();
		cell.resolve(0, sample_tile()).unwrap();
		assert!(matches!(cell.resolve(0, sample_tile()), Err(Error::AlreadySet { ordinal: 0 })));
	}

	#[test]
	fn remote_waiter_on_resolved_cell_gets_value_immediately() {
		let cell: Cell<i32> = Cell::resolved(sample_tile());
		let value = cell.add_remote_waiter(3).unwrap();
		assert_eq!(value.data(), &[7, 7]);
	}

	#[test]
	fn remote_waiter_on_unresolved_cell_is_queued() {
		let cell: Cell<i32> = Cell::unresolved();
		assert!(cell.add_remote_waiter(3).is_none());
		let remote_waiters = cell.resolve(0, sample_tile()).unwrap();
		assert_eq!(remote_waiters, vec![3]);
	}
}
