//! The asynchronous, owner-authoritative tile store: the core of this crate.

use super::cell::{Cell, FutureTile};
use super::transport::Transport;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pmap::Pmap;
use crate::types::{ElementRange, Shape, Tile};
use crate::world::WireMessage;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A pending `reduce` accumulation for one ordinal: an element range plus the partial sums staged
/// so far, combined element-wise as each `reduce` call arrives.
struct Staging<T> {
	range: ElementRange,
	values: Vec<T>,
}

struct StoreInner<T, Tr> {
	pmap: Arc<dyn Pmap>,
	shape: Shape,
	transport: Tr,
	local_cells: DashMap<usize, Arc<Cell<T>>>,
	remote_cells: DashMap<usize, RemoteCellEntry<T>>,
	staging: DashMap<usize, Mutex<Option<Staging<T>>>>,
	/// Bounds how many `REQ_TILE` services the background server task runs at once.
	request_permits: Arc<Semaphore>,
}

/// A remote ordinal's cell plus a latch tracking whether `REQ_TILE` has already been sent for it,
/// so repeated local `find` calls coalesce onto one outstanding request.
struct RemoteCellEntry<T> {
	cell: Arc<Cell<T>>,
	requested: AtomicBool,
}

impl<T, Tr> StoreInner<T, Tr> {
	fn local_cell(&self, k: usize) -> Arc<Cell<T>> {
		self.local_cells.entry(k).or_insert_with(|| Arc::new(Cell::unresolved())).clone()
	}

	fn remote_cell(&self, k: usize) -> Arc<Cell<T>> {
		self.remote_cells
			.entry(k)
			.or_insert_with(|| RemoteCellEntry {
				cell: Arc::new(Cell::unresolved()),
				requested: AtomicBool::new(false),
			})
			.cell
			.clone()
	}
}

/// The asynchronous, owner-authoritative tile store.
///
/// A value type over a reference-counted interior (the "shared-pointer handle" pattern the source
/// runtime uses, re-expressed per this crate's design notes): cloning a `DistributedTileStore`
/// clones a handle, not the store's contents. The store spawns a background task on construction
/// that services incoming `REQ_TILE`/`REPLY_TILE` traffic for as long as any handle (or the task
/// itself) is alive.
pub struct DistributedTileStore<T, Tr> {
	inner: Arc<StoreInner<T, Tr>>,
}

impl<T, Tr> Clone for DistributedTileStore<T, Tr> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}

impl<T, Tr> DistributedTileStore<T, Tr>
where
	T: Send + Sync + 'static,
	Tr: Transport<T> + Send + Sync + 'static,
{
	/// Builds a store over `shape` (`shape.tile_count()` must equal `pmap.size()`), owned according
	/// to `pmap`, driving its wire protocol over `transport`, with default concurrency limits.
	///
	/// Spawns the background task that services incoming `REQ_TILE`/`REPLY_TILE` messages.
	///
	/// # Errors
	/// Returns [`Error::ShapeMismatch`] if `shape.tile_count() != pmap.size()`, or
	/// [`Error::InvariantViolation`] if `transport`'s rank disagrees with `pmap`'s.
	pub fn new(pmap: Arc<dyn Pmap>, shape: Shape, transport: Tr) -> Result<Self> {
		Self::new_with_config(pmap, shape, transport, Config::default())
	}

	/// As [`new`](Self::new), with explicit concurrency limits.
	///
	/// # Errors
	/// Returns [`Error::ShapeMismatch`] if `shape.tile_count() != pmap.size()`, or
	/// [`Error::InvariantViolation`] if `transport`'s rank disagrees with `pmap`'s.
	pub fn new_with_config(pmap: Arc<dyn Pmap>, shape: Shape, transport: Tr, config: Config) -> Result<Self> {
		if shape.tile_count() != pmap.size() {
			return Err(Error::ShapeMismatch(format!(
				"shape has {} tiles but pmap covers {}",
				shape.tile_count(),
				pmap.size()
			)));
		}
		if transport.rank() != pmap.rank() {
			return Err(Error::InvariantViolation(format!(
				"transport rank {} does not match pmap rank {}",
				transport.rank(),
				pmap.rank()
			)));
		}
		let inner = Arc::new(StoreInner {
			pmap,
			shape,
			transport,
			local_cells: DashMap::new(),
			remote_cells: DashMap::new(),
			staging: DashMap::new(),
			request_permits: Arc::new(Semaphore::new(config.concurrency.io_bound)),
		});
		let server_inner = inner.clone();
		tokio::spawn(async move { Self::serve_forever(server_inner).await });
		Ok(Self { inner })
	}

	async fn serve_forever(inner: Arc<StoreInner<T, Tr>>) {
		while let Some(message) = inner.transport.recv().await {
			match message {
				WireMessage::ReqTile { from, ordinal } => {
					let inner = inner.clone();
					let permits = inner.request_permits.clone();
					tokio::spawn(async move {
						let _permit = permits.acquire_owned().await.expect("request semaphore is never closed");
						log::debug!("received REQ_TILE({ordinal}) from rank {from}");
						let cell = inner.local_cell(ordinal);
						if let Some(tile) = cell.add_remote_waiter(from) {
							inner.transport.send_reply(from, ordinal, Some(tile));
						}
					});
				}
				WireMessage::ReplyTile { ordinal, tile } => {
					log::debug!("received REPLY_TILE({ordinal})");
					let value = tile.unwrap_or_else(|| Arc::new(Tile::empty()));
					let cell = inner.remote_cell(ordinal);
					// At most one REPLY_TILE is expected per (requester, owner, k); a duplicate
					// on an already-resolved ordinal is ignored rather than treated as an error.
					let _ = cell.resolve(ordinal, value);
				}
			}
		}
	}

	/// Returns a one-shot future resolving to the Tile at ordinal `k`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `k >= self.shape().tile_count()`.
	pub fn find(&self, k: usize) -> Result<FutureTile<T>> {
		self.check_bounds(k)?;
		if self.inner.shape.is_zero(k) {
			return Ok(FutureTile::ready(Arc::new(Tile::empty())));
		}
		if self.inner.pmap.is_local(k)? {
			return Ok(self.inner.local_cell(k).subscribe(k));
		}

		let entry_cell = self.inner.remote_cell(k);
		let future = entry_cell.subscribe(k);
		let entry = self.inner.remote_cells.get(&k).expect("just inserted above");
		if !entry.requested.swap(true, Ordering::SeqCst) {
			let owner = self.inner.pmap.owner(k)?;
			log::debug!("sending REQ_TILE({k}) to owner rank {owner}");
			self.inner.transport.send_req(owner, k);
		}
		Ok(future)
	}

	/// Publishes `tile` as the value of ordinal `k`, fulfilling every pending local and remote
	/// waiter.
	///
	/// # Errors
	/// Returns [`Error::NotOwner`] if `k` is not local; [`Error::AlreadySet`] if already resolved.
	pub fn set(&self, k: usize, tile: Tile<T>) -> Result<()> {
		self.check_bounds(k)?;
		if self.inner.shape.is_zero(k) {
			log::error!("refusing set on ordinal {k}: structurally zero");
			return Err(Error::InvariantViolation(format!("ordinal {k} is structurally zero and cannot be set")));
		}
		if !self.inner.pmap.is_local(k)? {
			return Err(Error::NotOwner {
				ordinal: k,
				owner: self.inner.pmap.owner(k)?,
			});
		}

		let cell = self.inner.local_cell(k);
		let value = Arc::new(tile);
		let remote_waiters = cell.resolve(k, value.clone())?;
		log::debug!("ordinal {k} set locally; serving {} queued remote requester(s)", remote_waiters.len());
		for rank in remote_waiters {
			self.inner.transport.send_reply(rank, k, Some(value.clone()));
		}
		Ok(())
	}

	/// Convenience: builds a Tile from `range` and an element iterator, then `set`s it.
	///
	/// # Errors
	/// See [`Tile::from_iter`] and [`DistributedTileStore::set`].
	pub fn set_from_iter(&self, k: usize, range: ElementRange, iter: impl IntoIterator<Item = T>) -> Result<()> {
		self.set(k, Tile::from_iter(range, iter)?)
	}

	/// Convenience: builds a Tile broadcasting `value` over `range`, then `set`s it.
	///
	/// # Errors
	/// See [`DistributedTileStore::set`].
	pub fn set_broadcast(&self, k: usize, range: ElementRange, value: T) -> Result<()>
	where
		T: Clone,
	{
		self.set(k, Tile::broadcast(range, value))
	}

	/// Non-blocking: has ordinal `k`'s local or cached-remote cell been resolved?
	pub fn probe(&self, k: usize) -> bool {
		if k >= self.inner.shape.tile_count() {
			return false;
		}
		if self.inner.shape.is_zero(k) {
			return true;
		}
		match self.inner.pmap.is_local(k) {
			Ok(true) => self.inner.local_cells.get(&k).map(|cell| cell.is_resolved()).unwrap_or(false),
			Ok(false) => self.inner.remote_cells.get(&k).map(|entry| entry.cell.is_resolved()).unwrap_or(false),
			Err(_) => false,
		}
	}

	/// Whether ordinal `k` is owned by this process.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `k` is out of range.
	pub fn is_local(&self, k: usize) -> Result<bool> {
		self.inner.pmap.is_local(k)
	}

	/// The process that owns ordinal `k`.
	///
	/// # Errors
	/// Returns [`Error::OutOfRange`] if `k` is out of range.
	pub fn owner(&self, k: usize) -> Result<usize> {
		self.inner.pmap.owner(k)
	}

	/// The ordinals owned by this store's own process, in ascending order.
	pub fn local_ordinals(&self) -> &[usize] {
		self.inner.pmap.local_ordinals()
	}

	/// Whether ordinal `k` is structurally zero.
	///
	/// # Panics
	/// Panics if `k >= self.shape().tile_count()`, mirroring [`Shape::is_zero`].
	pub fn is_zero(&self, k: usize) -> bool {
		self.inner.shape.is_zero(k)
	}

	/// The shape this store was constructed with.
	pub fn shape(&self) -> &Shape {
		&self.inner.shape
	}

	/// Sweeps every locally owned, not-yet-set ordinal and resolves it to the empty Tile, serving
	/// any requesters queued by a construction-race `REQ_TILE`.
	///
	/// Idempotent: calling this more than once is safe; the second call finds nothing left to
	/// sweep (see the Open Questions design note on idempotence).
	pub fn process_pending(&self) -> Result<()> {
		for &k in self.inner.pmap.local_ordinals() {
			if self.inner.shape.is_zero(k) {
				continue;
			}
			let cell = self.inner.local_cell(k);
			if cell.is_resolved() {
				continue;
			}
			let empty = Arc::new(Tile::empty());
			match cell.resolve(k, empty.clone()) {
				Ok(remote_waiters) => {
					if !remote_waiters.is_empty() {
						log::warn!("ordinal {k} was never set; resolving {} pending remote request(s) to empty", remote_waiters.len());
					}
					for rank in remote_waiters {
						self.inner.transport.send_reply(rank, k, Some(empty.clone()));
					}
				}
				Err(Error::AlreadySet { .. }) => {}
				Err(err) => return Err(err),
			}
		}
		Ok(())
	}

	/// Accumulates `partial` into ordinal `k`'s staging buffer, combining it element-wise with any
	/// prior contribution via `combine`. Does not publish anything until [`finalize_reduce`] is
	/// called.
	///
	/// [`finalize_reduce`]: DistributedTileStore::finalize_reduce
	///
	/// # Errors
	/// Returns [`Error::NotOwner`] if `k` is not local, or [`Error::ShapeMismatch`] if `partial`'s
	/// range disagrees with a previously staged contribution.
	pub fn reduce<F>(&self, k: usize, partial: Tile<T>, mut combine: F) -> Result<()>
	where
		F: FnMut(&mut T, T),
	{
		self.check_bounds(k)?;
		if !self.inner.pmap.is_local(k)? {
			return Err(Error::NotOwner {
				ordinal: k,
				owner: self.inner.pmap.owner(k)?,
			});
		}
		let range = partial
			.range()
			.cloned()
			.ok_or_else(|| Error::out_of_range("reduce partial", "the empty tile cannot be reduced into"))?;
		let values: Vec<T> = partial.data_into_vec();

		let slot = self.inner.staging.entry(k).or_insert_with(|| Mutex::new(None));
		let mut staged = slot.lock();
		match staged.as_mut() {
			None => *staged = Some(Staging { range, values }),
			Some(acc) => {
				if acc.range != range {
					return Err(Error::ShapeMismatch(format!("reduce contribution for ordinal {k} changed element range")));
				}
				for (existing, incoming) in acc.values.iter_mut().zip(values) {
					combine(existing, incoming);
				}
			}
		}
		Ok(())
	}

	/// Publishes ordinal `k`'s staged reduction as its final value via [`set`](Self::set).
	///
	/// # Errors
	/// Returns [`Error::InvariantViolation`] if no contribution was ever staged for `k`, or
	/// whatever [`set`](Self::set) returns.
	pub fn finalize_reduce(&self, k: usize) -> Result<()> {
		let staged = self
			.inner
			.staging
			.remove(&k)
			.and_then(|(_, slot)| slot.into_inner())
			.ok_or_else(|| {
				log::error!("finalize_reduce called on ordinal {k} with no staged contribution");
				Error::InvariantViolation(format!("finalize_reduce called on ordinal {k} with no staged contribution"))
			})?;
		self.set(k, Tile::from_iter(staged.range, staged.values)?)
	}

	/// A snapshot of every ordinal that is both locally owned and resolved, in ascending ordinal
	/// order. Structurally zero and not-yet-set ordinals are omitted.
	pub fn local_tiles(&self) -> Vec<(usize, Arc<Tile<T>>)> {
		self.inner
			.pmap
			.local_ordinals()
			.iter()
			.filter(|&&k| !self.inner.shape.is_zero(k))
			.filter_map(|&k| self.inner.local_cells.get(&k).and_then(|cell| cell.get_if_resolved()).map(|tile| (k, tile)))
			.collect()
	}

	fn check_bounds(&self, k: usize) -> Result<()> {
		if k >= self.inner.shape.tile_count() {
			return Err(Error::out_of_range("tile ordinal", format!("{k} not in [0, {})", self.inner.shape.tile_count())));
		}
		Ok(())
	}
}
