//! The asynchronous, owner-authoritative tile store: the core of this crate.
//!
//! A [`DistributedTileStore`] binds a [`Pmap`](crate::pmap::Pmap), a [`Shape`](crate::types::Shape),
//! and a [`Transport`] together to answer `find`/`set`/`probe` against a distributed tile space,
//! tolerating the construction race described in the crate's design notes via
//! [`DistributedTileStore::process_pending`].

mod cell;
mod distributed_tile_store;
mod transport;

pub use cell::FutureTile;
pub use distributed_tile_store::DistributedTileStore;
pub use transport::Transport;
