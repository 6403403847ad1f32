//! # tessera
//!
//! Core substrate for a distributed, block-sparse, tiled tensor algebra runtime: tiled ranges and
//! shapes that name tiles and their structural sparsity, process maps that pin each tile to
//! exactly one owner, an asynchronous tile store with construction-race tolerance, and the
//! shape-propagation algebra that plans a binary expression's output sparsity before any element
//! is computed.
//!
//! The runtime's numeric kernels, expression-template front end, and MPI-backed transport are out
//! of scope; this crate specifies their trait boundaries ([`kernel::TileKernel`],
//! [`world::World`], [`store::Transport`]) and ships one reference implementation of each,
//! sufficient to drive the core end-to-end in a single process.
//!
//! ```
//! use tessera::pmap::BlockedPmap;
//! use tessera::store::DistributedTileStore;
//! use tessera::types::{ElementRange, Shape};
//! use tessera::world::LocalCluster;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cluster = LocalCluster::new(1);
//! let mut channels = cluster.open_channel::<f64>();
//! let pmap: Arc<dyn tessera::pmap::Pmap> = Arc::new(BlockedPmap::new(4, 1, 0));
//! let store = DistributedTileStore::new(pmap, Shape::dense(4), channels.remove(0)).unwrap();
//! store.set_broadcast(0, ElementRange::new(vec![0..2]), 1.0).unwrap();
//! let tile = store.find(0).unwrap().await.unwrap();
//! assert_eq!(tile.data(), &[1.0, 1.0]);
//! # }
//! ```

pub mod concurrency;
pub mod config;
pub mod error;
pub mod kernel;
pub mod pmap;
pub mod shape_propagation;
pub mod store;
pub mod types;
pub mod world;

pub use config::Config;
pub use error::{Error, Result};
