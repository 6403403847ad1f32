//! Crate-wide configuration surface.
//!
//! Mirrors the runtime's habit of keeping construction-time choices (which concurrency limits to
//! use, which default hashing seed a `Hashed` [`Pmap`](crate::pmap::Pmap) should take when the
//! caller doesn't pick one) in one small, explicit struct rather than in global statics.

use crate::concurrency::ConcurrencyLimits;

/// Construction-time configuration for a [`DistributedTileStore`](crate::store::DistributedTileStore)
/// and the [`World`](crate::world::World) it is bound to.
#[derive(Debug, Clone, Copy)]
pub struct Config {
	/// Concurrency caps applied to the store's remote-resolution workload.
	pub concurrency: ConcurrencyLimits,
	/// Default seed used by a `Hashed` Pmap when the caller does not supply one.
	pub default_hash_seed: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			concurrency: ConcurrencyLimits::default(),
			default_hash_seed: 0,
		}
	}
}

impl Config {
	/// Builds a config with explicit concurrency limits, keeping the default hash seed.
	pub fn with_concurrency(concurrency: ConcurrencyLimits) -> Self {
		Self {
			concurrency,
			..Self::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_has_zero_seed() {
		let config = Config::default();
		assert_eq!(config.default_hash_seed, 0);
	}

	#[test]
	fn with_concurrency_overrides_only_concurrency() {
		let limits = ConcurrencyLimits::new(2);
		let config = Config::with_concurrency(limits);
		assert_eq!(config.concurrency.io_bound, 2);
		assert_eq!(config.default_hash_seed, 0);
	}
}
