//! Concurrency limit tuning for the store's remote-resolution workload.
//!
//! Servicing a flood of `REQ_TILE` messages is I/O-bound: each request just reads the local cell
//! map and, if already resolved, sends a reply, so the store can service many of them at once
//! without saturating the CPU. [`ConcurrencyLimits`] caps how many the background server task
//! services concurrently.

/// Concurrency cap for the store's I/O-bound remote-resolution workload, derived from the host's
/// CPU count.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyLimits {
	/// Concurrency for I/O-bound operations (remote tile requests, replies).
	///
	/// Set to 3x CPU count because remote resolution spends most of its time waiting, allowing
	/// high parallelism without CPU saturation.
	pub io_bound: usize,
}

impl ConcurrencyLimits {
	/// Builds limits from an explicit value, clamped to a minimum of 1.
	pub fn new(io_bound: usize) -> Self {
		Self { io_bound: io_bound.max(1) }
	}

	/// The number of logical CPUs available, as reported by the OS thread scheduler hint.
	pub fn cpu_count() -> usize {
		std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1)
	}
}

impl Default for ConcurrencyLimits {
	/// I/O-bound: 3x CPU count.
	fn default() -> Self {
		Self { io_bound: Self::cpu_count() * 3 }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_limits_scale_with_cpu_count() {
		let limits = ConcurrencyLimits::default();
		let cpus = ConcurrencyLimits::cpu_count();
		assert_eq!(limits.io_bound, cpus * 3);
	}

	#[test]
	fn custom_limits_are_respected() {
		let limits = ConcurrencyLimits::new(12);
		assert_eq!(limits.io_bound, 12);
	}

	#[test]
	fn limits_are_clamped_to_at_least_one() {
		let limits = ConcurrencyLimits::new(0);
		assert_eq!(limits.io_bound, 1);
	}
}
