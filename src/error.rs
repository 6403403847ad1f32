//! The error kinds surfaced by this crate.
//!
//! Every fallible operation in `tessera` returns [`Result<T>`], a type alias over
//! [`std::result::Result`] with [`Error`] as its error type. The store's contract requires callers
//! to distinguish `NotOwner` from `AlreadySet` from `InvariantViolation` programmatically, so the
//! error type here is a closed, matchable enum rather than an opaque `anyhow::Error`.

use thiserror::Error;

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the tiled-range, shape, process-map, tile, and store components.
///
/// Local contract violations ([`Error::OutOfRange`], [`Error::NotOwner`], [`Error::AlreadySet`])
/// are programmer errors: the core reports them rather than attempting any recovery.
/// [`Error::TransportError`] instead propagates into whichever future was waiting on the affected
/// ordinal, since it originates from the (out-of-scope) transport layer rather than from a local
/// contract violation.
#[derive(Debug, Error)]
pub enum Error {
	/// A tile index, element index, or ordinal fell outside the bounds of a [`TiledRange`].
	///
	/// [`TiledRange`]: crate::types::TiledRange
	#[error("{what} is out of range: {detail}")]
	OutOfRange {
		/// Short label for what was out of range (e.g. `"tile index"`, `"element"`).
		what: &'static str,
		/// Human-readable detail, e.g. the offending value and the valid bound.
		detail: String,
	},

	/// `set` was called on an ordinal this process does not own.
	#[error("ordinal {ordinal} is not owned by this process (owner is process {owner})")]
	NotOwner {
		/// The ordinal that was targeted.
		ordinal: usize,
		/// The process that actually owns it.
		owner: usize,
	},

	/// `set` was called twice (or after `process_pending`'s sweep) on the same ordinal.
	#[error("ordinal {ordinal} has already been set")]
	AlreadySet {
		/// The ordinal that was already resolved.
		ordinal: usize,
	},

	/// A one-writer or lifecycle invariant was violated.
	///
	/// Covers double-set, set-after-`process_pending`, and destruction with outstanding
	/// waiters. The core detects these but does not attempt to repair them.
	#[error("invariant violation: {0}")]
	InvariantViolation(String),

	/// The bitset of a Dense [`Shape`] was requested.
	///
	/// [`Shape`]: crate::types::Shape
	#[error("operation is not applicable to a dense shape")]
	NotApplicable,

	/// Two operands of a binary expression disagree on their `TiledRange`.
	#[error("shape mismatch: {0}")]
	ShapeMismatch(String),

	/// The (out-of-scope) transport layer reported a failure while resolving a remote tile.
	#[error("transport error while resolving ordinal {ordinal}: {message}")]
	TransportError {
		/// The ordinal whose resolution failed.
		ordinal: usize,
		/// The transport-supplied failure description.
		message: String,
	},
}

impl Error {
	pub(crate) fn out_of_range(what: &'static str, detail: impl Into<String>) -> Self {
		Error::OutOfRange {
			what,
			detail: detail.into(),
		}
	}
}
