//! Conflict vocabulary and precedence for duplicate strategies.

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;

/// How a strategy table merges two strategies for the same type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
	/// Refuse to build the table.
	Error,
	/// Keep the first strategy seen for a type.
	FirstWins,
	/// Overwrite with the last strategy seen.
	LastWins,
	/// Select winner by priority (higher wins), then origin rank, then ordinal.
	#[default]
	ByPriority,
}

/// Where a strategy was defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyOrigin {
	/// Shipped with this crate.
	Builtin,
	/// Submitted by a library crate.
	Crate(&'static str),
	/// Added to a table builder at runtime.
	Runtime,
}

impl StrategyOrigin {
	/// Returns the precedence rank of the origin (higher is higher precedence).
	pub const fn rank(self) -> u8 {
		match self {
			Self::Builtin => 0,
			Self::Crate(_) => 1,
			Self::Runtime => 2,
		}
	}
}

impl fmt::Display for StrategyOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Builtin => write!(f, "builtin"),
			Self::Crate(name) => write!(f, "crate:{name}"),
			Self::Runtime => write!(f, "runtime"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Party {
	pub origin: StrategyOrigin,
	pub priority: i16,
	/// Stable ingest ordinal.
	pub ordinal: u32,
}

/// Compares two parties for the same type.
///
/// Precedence hierarchy:
/// 1. Priority (higher wins)
/// 2. Origin (Runtime > Crate > Builtin)
/// 3. Ingest ordinal (higher/later wins)
pub(crate) fn cmp_party(a: &Party, b: &Party) -> Ordering {
	a.priority
		.cmp(&b.priority)
		.then_with(|| a.origin.rank().cmp(&b.origin.rank()))
		.then_with(|| a.ordinal.cmp(&b.ordinal))
}

/// Two strategies claimed the same type under [`DuplicatePolicy::Error`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("duplicate parse strategy for {ty}: {existing} and {incoming}")]
pub struct StrategyConflict {
	pub ty: &'static str,
	pub existing: StrategyOrigin,
	pub incoming: StrategyOrigin,
}

/// Decides whether `incoming` replaces `existing` under `policy`.
pub(crate) fn incoming_wins(
	policy: DuplicatePolicy,
	ty: &'static str,
	existing: &Party,
	incoming: &Party,
) -> Result<bool, StrategyConflict> {
	match policy {
		DuplicatePolicy::Error => Err(StrategyConflict {
			ty,
			existing: existing.origin,
			incoming: incoming.origin,
		}),
		DuplicatePolicy::FirstWins => Ok(false),
		DuplicatePolicy::LastWins => Ok(true),
		DuplicatePolicy::ByPriority => Ok(cmp_party(incoming, existing) == Ordering::Greater),
	}
}
