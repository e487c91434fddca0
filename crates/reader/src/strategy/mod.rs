//! Type-specific parse strategies and the tables that hold them.
//!
//! # Purpose
//!
//! A strategy knows how to turn a token into a value of exactly one type. The
//! registry never parses anything itself: it asks a [`StrategySource`] once
//! per type and caches the answer in that type's binding.
//!
//! # Registration
//!
//! Types register themselves at link time. Each [`parse_strategy!`] or
//! [`from_str_strategy!`] invocation submits a [`StrategyReg`] through
//! `inventory`, and [`StrategyTable::from_inventory`] collects every submission
//! in the final binary. Tables can also be assembled by hand with
//! [`StrategyTable::builder`].
//!
//! # Precedence
//!
//! When two strategies claim one type, the table's [`DuplicatePolicy`]
//! decides. Under [`DuplicatePolicy::ByPriority`] the order is priority, then
//! [`StrategyOrigin`] rank, then ingest ordinal.
//!
//! [`parse_strategy!`]: crate::parse_strategy
//! [`from_str_strategy!`]: crate::from_str_strategy

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::descriptor::TypeDescriptor;
use crate::function::ParseFn;
use crate::registry::Registry;

mod builtins;
mod collision;
mod macros;

pub use collision::{DuplicatePolicy, Party, StrategyConflict, StrategyOrigin};


/// Supplies the parse function for a type, if the type has one.
///
/// Implementations may call back into `registry` to obtain the parse functions
/// of component types.
pub trait StrategySource: Send + Sync + 'static {
	fn resolve(&self, ty: &TypeDescriptor, registry: &Registry) -> Option<ParseFn>;
}

/// Static strategy registration collected via `inventory`.
pub struct StrategyReg {
	/// Descriptor of the type this strategy produces.
	pub descriptor: fn() -> TypeDescriptor,
	pub origin: StrategyOrigin,
	pub priority: i16,
	/// Builds the parse function; may resolve component types through the registry.
	pub build: fn(&Registry) -> ParseFn,
}

inventory::collect!(StrategyReg);

type BuildStrategy = Arc<dyn Fn(&Registry) -> ParseFn + Send + Sync>;

struct StrategyEntry {
	party: Party,
	build: BuildStrategy,
}

/// Dispatch table from type identity to strategy.
#[derive(Default)]
pub struct StrategyTable {
	entries: FxHashMap<TypeDescriptor, StrategyEntry>,
}

impl StrategyTable {
	pub fn builder() -> StrategyTableBuilder {
		StrategyTableBuilder::new()
	}

	/// Collects every strategy submitted through `inventory` in this binary.
	pub fn from_inventory(policy: DuplicatePolicy) -> Result<Self, StrategyConflict> {
		Self::builder().policy(policy).with_inventory().build()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, ty: &TypeDescriptor) -> bool {
		self.entries.contains_key(ty)
	}

	/// Origin of the strategy that won for `ty`.
	pub fn origin(&self, ty: &TypeDescriptor) -> Option<StrategyOrigin> {
		self.entries.get(ty).map(|entry| entry.party.origin)
	}
}

impl StrategySource for StrategyTable {
	fn resolve(&self, ty: &TypeDescriptor, registry: &Registry) -> Option<ParseFn> {
		let entry = self.entries.get(ty)?;
		Some((entry.build)(registry))
	}
}

impl std::fmt::Debug for StrategyTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map()
			.entries(self.entries.iter().map(|(ty, entry)| (ty.name(), entry.party)))
			.finish()
	}
}

/// Accumulates strategies and merges duplicates under a [`DuplicatePolicy`].
pub struct StrategyTableBuilder {
	policy: DuplicatePolicy,
	entries: FxHashMap<TypeDescriptor, StrategyEntry>,
	next_ordinal: u32,
	conflict: Option<StrategyConflict>,
}

impl StrategyTableBuilder {
	fn new() -> Self {
		Self {
			policy: DuplicatePolicy::default(),
			entries: FxHashMap::default(),
			next_ordinal: 0,
			conflict: None,
		}
	}

	pub fn policy(mut self, policy: DuplicatePolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Adds every `inventory` submission.
	///
	/// Submissions are ingested sorted by origin rank, type name and origin, so
	/// ordinal tie-breaks between crates do not depend on link order. Two
	/// submissions for one type from the same crate at equal priority keep
	/// their link order.
	pub fn with_inventory(mut self) -> Self {
		let mut regs: Vec<&'static StrategyReg> = Vec::new();
		for reg in inventory::iter::<StrategyReg> {
			regs.push(reg);
		}
		regs.sort_by_cached_key(|reg| (reg.origin.rank(), (reg.descriptor)().name(), reg.origin.to_string()));
		for reg in regs {
			let build: BuildStrategy = Arc::new(reg.build);
			self.push((reg.descriptor)(), reg.origin, reg.priority, build);
		}
		self
	}

	/// Adds a runtime strategy for `T` at priority 0.
	pub fn insert<T, F>(self, build: F) -> Self
	where
		T: 'static,
		F: Fn(&Registry) -> ParseFn + Send + Sync + 'static,
	{
		self.insert_with(TypeDescriptor::of::<T>(), 0, build)
	}

	/// Adds a runtime strategy for an arbitrary descriptor.
	pub fn insert_with<F>(mut self, ty: TypeDescriptor, priority: i16, build: F) -> Self
	where
		F: Fn(&Registry) -> ParseFn + Send + Sync + 'static,
	{
		self.push(ty, StrategyOrigin::Runtime, priority, Arc::new(build));
		self
	}

	fn push(&mut self, ty: TypeDescriptor, origin: StrategyOrigin, priority: i16, build: BuildStrategy) {
		let party = Party {
			origin,
			priority,
			ordinal: self.next_ordinal,
		};
		self.next_ordinal += 1;

		let Some(existing) = self.entries.get(&ty) else {
			self.entries.insert(ty, StrategyEntry { party, build });
			return;
		};

		match collision::incoming_wins(self.policy, ty.name(), &existing.party, &party) {
			Ok(true) => {
				tracing::warn!(ty = ty.name(), winner = %origin, loser = %existing.party.origin, "parse strategy replaced");
				self.entries.insert(ty, StrategyEntry { party, build });
			}
			Ok(false) => {
				tracing::warn!(ty = ty.name(), winner = %existing.party.origin, loser = %origin, "parse strategy ignored");
			}
			Err(conflict) => {
				if self.conflict.is_none() {
					self.conflict = Some(conflict);
				}
			}
		}
	}

	/// Finishes the table, failing on the first conflict seen under [`DuplicatePolicy::Error`].
	pub fn build(self) -> Result<StrategyTable, StrategyConflict> {
		match self.conflict {
			Some(conflict) => Err(conflict),
			None => Ok(StrategyTable { entries: self.entries }),
		}
	}
}
