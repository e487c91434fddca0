//! Process-wide type → parse function cache.
//!
//! # Mental model
//!
//! * Readers load the current [`RegistrySnapshot`] and invoke the cached
//!   [`FactoryFn`] for the type. No lock is taken on this path.
//! * On a miss, the caller resolves the type's [`Binding`], wraps its accessor
//!   as a factory and publishes a snapshot with one extra entry via CAS.
//! * If another writer published the same type first, the caller adopts the
//!   published factory. Resolution is a pure function of the type, so racing
//!   resolvers can waste work but never produce different answers.
//!
//! # Invariants
//!
//! * The snapshot is append-only (see `invariants::test_snapshot_append_only`).
//! * Concurrent first resolutions of distinct types are all retained
//!   (see `invariants::test_no_lost_updates`).
//! * One binding and one registry entry per type, however many threads race
//!   (see `invariants::test_concurrent_novel_type`).

use std::sync::{Arc, OnceLock};

use crate::binding::Binding;
use crate::config::{ConfigError, ReaderConfig};
use crate::descriptor::TypeDescriptor;
use crate::error::ReadError;
use crate::function::{FactoryFn, ParseFn, ParseResult};
use crate::strategy::{DuplicatePolicy, StrategySource, StrategyTable};

mod snapshot;

pub use snapshot::Snapshot;
use snapshot::SnapshotCell;

/// Immutable view of the type → factory mapping.
pub type RegistrySnapshot = Snapshot<FactoryFn>;

#[cfg(test)]
mod invariants;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Type-indexed cache of parse functions.
pub struct Registry {
	factories: SnapshotCell<FactoryFn>,
	bindings: SnapshotCell<Arc<Binding>>,
	source: Box<dyn StrategySource>,
}

impl Registry {
	/// Creates an empty registry that resolves types through `source`.
	pub fn new(source: impl StrategySource) -> Self {
		Self {
			factories: SnapshotCell::new("factories"),
			bindings: SnapshotCell::new("bindings"),
			source: Box::new(source),
		}
	}

	/// Creates a registry over every `inventory` strategy in this binary.
	pub fn from_config(config: &ReaderConfig) -> Result<Self, ConfigError> {
		let table = StrategyTable::from_inventory(config.duplicate_policy)?;
		tracing::debug!(strategies = table.len(), policy = ?config.duplicate_policy, "reader registry created");
		Ok(Self::new(table))
	}

	/// Returns the process-wide registry, creating it with the default config on first use.
	pub fn global() -> &'static Registry {
		GLOBAL.get_or_init(|| {
			// ByPriority always picks a winner, so this never falls back to the empty table.
			let table = StrategyTable::from_inventory(DuplicatePolicy::ByPriority).unwrap_or_default();
			Self::new(table)
		})
	}

	/// Installs the process-wide registry with `config`.
	///
	/// Fails if [`Registry::global`] or this function already ran.
	pub fn init_global(config: ReaderConfig) -> Result<&'static Registry, ConfigError> {
		let registry = Self::from_config(&config)?;
		GLOBAL
			.set(registry)
			.map_err(|_| ConfigError::GlobalAlreadyInitialized)?;
		GLOBAL.get().ok_or(ConfigError::GlobalAlreadyInitialized)
	}

	/// Returns the parse function for `ty`, resolving and caching it on first use.
	pub fn get_parse_fn(&self, ty: &TypeDescriptor) -> ParseFn {
		if let Some(factory) = self.factories.get(ty) {
			return factory.invoke();
		}

		let binding = self.binding_entry(ty);
		if !binding.resolve(self.source.as_ref(), self) {
			// Re-entrant request from this type's own strategy. Hand out the
			// forwarder without publishing it; the outer call publishes.
			return binding.fallback();
		}

		let accessor = Arc::clone(&binding);
		let factory = FactoryFn::new(move || accessor.parse_fn());
		let inserted = self.factories.insert_if_absent(*ty, factory);
		if let snapshot::Inserted::New(_) = &inserted {
			tracing::debug!(ty = ty.name(), state = ?binding.state(), "parse function cached");
		}
		inserted.into_inner().invoke()
	}

	/// Typed convenience over [`Registry::get_parse_fn`].
	pub fn parse_fn<T: 'static>(&self) -> ParseFn {
		self.get_parse_fn(&TypeDescriptor::of::<T>())
	}

	/// Parses `token` as `ty`, returning the type-erased value.
	pub fn parse_as(&self, ty: &TypeDescriptor, token: Option<&str>) -> ParseResult {
		self.get_parse_fn(ty).call(token)
	}

	/// Parses `token` as `T`.
	pub fn parse<T: 'static>(&self, token: Option<&str>) -> Result<Option<T>, ReadError> {
		let Some(value) = self.parse_fn::<T>().call(token)? else {
			return Ok(None);
		};
		match value.downcast::<T>() {
			Ok(typed) => Ok(Some(*typed)),
			Err(_) => Err(ReadError::TypeMismatch {
				expected: std::any::type_name::<T>(),
			}),
		}
	}

	/// Returns the resolved binding for `ty`, creating it if needed.
	///
	/// Does not install a factory. The binding is only observed pending when
	/// called from inside the strategy of `ty` itself.
	pub fn binding(&self, ty: &TypeDescriptor) -> Arc<Binding> {
		let binding = self.binding_entry(ty);
		binding.resolve(self.source.as_ref(), self);
		binding
	}

	fn binding_entry(&self, ty: &TypeDescriptor) -> Arc<Binding> {
		if let Some(existing) = self.bindings.get(ty) {
			return existing;
		}
		self.bindings
			.insert_if_absent(*ty, Arc::new(Binding::new(*ty)))
			.into_inner()
	}

	/// Current snapshot of installed factories.
	pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
		self.factories.load()
	}

	pub fn contains(&self, ty: &TypeDescriptor) -> bool {
		self.factories.load().contains(ty)
	}

	/// Number of types with an installed factory.
	pub fn len(&self) -> usize {
		self.factories.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of bindings created so far.
	pub fn binding_count(&self) -> usize {
		self.bindings.load().len()
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("factories", &self.len())
			.field("bindings", &self.binding_count())
			.finish()
	}
}
