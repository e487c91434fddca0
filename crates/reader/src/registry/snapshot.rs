//! Immutable type-keyed snapshots and their atomic publication cell.
//!
//! # Role
//!
//! This module owns the only shared mutable state in the crate: an atomic
//! pointer to the current [`Snapshot`]. Snapshots are never mutated after
//! publication. Writers derive a new snapshot holding one extra entry and
//! publish it with CAS.
//!
//! # Invariants
//!
//! - Entries are never removed or replaced (see `invariants::test_snapshot_append_only`).
//! - Concurrent inserts of distinct keys are all retained (see `invariants::test_no_lost_updates`).

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;

use crate::descriptor::TypeDescriptor;

/// Immutable point-in-time view of a type-keyed map.
pub struct Snapshot<V> {
	entries: FxHashMap<TypeDescriptor, V>,
}

impl<V> Default for Snapshot<V> {
	fn default() -> Self {
		Self {
			entries: FxHashMap::default(),
		}
	}
}

impl<V: Clone> Snapshot<V> {
	/// Derives a snapshot equal to `self` plus one entry.
	pub(crate) fn with_entry(&self, ty: TypeDescriptor, value: V) -> Self {
		let mut entries = self.entries.clone();
		entries.insert(ty, value);
		Self { entries }
	}
}

impl<V> Snapshot<V> {
	#[inline]
	pub fn get(&self, ty: &TypeDescriptor) -> Option<&V> {
		self.entries.get(ty)
	}

	#[inline]
	pub fn contains(&self, ty: &TypeDescriptor) -> bool {
		self.entries.contains_key(ty)
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over the descriptors present in this snapshot, in no particular order.
	pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
		self.entries.keys()
	}
}

/// Outcome of [`SnapshotCell::insert_if_absent`].
pub(crate) enum Inserted<V> {
	/// Our entry was published.
	New(V),
	/// A concurrent writer published an entry for the key first; it is returned instead.
	Existing(V),
}

impl<V> Inserted<V> {
	pub(crate) fn into_inner(self) -> V {
		match self {
			Self::New(v) | Self::Existing(v) => v,
		}
	}
}

/// Atomic holder of the current [`Snapshot`].
///
/// Reads are wait-free. Writes are lock-free: a failed CAS means another
/// writer won, and the insert retries from the snapshot it observed.
pub(crate) struct SnapshotCell<V> {
	label: &'static str,
	current: ArcSwap<Snapshot<V>>,
}

impl<V: Clone> SnapshotCell<V> {
	pub(crate) fn new(label: &'static str) -> Self {
		Self {
			label,
			current: ArcSwap::from_pointee(Snapshot::default()),
		}
	}

	#[inline]
	pub(crate) fn load(&self) -> Arc<Snapshot<V>> {
		self.current.load_full()
	}

	#[inline]
	pub(crate) fn get(&self, ty: &TypeDescriptor) -> Option<V> {
		self.current.load().get(ty).cloned()
	}

	/// Publishes `value` for `ty` unless an entry for `ty` already exists.
	///
	/// Existing entries are never overwritten; the writer adopts them instead.
	pub(crate) fn insert_if_absent(&self, ty: TypeDescriptor, value: V) -> Inserted<V> {
		let mut retries = 0u32;
		loop {
			let old = self.current.load_full();
			if let Some(existing) = old.get(&ty) {
				if retries > 0 {
					tracing::debug!(registry = self.label, ty = ty.name(), retries, "concurrent insert won");
				}
				return Inserted::Existing(existing.clone());
			}

			let candidate = Arc::new(old.with_entry(ty, value.clone()));
			let prev = self.current.compare_and_swap(&old, candidate);
			if Arc::ptr_eq(&prev, &old) {
				return Inserted::New(value);
			}

			retries += 1;
			tracing::trace!(registry = self.label, ty = ty.name(), retries, "snapshot cas lost, retrying");
		}
	}
}
