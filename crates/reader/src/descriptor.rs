//! Identity tokens for target types.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Whether a type can be instantiated by some concrete strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
	/// A sized type with a possible concrete instantiation.
	Concrete,
	/// A capability with no instantiation of its own (e.g. `dyn Trait`).
	Abstract,
}

/// Opaque identity of a target type, used as the registry cache key.
///
/// Equality and hashing use only the [`TypeId`]. The name and kind are carried
/// for diagnostics and for choosing the failure mode of an unresolved binding.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
	id: TypeId,
	name: &'static str,
	kind: TypeKind,
}

impl TypeDescriptor {
	/// Describes a concrete type.
	pub fn of<T: 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
			kind: TypeKind::Concrete,
		}
	}

	/// Describes an abstract capability, typically `dyn Trait`.
	///
	/// Values produced for an abstract descriptor are expected to be
	/// `Box<dyn Trait>`.
	pub fn of_abstract<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
			kind: TypeKind::Abstract,
		}
	}

	#[inline]
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified type name as reported by [`std::any::type_name`].
	#[inline]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[inline]
	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	#[inline]
	pub fn is_abstract(&self) -> bool {
		self.kind == TypeKind::Abstract
	}

	/// Type name without its module path, `dyn` prefix or extra trait bounds.
	///
	/// Generic arguments are kept as written, so `Vec<i32>` stays `Vec<i32>`.
	pub fn short_name(&self) -> &'static str {
		let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
		let name = &name[..top_level_bounds(name).unwrap_or(name.len())];
		let head = name.find('<').map_or(name, |generic| &name[..generic]);
		match head.rfind("::") {
			Some(sep) => &name[sep + 2..],
			None => name,
		}
	}
}

/// Byte offset of the first ` + ` outside generic arguments.
fn top_level_bounds(name: &str) -> Option<usize> {
	let mut depth = 0usize;
	for (pos, ch) in name.char_indices() {
		match ch {
			'<' => depth += 1,
			'>' => depth = depth.saturating_sub(1),
			' ' if depth == 0 && name[pos..].starts_with(" + ") => return Some(pos),
			_ => {}
		}
	}
	None
}

impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.finish()
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.short_name())
	}
}
