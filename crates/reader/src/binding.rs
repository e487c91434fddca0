//! Per-type bindings: the lazily resolved parse function of one type.
//!
//! A binding is created on first reference and resolved once. The resolved
//! function is computed outside any lock and published through a [`OnceLock`];
//! a thread that loses the publication race discards its copy. Bindings never
//! change after resolution.
//!
//! Resolution may recurse into the registry. If a type's strategy asks for the
//! same type on the same thread before resolution finishes, the inner request
//! receives [`Binding::parse`] as a forwarder, which delegates to the resolved
//! function once it is published.

use std::any::TypeId;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

use crate::descriptor::TypeDescriptor;
use crate::error::ReadError;
use crate::function::{ParseFn, ParseResult};
use crate::registry::Registry;
use crate::strategy::StrategySource;

/// Observable lifecycle of a [`Binding`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
	/// Created but not yet resolved.
	Pending,
	/// Terminal. `has_fn` is false when no strategy exists for the type.
	Resolved { has_fn: bool },
}

/// Resolved parse function of a single type.
pub struct Binding {
	ty: TypeDescriptor,
	resolved: OnceLock<Option<ParseFn>>,
}

impl Binding {
	pub(crate) fn new(ty: TypeDescriptor) -> Self {
		Self {
			ty,
			resolved: OnceLock::new(),
		}
	}

	#[inline]
	pub fn descriptor(&self) -> TypeDescriptor {
		self.ty
	}

	pub fn state(&self) -> BindingState {
		match self.resolved.get() {
			None => BindingState::Pending,
			Some(resolved) => BindingState::Resolved {
				has_fn: resolved.is_some(),
			},
		}
	}

	/// Resolves the binding against `source` unless it is already resolved.
	///
	/// Returns false only when the call re-entered the resolution of this same
	/// type on the current thread; the binding then stays pending until the
	/// outer resolution publishes.
	pub(crate) fn resolve(&self, source: &dyn StrategySource, registry: &Registry) -> bool {
		if self.resolved.get().is_some() {
			return true;
		}
		let Some(_guard) = ResolvingGuard::enter(self.ty.id()) else {
			tracing::trace!(ty = self.ty.name(), "resolution cycle, handing out forwarder");
			return false;
		};

		let computed = source.resolve(&self.ty, registry);
		tracing::trace!(ty = self.ty.name(), has_fn = computed.is_some(), "binding resolved");
		self.resolved.get_or_init(|| computed);
		true
	}

	/// Returns the resolved function, or the fallback [`Binding::parse`] entry point.
	pub fn parse_fn(self: &Arc<Self>) -> ParseFn {
		match self.resolved.get() {
			Some(Some(resolved)) => resolved.clone(),
			_ => self.fallback(),
		}
	}

	pub(crate) fn fallback(self: &Arc<Self>) -> ParseFn {
		let binding = Arc::clone(self);
		ParseFn::new(move |value| binding.parse(value))
	}

	/// Fallback entry point.
	///
	/// Delegates to the resolved function when one has been published. Otherwise
	/// null yields `Ok(None)` and any other token fails with
	/// [`ReadError::UnsupportedType`]: `Abstract` or `NoStrategy` once resolved
	/// without a function, `Unresolved` while a recursive resolution is in flight.
	pub fn parse(&self, value: Option<&str>) -> ParseResult {
		let resolved = self.resolved.get();
		if let Some(Some(resolved)) = resolved {
			return resolved.call(value);
		}
		if value.is_none() {
			return Ok(None);
		}
		match resolved {
			Some(_) => Err(ReadError::unsupported(self.ty)),
			None => Err(ReadError::unresolved(self.ty)),
		}
	}
}

impl std::fmt::Debug for Binding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Binding")
			.field("ty", &self.ty)
			.field("state", &self.state())
			.finish()
	}
}

thread_local! {
	static RESOLVING: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a type as being resolved on the current thread.
struct ResolvingGuard(TypeId);

impl ResolvingGuard {
	fn enter(id: TypeId) -> Option<Self> {
		RESOLVING.with(|stack| {
			let mut stack = stack.borrow_mut();
			if stack.contains(&id) {
				return None;
			}
			stack.push(id);
			Some(Self(id))
		})
	}
}

impl Drop for ResolvingGuard {
	fn drop(&mut self) {
		RESOLVING.with(|stack| {
			let mut stack = stack.borrow_mut();
			if let Some(pos) = stack.iter().rposition(|id| *id == self.0) {
				stack.remove(pos);
			}
		});
	}
}
