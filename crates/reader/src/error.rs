//! Error types surfaced by parse functions.

use std::fmt;

use crate::descriptor::TypeDescriptor;

/// Why a type could not be instantiated from text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedReason {
	/// The type is an interface or abstract capability.
	Abstract,
	/// The type is concrete but no strategy is registered for it.
	NoStrategy,
	/// The type's strategy is still being built on this thread.
	Unresolved,
}

impl fmt::Display for UnsupportedReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Abstract => write!(f, "interface type"),
			Self::NoStrategy => write!(f, "type without a parse strategy"),
			Self::Unresolved => write!(f, "type whose parse function is still being resolved"),
		}
	}
}

/// Failure of a single parse attempt.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
	/// No strategy can produce a value of this type from a non-null token.
	#[error("can not deserialize {reason}: {ty}")]
	UnsupportedType {
		ty: TypeDescriptor,
		reason: UnsupportedReason,
	},

	/// Error raised by the strategy itself, passed through untouched.
	#[error(transparent)]
	Format(#[from] anyhow::Error),

	/// A strategy produced a value of a different type than requested.
	#[error("parse function produced a value that is not a {expected}")]
	TypeMismatch { expected: &'static str },
}

impl ReadError {
	pub(crate) fn unsupported(ty: TypeDescriptor) -> Self {
		let reason = if ty.is_abstract() {
			UnsupportedReason::Abstract
		} else {
			UnsupportedReason::NoStrategy
		};
		Self::UnsupportedType { ty, reason }
	}

	pub(crate) fn unresolved(ty: TypeDescriptor) -> Self {
		Self::UnsupportedType {
			ty,
			reason: UnsupportedReason::Unresolved,
		}
	}

	/// Wraps a strategy error as a format error.
	pub fn format<E>(error: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self::Format(anyhow::Error::new(error))
	}

	/// Short name of the type an `UnsupportedType` error refers to.
	pub fn type_name(&self) -> Option<&'static str> {
		match self {
			Self::UnsupportedType { ty, .. } => Some(ty.short_name()),
			_ => None,
		}
	}

	pub fn is_unsupported(&self) -> bool {
		matches!(self, Self::UnsupportedType { .. })
	}
}
