//! Parse and factory function handles.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ReadError;

/// Type-erased parsed value.
pub type Value = Box<dyn Any + Send>;

/// Result of applying a [`ParseFn`] to a token.
pub type ParseResult = Result<Option<Value>, ReadError>;

type ParseCallback = dyn Fn(Option<&str>) -> ParseResult + Send + Sync;

/// Converts a text token into a value of one target type.
///
/// A `None` token means null. Functions built with [`ParseFn::token`] or
/// [`ParseFn::via_from_str`] map null to `Ok(None)` without running the
/// strategy.
#[derive(Clone)]
pub struct ParseFn(Arc<ParseCallback>);

impl ParseFn {
	/// Wraps a raw callback that handles null itself.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Option<&str>) -> ParseResult + Send + Sync + 'static,
	{
		Self(Arc::new(f))
	}

	/// Wraps a strategy over non-null tokens.
	///
	/// A [`ReadError`] raised by the strategy, e.g. from a component type's
	/// parse function, is returned as is. Any other error becomes
	/// [`ReadError::Format`] without further wrapping.
	pub fn token<T, E, F>(f: F) -> Self
	where
		T: Send + 'static,
		E: Into<anyhow::Error>,
		F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
	{
		Self::new(move |value| match value {
			None => Ok(None),
			Some(token) => match f(token) {
				Ok(parsed) => Ok(Some(Box::new(parsed) as Value)),
				Err(error) => Err(error.into().downcast::<ReadError>().unwrap_or_else(ReadError::Format)),
			},
		})
	}

	/// Parse function backed by the type's [`FromStr`] implementation.
	pub fn via_from_str<T>() -> Self
	where
		T: FromStr + Send + 'static,
		T::Err: std::error::Error + Send + Sync + 'static,
	{
		Self::token(|token: &str| token.parse::<T>())
	}

	#[inline]
	pub fn call(&self, value: Option<&str>) -> ParseResult {
		(self.0)(value)
	}

	/// Returns true if both handles share the same callback.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for ParseFn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ParseFn").field(&Arc::as_ptr(&self.0)).finish()
	}
}

type FactoryCallback = dyn Fn() -> ParseFn + Send + Sync;

/// Deferred producer of a [`ParseFn`].
#[derive(Clone)]
pub struct FactoryFn(Arc<FactoryCallback>);

impl FactoryFn {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn() -> ParseFn + Send + Sync + 'static,
	{
		Self(Arc::new(f))
	}

	#[inline]
	pub fn invoke(&self) -> ParseFn {
		(self.0)()
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for FactoryFn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FactoryFn").field(&Arc::as_ptr(&self.0)).finish()
	}
}
