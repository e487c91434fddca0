//! Type-indexed, lazily resolved, lock-free cache of text parse functions.
//!
//! A deserializer that meets a leaf token asks the [`Registry`] for the
//! [`ParseFn`] of the target type, which it may only know at runtime as a
//! [`TypeDescriptor`]. The registry dispatches to the type's parse strategy,
//! caches the result per type and serves later lookups without locking.
//!
//! ```ignore
//! use jsv_reader::{Registry, TypeDescriptor};
//!
//! let parse = Registry::global().get_parse_fn(&TypeDescriptor::of::<i32>());
//! let value = parse.call(Some("42"))?.unwrap();
//! assert_eq!(*value.downcast::<i32>().unwrap(), 42);
//! ```
//!
//! # Components
//!
//! - [`registry`] - Snapshot-published type → factory cache
//! - [`binding`] - Per-type lazily resolved parse function
//! - [`strategy`] - Type-specific strategies and their `inventory` registration
//! - [`config`] - TOML configuration for strategy merging

pub mod binding;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod function;
pub mod registry;
pub mod strategy;

pub use binding::{Binding, BindingState};
pub use config::{ConfigError, ReaderConfig};
pub use descriptor::{TypeDescriptor, TypeKind};
pub use error::{ReadError, UnsupportedReason};
pub use function::{FactoryFn, ParseFn, ParseResult, Value};
pub use registry::{Registry, RegistrySnapshot};
pub use strategy::{DuplicatePolicy, StrategyOrigin, StrategySource, StrategyTable};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
}
