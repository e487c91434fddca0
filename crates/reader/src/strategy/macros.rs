//! Registration macros for parse strategies.

/// Registers a parse strategy for a type.
///
/// The builder receives the [`Registry`](crate::Registry) so it can resolve
/// component types. Prefix the type with `dyn` to register a strategy for an
/// abstract capability.
///
/// ```ignore
/// jsv_reader::parse_strategy!(Celsius, |_| jsv_reader::ParseFn::token(|s: &str| s.parse().map(Celsius)));
/// jsv_reader::parse_strategy!(Celsius, |_| ..., priority: 10);
/// ```
#[macro_export]
macro_rules! parse_strategy {
	(dyn $capability:path, $build:expr $(, priority: $priority:expr)? $(,)?) => {
		$crate::__strategy_submit!(
			$crate::TypeDescriptor::of_abstract::<dyn $capability>(),
			$build,
			$crate::__strategy_opt!($({$priority})?, 0)
		);
	};
	($ty:ty, $build:expr $(, priority: $priority:expr)? $(,)?) => {
		$crate::__strategy_submit!(
			$crate::TypeDescriptor::of::<$ty>(),
			$build,
			$crate::__strategy_opt!($({$priority})?, 0)
		);
	};
}

/// Registers [`FromStr`](std::str::FromStr)-backed strategies for one or more types.
#[macro_export]
macro_rules! from_str_strategy {
	($($ty:ty),+ $(,)?) => {
		$(
			$crate::parse_strategy!($ty, |_| $crate::ParseFn::via_from_str::<$ty>());
		)+
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strategy_submit {
	($descriptor:expr, $build:expr, $priority:expr) => {
		$crate::__private::inventory::submit! {
			$crate::strategy::StrategyReg {
				descriptor: || $descriptor,
				origin: $crate::strategy::StrategyOrigin::Crate(env!("CARGO_PKG_NAME")),
				priority: $priority,
				build: $build,
			}
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strategy_opt {
	(, $default:expr) => {
		$default
	};
	({$value:expr}, $default:expr) => {
		$value
	};
}
