//! Built-in strategies for std scalar types.

use super::{StrategyOrigin, StrategyReg};
use crate::descriptor::TypeDescriptor;
use crate::function::ParseFn;

macro_rules! builtin_from_str {
	($($ty:ty),+ $(,)?) => {
		$(
			inventory::submit! {
				StrategyReg {
					descriptor: || TypeDescriptor::of::<$ty>(),
					origin: StrategyOrigin::Builtin,
					priority: 0,
					build: |_| ParseFn::via_from_str::<$ty>(),
				}
			}
		)+
	};
}

builtin_from_str!(
	i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
);
