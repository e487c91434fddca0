use std::convert::Infallible;
use std::sync::Barrier;
use std::thread;

use jsv_reader::{ConfigError, ParseFn, ReadError, ReaderConfig, Registry, TypeDescriptor, UnsupportedReason, Value};

#[derive(Debug, PartialEq)]
struct Foo(String);

jsv_reader::parse_strategy!(Foo, |_| ParseFn::token(|s: &str| Ok::<_, Infallible>(Foo(s.to_uppercase()))));

trait IShape {}

trait Animal: Send {
	fn name(&self) -> &str;
}

struct Dog(String);

impl Animal for Dog {
	fn name(&self) -> &str {
		&self.0
	}
}

jsv_reader::parse_strategy!(dyn Animal, |_| {
	ParseFn::token(|s: &str| Ok::<_, Infallible>(Box::new(Dog(s.to_owned())) as Box<dyn Animal>))
});

#[derive(Debug, PartialEq)]
struct Celsius(f64);

jsv_reader::parse_strategy!(Celsius, |registry| {
	let degrees = registry.parse_fn::<f64>();
	ParseFn::new(move |value| {
		let Some(value) = degrees.call(value.map(|s| s.trim_end_matches('C')))? else {
			return Ok(None);
		};
		match value.downcast::<f64>() {
			Ok(degrees) => Ok(Some(Box::new(Celsius(*degrees)) as Value)),
			Err(_) => Err(ReadError::TypeMismatch { expected: "f64" }),
		}
	})
});

#[test]
fn int_token_parses_through_global_registry() {
	let parse = Registry::global().get_parse_fn(&TypeDescriptor::of::<i32>());
	let value = parse.call(Some("42")).unwrap().unwrap();
	assert_eq!(*value.downcast::<i32>().unwrap(), 42);
	assert!(parse.call(None).unwrap().is_none());
}

#[test]
fn concurrent_callers_share_one_entry() {
	const CALLERS: usize = 50;
	let registry = Registry::global();
	let barrier = Barrier::new(CALLERS);
	let ty = TypeDescriptor::of::<Foo>();

	thread::scope(|scope| {
		for _ in 0..CALLERS {
			let barrier = &barrier;
			scope.spawn(move || {
				barrier.wait();
				let value = registry.get_parse_fn(&ty).call(Some("v")).unwrap().unwrap();
				assert_eq!(*value.downcast::<Foo>().unwrap(), Foo("V".into()));
			});
		}
	});

	let snapshot = registry.snapshot();
	assert_eq!(snapshot.types().filter(|t| **t == ty).count(), 1);
}

#[test]
fn interface_without_strategy_is_unsupported() {
	let parse = Registry::global().get_parse_fn(&TypeDescriptor::of_abstract::<dyn IShape>());
	assert!(parse.call(None).unwrap().is_none());

	let err = parse.call(Some("x")).unwrap_err();
	assert_eq!(err.type_name(), Some("IShape"));
	assert!(matches!(
		err,
		ReadError::UnsupportedType {
			reason: UnsupportedReason::Abstract,
			..
		}
	));
}

#[test]
fn interface_with_registered_strategy_parses() {
	let ty = TypeDescriptor::of_abstract::<dyn Animal>();
	let value = Registry::global().parse_as(&ty, Some("rex")).unwrap().unwrap();
	let animal = value.downcast::<Box<dyn Animal>>().unwrap();
	assert_eq!(animal.name(), "rex");
}

#[test]
fn composite_strategy_uses_builtin_component() {
	let registry = Registry::global();
	assert_eq!(registry.parse::<Celsius>(Some("21.5C")).unwrap(), Some(Celsius(21.5)));
	assert!(registry.contains(&TypeDescriptor::of::<f64>()));
}

#[test]
fn init_global_after_first_use_fails() {
	Registry::global();
	let err = Registry::init_global(ReaderConfig::default()).unwrap_err();
	assert!(matches!(err, ConfigError::GlobalAlreadyInitialized));
}
