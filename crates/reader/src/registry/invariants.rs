//! Concurrency invariants of the registry.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use super::*;

struct Marker<const N: usize>;

macro_rules! markers {
	($($n:literal),+ $(,)?) => {
		vec![$(TypeDescriptor::of::<Marker<$n>>()),+]
	};
}

fn marker_registry() -> (Registry, Vec<TypeDescriptor>) {
	let types = markers!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15);
	let mut builder = StrategyTable::builder();
	for (index, ty) in types.iter().enumerate() {
		builder = builder.insert_with(*ty, 0, move |_| {
			ParseFn::token(move |_: &str| Ok::<_, Infallible>(index))
		});
	}
	(Registry::new(builder.build().unwrap()), types)
}

/// Invariant: concurrent first resolutions of distinct types are all retained.
pub(crate) fn inv_no_lost_updates() {
	let (registry, types) = marker_registry();
	let barrier = Barrier::new(types.len());

	thread::scope(|scope| {
		for ty in &types {
			let registry = &registry;
			let barrier = &barrier;
			scope.spawn(move || {
				barrier.wait();
				registry.get_parse_fn(ty);
			});
		}
	});

	let snapshot = registry.snapshot();
	assert_eq!(snapshot.len(), types.len());
	for (index, ty) in types.iter().enumerate() {
		assert!(snapshot.contains(ty), "lost entry for {}", ty.name());
		let value = registry.parse_as(ty, Some("")).unwrap().unwrap();
		assert_eq!(*value.downcast::<usize>().unwrap(), index);
	}
}

#[cfg_attr(test, test)]
pub(crate) fn test_no_lost_updates() {
	for _ in 0..8 {
		inv_no_lost_updates();
	}
}

#[derive(Debug, PartialEq)]
struct Foo(String);

/// Invariant: racing first references to one type agree on one binding and one entry.
pub(crate) fn inv_concurrent_novel_type() {
	const CALLERS: usize = 50;

	let builds = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&builds);
	let table = StrategyTable::builder()
		.insert::<Foo, _>(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
			ParseFn::token(|s: &str| Ok::<_, Infallible>(Foo(format!("foo:{s}"))))
		})
		.build()
		.unwrap();
	let registry = Registry::new(table);
	let barrier = Barrier::new(CALLERS);
	let ty = TypeDescriptor::of::<Foo>();

	let bindings: Vec<Arc<Binding>> = thread::scope(|scope| {
		let handles: Vec<_> = (0..CALLERS)
			.map(|_| {
				let registry = &registry;
				let barrier = &barrier;
				scope.spawn(move || {
					barrier.wait();
					let parse = registry.get_parse_fn(&ty);
					let value = parse.call(Some("v")).unwrap().unwrap();
					assert_eq!(*value.downcast::<Foo>().unwrap(), Foo("foo:v".into()));
					registry.binding(&ty)
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(registry.len(), 1);
	assert_eq!(registry.binding_count(), 1);
	assert!(bindings.iter().all(|b| Arc::ptr_eq(b, &bindings[0])));
	let builds = builds.load(Ordering::SeqCst);
	assert!((1..=CALLERS).contains(&builds), "strategy built {builds} times");
}

#[cfg_attr(test, test)]
pub(crate) fn test_concurrent_novel_type() {
	inv_concurrent_novel_type()
}

/// Invariant: published snapshots never change, later ones only grow.
pub(crate) fn inv_snapshot_append_only() {
	let (registry, types) = marker_registry();

	registry.get_parse_fn(&types[0]);
	let before = registry.snapshot();
	let factory = before.get(&types[0]).cloned().unwrap();

	registry.get_parse_fn(&types[1]);
	let after = registry.snapshot();

	assert_eq!(before.len(), 1);
	assert!(!before.contains(&types[1]));
	assert_eq!(after.len(), 2);
	assert!(after.get(&types[0]).unwrap().ptr_eq(&factory));

	// Re-resolving a cached type publishes nothing new.
	registry.get_parse_fn(&types[0]);
	assert!(Arc::ptr_eq(&after, &registry.snapshot()));
}

#[cfg_attr(test, test)]
pub(crate) fn test_snapshot_append_only() {
	inv_snapshot_append_only()
}
