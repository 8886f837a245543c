//! Element types that count their own lifetimes.
//!
//! Counters are thread-local: every test runs on its own thread, so tests
//! do not see each other's values.

#![allow(dead_code)]

use std::cell::Cell;

thread_local! {
	static LIVE: Cell<usize> = Cell::new(0);
	static BUDGET: Cell<Option<usize>> = Cell::new(None);
}

/// Number of `Tracked` values currently alive on this thread.
pub fn live() -> usize {
	LIVE.with(Cell::get)
}

/// Lets `n` more constructions succeed, then panics on the next one.
///
/// The budget is cleared by the panic, so later constructions succeed again.
pub fn fail_after(n: usize) {
	BUDGET.with(|budget| budget.set(Some(n)))
}

fn construct() {
	BUDGET.with(|budget| match budget.get() {
		Some(0) => {
			budget.set(None);
			panic!("construction budget exhausted")
		},
		Some(n) => budget.set(Some(n - 1)),
		None => ()
	});
	LIVE.with(|live| live.set(live.get() + 1))
}

/// A value whose constructions (`new`, `clone`, `default`) and drops are counted.
#[derive(Debug)]
pub struct Tracked(pub i32);

impl Tracked {
	pub fn new(value: i32) -> Tracked {
		construct();
		Tracked(value)
	}
}

impl Clone for Tracked {
	fn clone(&self) -> Tracked {
		Tracked::new(self.0)
	}
}

impl Default for Tracked {
	fn default() -> Tracked {
		Tracked::new(-1)
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		LIVE.with(|live| live.set(live.get() - 1))
	}
}

/// Plain values of a tracked slice.
pub fn values(slice: &[Tracked]) -> Vec<i32> {
	slice.iter().map(|t| t.0).collect()
}

/// Panics when dropped while armed.
pub struct Bomb {
	pub armed: bool
}

impl Drop for Bomb {
	fn drop(&mut self) {
		if self.armed {
			panic!("bomb went off")
		}
	}
}
