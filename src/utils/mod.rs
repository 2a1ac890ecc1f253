//! Supporting utilities
//!
//! - [`iterable`] - Lazy, restartable sequences with first-occurrence grouping
//! - [`progress`] - Spinner for long-running duffle and network calls

pub mod iterable;
pub mod progress;

pub use iterable::{Enumerable, Group, iter};
pub use progress::Spinner;
