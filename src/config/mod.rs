//! Configuration loading.
//!
//! See [`ExplorerConfig`] for the file format and lookup order.

mod global;

pub use global::ExplorerConfig;
