//! Core error types shared by every layer of duffle-explorer.
//!
//! - [`DuffleError`] - typed failures for duffle invocations, index fetches and config
//! - [`ErrorContext`] - user-facing wrapper with details and a suggestion
//! - [`user_friendly_error`] - turn any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Examples
//!
//! ```rust
//! use duffle_explorer::core::{DuffleError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn list() -> Result<Vec<String>> {
//!     Err(DuffleError::DuffleNotFound.into())
//! }
//!
//! if let Err(e) = list() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{DuffleError, ErrorContext, user_friendly_error};
