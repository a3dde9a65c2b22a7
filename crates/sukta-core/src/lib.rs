//! Core domain model for sukta.
//!
//! This crate defines the hymn corpus, the deity vocabulary, binary deity
//! vectors, similarity metrics and namespaces, the deity rule set, and the
//! SQLite schema that persists all of them.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod rules;
pub mod schema;

pub use error::{Error, Result};
