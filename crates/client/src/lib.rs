//! REST client for the dataset analysis backend.
//!
//! Provides typed wrappers for every backend endpoint (dataset upload,
//! step triggers, generated code, normalized tables, functional
//! dependencies, decomposed schemas, ER diagram image) and the error type
//! that turns failures into user-facing messages.

pub mod api;
pub mod messages;
