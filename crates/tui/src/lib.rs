//! Terminal front end of the database design studio.
//!
//! Re-exports internal modules so that integration tests (in `tests/`)
//! can drive the effects, storage and views without a real terminal.

pub mod config;
pub mod effects;
pub mod error;
pub mod gesture;
pub mod runtime;
pub mod storage;
pub mod ui;
