//! Domain model for the database design studio.
//!
//! Everything in this crate is pure: workflow steps, functional
//! dependencies, normalized tables, the message log, workflow-canvas
//! geometry, undo/redo history, step navigation, panel layout math and
//! the reducer-style state store. The HTTP client and the terminal UI
//! build on top of it.

pub mod canvas;
pub mod error;
pub mod fd;
pub mod highlight;
pub mod history;
pub mod messages;
pub mod navigation;
pub mod panels;
pub mod store;
pub mod table;
pub mod types;
pub mod workflow;
