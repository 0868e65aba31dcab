//! Browse and edit MongoDB collections as document trees or flat tables.
//!
//! [`panel::Panel`] is the entry point: it runs queries through a
//! [`operations::DocumentOperations`] implementation (see [`connection::MongoOperations`]),
//! paginates the results, and edits single documents in a working copy.

pub mod bson;
pub mod connection;
pub mod error;
pub mod models;
pub mod navigation;
pub mod operations;
pub mod pagination;
pub mod panel;
pub mod state;
pub mod tree;

pub use error::{Error, Result};
