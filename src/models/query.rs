//! Query inputs and results.

use std::fmt;
use std::sync::Arc;

use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use crate::bson::parse_optional_document;
use crate::error::{Error, Result};

/// Row limit applied when the user leaves the field untouched.
pub const DEFAULT_RESULT_LIMIT: usize = 300;

/// A collection inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl CollectionRef {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self { database: database.into(), collection: collection.into() }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Options for loading collection values.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub filter: Option<Document>,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    /// Maximum number of documents fetched; 0 means no limit.
    pub limit: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { filter: None, projection: None, sort: None, limit: DEFAULT_RESULT_LIMIT }
    }
}

impl QueryOptions {
    pub fn with_filter(mut self, filter: Document) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Build options from the raw text of the query inputs.
    ///
    /// Everything is validated here so a malformed input never reaches the executor.
    /// A blank row limit falls back to `default_limit`.
    pub fn from_raw(
        filter: &str,
        projection: &str,
        sort: &str,
        row_limit: &str,
        default_limit: usize,
    ) -> Result<Self> {
        let clause = |name: &str, raw: &str| {
            parse_optional_document(raw).map_err(|e| Error::Validation(format!("{name}: {e}")))
        };
        Ok(Self {
            filter: clause("filter", filter)?,
            projection: clause("projection", projection)?,
            sort: clause("sort", sort)?,
            limit: parse_row_limit(row_limit, default_limit)?,
        })
    }
}

/// Parse the row-limit field. Blank input falls back to `default`.
pub fn parse_row_limit(input: &str, default: usize) -> Result<usize> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed.parse::<usize>().map_err(|_| {
        Error::Validation(format!("Row limit must be a non-negative integer, got '{trimmed}'"))
    })
}

/// The documents returned by one query execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub collection: String,
    pub documents: Vec<Document>,
}

impl ResultSet {
    pub fn new(collection: impl Into<String>, documents: Vec<Document>) -> Self {
        Self { collection: collection.into(), documents }
    }

    pub fn empty(collection: impl Into<String>) -> Self {
        Self::new(collection, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Result sets are shared read-only between the worker and the view.
pub type SharedResultSet = Arc<ResultSet>;
