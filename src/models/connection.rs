// Server configuration model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::query::CollectionRef;

/// The server a panel talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfiguration {
    pub id: Uuid,
    pub label: String,
    pub uri: String,
    /// Database used when a collection reference does not name one.
    #[serde(default)]
    pub default_database: Option<String>,
}

impl ServerConfiguration {
    pub fn new(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), label: label.into(), uri: uri.into(), default_database: None }
    }

    pub fn with_default_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = Some(database.into());
        self
    }

    /// Fill in the default database when `collection` names none.
    pub fn resolve(&self, mut collection: CollectionRef) -> CollectionRef {
        if collection.database.is_empty()
            && let Some(database) = &self.default_database
        {
            collection.database = database.clone();
        }
        collection
    }
}
