//! DBRef detection.

use std::fmt;

use mongodb::bson::{Bson, Document};

use super::bson_value_for_edit;

/// A typed pointer to a document in another collection, optionally in another database.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRef {
    pub collection: String,
    pub id: Bson,
    pub database: Option<String>,
}

impl DbRef {
    /// Recognize the `{ "$ref": .., "$id": .., "$db"?: .. }` convention.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let collection = doc.get_str("$ref").ok()?;
        let id = doc.get("$id")?;
        let database = doc.get_str("$db").ok().map(str::to_string);
        Some(Self { collection: collection.to_string(), id: id.clone(), database })
    }

    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Document(doc) => Self::from_document(doc),
            _ => None,
        }
    }

    /// The database holding the target, defaulting to `current` when the ref has none.
    pub fn database_or<'a>(&'a self, current: &'a str) -> &'a str {
        self.database.as_deref().unwrap_or(current)
    }
}

impl fmt::Display for DbRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DBRef({}, {}", self.collection, bson_value_for_edit(&self.id))?;
        if let Some(database) = &self.database {
            write!(f, ", {database}")?;
        }
        f.write_str(")")
    }
}
