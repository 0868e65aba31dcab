//! The database collaborator the panel runs queries and writes through.

use mongodb::bson::{Bson, Document};

use crate::error::Result;
use crate::models::{CollectionRef, QueryOptions, ResultSet, ServerConfiguration};

/// Blocking document operations.
///
/// Implementations are called from worker threads for queries and from the panel
/// thread for single-document lookups and writes.
pub trait DocumentOperations: Send + Sync {
    /// Run a query and collect its documents.
    fn load_collection_values(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        options: &QueryOptions,
    ) -> Result<ResultSet>;

    fn find_document_by_id(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        id: &Bson,
    ) -> Result<Option<Document>>;

    /// Replace the document with the same `_id` (inserting it if absent), or insert a
    /// new document when it has no `_id`.
    fn update_document(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        document: Document,
    ) -> Result<()>;

    fn delete_document(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        id: &Bson,
    ) -> Result<()>;

    /// Resolve a DBRef target. `database` is already defaulted by the caller.
    fn find_referenced_document(
        &self,
        config: &ServerConfiguration,
        collection: &str,
        id: &Bson,
        database: &str,
    ) -> Result<Option<Document>> {
        self.find_document_by_id(config, &CollectionRef::new(database, collection), id)
    }
}
