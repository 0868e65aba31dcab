//! MongoDB connection management and operations.
//!
//! This module provides:
//! - `ConnectionManager`: client cache and the Tokio runtime the driver runs on
//! - `MongoOperations`: the driver-backed `DocumentOperations`

mod documents;
pub mod manager;

use std::sync::Arc;

use mongodb::bson::{Bson, Document};

pub use manager::ConnectionManager;

use crate::error::{Error, Result};
use crate::models::{CollectionRef, QueryOptions, ResultSet, ServerConfiguration};
use crate::operations::DocumentOperations;

/// Runs panel operations against a live server.
#[derive(Clone)]
pub struct MongoOperations {
    manager: Arc<ConnectionManager>,
}

impl MongoOperations {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }
}

impl DocumentOperations for MongoOperations {
    fn load_collection_values(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        options: &QueryOptions,
    ) -> Result<ResultSet> {
        let client = self.manager.client(config).map_err(Error::into_query)?;
        let documents = self
            .manager
            .find_documents(&client, collection, options)
            .map_err(Error::into_query)?;
        Ok(ResultSet::new(collection.collection.clone(), documents))
    }

    fn find_document_by_id(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        id: &Bson,
    ) -> Result<Option<Document>> {
        let client = self.manager.client(config)?;
        self.manager.find_document_by_id(&client, collection, id)
    }

    fn update_document(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        document: Document,
    ) -> Result<()> {
        let client = self.manager.client(config).map_err(Error::into_update)?;
        let result = match document.get("_id").cloned() {
            Some(id) => self.manager.replace_document(&client, collection, &id, document),
            None => self.manager.insert_document(&client, collection, document),
        };
        result.map_err(Error::into_update)
    }

    fn delete_document(
        &self,
        config: &ServerConfiguration,
        collection: &CollectionRef,
        id: &Bson,
    ) -> Result<()> {
        let client = self.manager.client(config).map_err(Error::into_update)?;
        let deleted =
            self.manager.delete_document(&client, collection, id).map_err(Error::into_update)?;
        if deleted == 0 {
            log::warn!("Delete on {collection} matched no document");
        }
        Ok(())
    }
}
