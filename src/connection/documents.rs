//! Document CRUD operations for MongoDB collections.

use mongodb::{Client, Collection};
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{FindOptions, ReplaceOptions};

use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::models::{CollectionRef, QueryOptions};

impl ConnectionManager {
    /// Find documents in a collection (runs in Tokio runtime)
    pub fn find_documents(
        &self,
        client: &Client,
        target: &CollectionRef,
        opts: &QueryOptions,
    ) -> Result<Vec<Document>> {
        use futures::TryStreamExt;

        let client = client.clone();
        let filter = opts.filter.clone().unwrap_or_default();

        self.runtime.block_on(async {
            let coll = collection(&client, target);

            let mut options = FindOptions::default();
            if opts.limit > 0 {
                options.limit = Some(i64::try_from(opts.limit).unwrap_or(i64::MAX));
            }
            options.sort = opts.sort.clone();
            options.projection = opts.projection.clone();

            let cursor = coll.find(filter).with_options(options).await?;
            let documents: Vec<Document> = cursor.try_collect().await?;

            Ok(documents)
        })
    }

    /// Find one document by `_id` (runs in Tokio runtime)
    pub fn find_document_by_id(
        &self,
        client: &Client,
        target: &CollectionRef,
        id: &Bson,
    ) -> Result<Option<Document>> {
        let client = client.clone();
        let filter = doc! { "_id": id.clone() };

        self.runtime.block_on(async {
            let coll = collection(&client, target);
            Ok(coll.find_one(filter).await?)
        })
    }

    /// Insert a document into a collection (runs in Tokio runtime)
    pub fn insert_document(
        &self,
        client: &Client,
        target: &CollectionRef,
        document: Document,
    ) -> Result<()> {
        let client = client.clone();

        self.runtime.block_on(async {
            let coll = collection(&client, target);
            coll.insert_one(document).await?;
            Ok(())
        })
    }

    /// Replace a document by _id, inserting it when missing (runs in Tokio runtime)
    pub fn replace_document(
        &self,
        client: &Client,
        target: &CollectionRef,
        id: &Bson,
        replacement: Document,
    ) -> Result<()> {
        let client = client.clone();
        let filter = doc! { "_id": id.clone() };

        self.runtime.block_on(async {
            let coll = collection(&client, target);
            let mut options = ReplaceOptions::default();
            options.upsert = Some(true);
            coll.replace_one(filter, replacement).with_options(options).await?;
            Ok(())
        })
    }

    /// Delete a document by _id (runs in Tokio runtime)
    pub fn delete_document(
        &self,
        client: &Client,
        target: &CollectionRef,
        id: &Bson,
    ) -> Result<u64> {
        let client = client.clone();
        let filter = doc! { "_id": id.clone() };

        self.runtime.block_on(async {
            let coll = collection(&client, target);
            let result = coll.delete_one(filter).await?;
            Ok(result.deleted_count)
        })
    }
}

fn collection(client: &Client, target: &CollectionRef) -> Collection<Document> {
    client.database(&target.database).collection::<Document>(&target.collection)
}
