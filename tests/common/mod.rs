//! Shared MongoDB container for integration tests, via Testcontainers.
//!
//! Each `tests/*.rs` file is its own binary and starts at most one MongoDB 7.0
//! container. Tests stay isolated by suffixing every database name with a short
//! UUID. The container lives on its own thread and runtime so it outlives the
//! per-test `#[tokio::test]` runtimes, and an `atexit` hook removes it.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::OnceLock;

use mongodb::bson::Document;
use mongodb::{Client, options::ClientOptions};
use mongopanel::models::{CollectionRef, ServerConfiguration};
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

static CONNECTION_STRING: OnceLock<String> = OnceLock::new();

/// Docker container ID, kept for the `atexit` cleanup hook.
static CONTAINER_ID: OnceLock<String> = OnceLock::new();

unsafe extern "C" {
    fn atexit(f: extern "C" fn()) -> i32;
}

extern "C" fn remove_container() {
    if let Some(id) = CONTAINER_ID.get() {
        let _ = std::process::Command::new("docker")
            .args(["rm", "-f", id])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
    }
}

fn connection_string() -> &'static str {
    CONNECTION_STRING.get_or_init(|| {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create container runtime");

            rt.block_on(async {
                let container = Mongo::default()
                    .with_tag("7.0")
                    .start()
                    .await
                    .expect("Failed to start MongoDB container");

                let _ = CONTAINER_ID.set(container.id().to_string());
                unsafe {
                    atexit(remove_container);
                }

                let host = container.get_host().await.expect("Failed to get host");
                let port = container.get_host_port_ipv4(27017).await.expect("Failed to get port");
                let uri = format!("mongodb://{}:{}", host, port);

                let opts = ClientOptions::parse(&uri).await.expect("Failed to parse");
                let probe = Client::with_options(opts).expect("Failed to create probe client");
                for _ in 0..30 {
                    if probe.list_database_names().await.is_ok() {
                        break;
                    }
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
                drop(probe);

                tx.send(uri).expect("Failed to send connection string");

                // keeps the container alive until the process exits
                std::future::pending::<()>().await;
            });
        });

        rx.recv().expect("Failed to receive connection string")
    })
}

/// A handle to the shared container with its own database namespace.
pub struct MongoTestContainer {
    pub client: Client,
    pub connection_string: String,
    test_id: String,
}

impl MongoTestContainer {
    pub async fn start() -> Self {
        let connection_string = connection_string().to_string();
        let client_options = ClientOptions::parse(&connection_string)
            .await
            .expect("Failed to parse connection string");
        let client = Client::with_options(client_options).expect("Failed to create client");
        let test_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        Self { client, connection_string, test_id }
    }

    /// Namespaced database name for this test.
    pub fn db_name(&self, name: &str) -> String {
        format!("{}_{}", name, self.test_id)
    }

    pub fn collection(&self, db: &str, collection: &str) -> mongodb::Collection<Document> {
        self.client.database(&self.db_name(db)).collection(collection)
    }

    /// The server as the panel sees it.
    pub fn server_config(&self) -> ServerConfiguration {
        ServerConfiguration::new("testcontainer", &self.connection_string)
    }

    pub fn collection_ref(&self, db: &str, collection: &str) -> CollectionRef {
        CollectionRef::new(self.db_name(db), collection)
    }

    /// Insert `documents` into a namespaced collection.
    pub async fn seed(&self, db: &str, collection: &str, documents: Vec<Document>) {
        self.collection(db, collection)
            .insert_many(documents)
            .await
            .expect("Failed to seed documents");
    }
}
