//! Core ConnectionManager struct and basic connection methods.

use std::collections::HashMap;
use std::time::Duration;

use mongodb::Client;
use mongodb::bson::doc;
use parking_lot::Mutex;
use tokio::runtime::Runtime;

use crate::error::{Error, Result};
use crate::models::ServerConfiguration;

/// Manages MongoDB client connections with caching
pub struct ConnectionManager {
    /// Tokio runtime for MongoDB async operations
    pub(crate) runtime: Runtime,
    clients: Mutex<HashMap<String, Client>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new()?;
        Ok(Self { runtime, clients: Mutex::new(HashMap::new()) })
    }

    /// Get a handle to the Tokio runtime for spawning parallel tasks
    pub fn runtime_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Return the cached client for a server, connecting on first use.
    pub fn client(&self, config: &ServerConfiguration) -> Result<Client> {
        if let Some(client) = self.clients.lock().get(&config.uri) {
            return Ok(client.clone());
        }

        let client = self.connect(config)?;
        log::debug!("Connected to {}", config.label);
        self.clients.lock().insert(config.uri.clone(), client.clone());
        Ok(client)
    }

    /// Drop the cached client so the next call reconnects.
    pub fn forget(&self, config: &ServerConfiguration) {
        self.clients.lock().remove(&config.uri);
    }

    /// Connect to MongoDB using the server config (runs in Tokio runtime)
    pub fn connect(&self, config: &ServerConfiguration) -> Result<Client> {
        let uri = config.uri.clone();
        self.runtime.block_on(async {
            let client = Client::with_uri_str(&uri).await?;

            // Ping to verify connection
            client.database("admin").run_command(doc! { "ping": 1 }).await?;

            Ok(client)
        })
    }

    /// Test connectivity with a timeout (runs in Tokio runtime)
    pub fn test_connection(&self, config: &ServerConfiguration, timeout: Duration) -> Result<()> {
        let uri = config.uri.clone();
        self.runtime.block_on(async {
            let fut = async {
                let client = Client::with_uri_str(&uri).await?;
                client.database("admin").run_command(doc! { "ping": 1 }).await?;
                Ok::<(), mongodb::error::Error>(())
            };

            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => Err(Error::Timeout("Connection timed out".to_string())),
            }
        })
    }
}
