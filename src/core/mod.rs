//! Core infrastructure shared by the server entry point and tests.

use std::sync::Arc;

use crate::ai::PromptClient;
use crate::config::Config;
use crate::data::{Database, LoopStore};

/// Process-wide handles for CodeLoop.
///
/// Owns the foundational components: the database connection with its DAO
/// store and the prompt service client. Constructed once at startup and
/// shared read-only; no explicit teardown is required.
pub struct CodeLoopCore {
    /// Application configuration
    config: Config,
    /// Database connection (owned to keep connection alive)
    _database: Option<Database>,
    /// Loop DAO
    loop_store: Option<LoopStore>,
    /// Prompt service client
    prompt_client: Option<Arc<PromptClient>>,
}

impl CodeLoopCore {
    /// Create a new CodeLoopCore with the given configuration.
    pub fn new(config: Config) -> Self {
        let (database, loop_store) = match Database::open(config.resolve_database_path()) {
            Ok(db) => {
                let store = LoopStore::new(db.connection());
                (Some(db), Some(store))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open database");
                (None, None)
            }
        };

        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                "No prompt service API key configured; generation requests will fail until one is set"
            );
        }

        let prompt_client = match PromptClient::new(&config.ai, api_key) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build prompt service client");
                None
            }
        };

        Self {
            config,
            _database: database,
            loop_store,
            prompt_client,
        }
    }

    /// Get the application configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the loop store, if the database opened successfully.
    pub fn loop_store(&self) -> Option<&LoopStore> {
        self.loop_store.as_ref()
    }

    /// Get the prompt service client.
    pub fn prompt_client(&self) -> Option<Arc<PromptClient>> {
        self.prompt_client.clone()
    }
}
