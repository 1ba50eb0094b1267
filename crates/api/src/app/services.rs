use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use assettrack_infra::{EventStore, InMemoryEventStore, PostgresEventStore, StateProjector};

use crate::config::ApiConfig;

/// Store handle shared by every request.
pub type SharedStore = Arc<dyn EventStore>;

/// Services injected into handlers via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    projector: StateProjector<SharedStore>,
    backend: &'static str,
}

impl AppServices {
    pub fn new(store: SharedStore, backend: &'static str) -> Self {
        Self {
            projector: StateProjector::new(store),
            backend,
        }
    }

    /// Process-local store; everything is lost on shutdown.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryEventStore::new()), "in-memory")
    }

    /// Postgres when `database_url` is set, otherwise in-memory.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        match &config.database_url {
            Some(url) => {
                let store = PostgresEventStore::connect(url, config.max_connections)
                    .await
                    .context("failed to connect to postgres")?;
                info!(max_connections = config.max_connections, "postgres event store ready");
                Ok(Self::new(Arc::new(store), "postgres"))
            }
            None => {
                info!("no database_url configured; events are kept in memory");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn store(&self) -> &SharedStore {
        self.projector.store()
    }

    pub fn projector(&self) -> &StateProjector<SharedStore> {
        &self.projector
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }
}
