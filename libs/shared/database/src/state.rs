use std::sync::Arc;

use shared_config::{AppConfig, StoreBackend};

use crate::gateway::StoreGateway;
use crate::memory::InMemoryStore;
use crate::supabase::SupabaseStore;

/// Shared router state: configuration plus the injected store gateway.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn StoreGateway>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn StoreGateway>) -> Self {
        Self { config, store }
    }

    /// Builds the store selected by `config.store_backend`.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store: Arc<dyn StoreGateway> = match config.store_backend {
            StoreBackend::Supabase => Arc::new(SupabaseStore::new(&config)),
            StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        };
        Self { config, store }
    }
}
