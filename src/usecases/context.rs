use std::sync::Arc;

use crate::{
    api::MarketplaceClient,
    infra::{config::AppConfig, storage_layout::StorageLayout},
};

use super::identity::IdentityStore;

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub layout: StorageLayout,
    pub identity: Arc<IdentityStore>,
    pub client: Arc<MarketplaceClient>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        layout: StorageLayout,
        identity: IdentityStore,
        client: MarketplaceClient,
    ) -> Self {
        Self {
            config,
            layout,
            identity: Arc::new(identity),
            client: Arc::new(client),
        }
    }
}
