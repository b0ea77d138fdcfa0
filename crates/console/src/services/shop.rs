//! Shop analytics and store lookups.

use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};
use domain::{ShopAnalytics, StoreLookup};

use crate::clients::ShopBackend;

pub struct ShopService {
    backend: Arc<dyn ShopBackend>,
}

impl ShopService {
    pub fn new(backend: Arc<dyn ShopBackend>) -> Self {
        Self { backend }
    }

    pub async fn analytics(&self) -> AppResult<ShopAnalytics> {
        self.backend.analytics().await
    }

    /// Look up a store's shop. A store the backend does not know yet needs
    /// to be registered rather than reported as an error.
    pub async fn store_lookup(&self, store_id: &str) -> AppResult<StoreLookup> {
        let store_id = store_id.trim();
        if store_id.is_empty() {
            return Err(AppError::validation("Store id is required"));
        }

        match self.backend.store(store_id).await {
            Ok(store) => Ok(StoreLookup::Found(store)),
            Err(AppError::NotFound(_)) => {
                info!(store_id, "Store has no shop record yet");
                Ok(StoreLookup::NeedsRegistration)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::clients::MockShopBackend;

    #[tokio::test]
    async fn test_unknown_store_needs_registration() {
        let mut backend = MockShopBackend::new();
        backend
            .expect_store()
            .withf(|id| id == "s9")
            .returning(|_| Err(AppError::not_found("Store")));

        let lookup = ShopService::new(Arc::new(backend))
            .store_lookup(" s9 ")
            .await
            .unwrap();

        assert_eq!(lookup, StoreLookup::NeedsRegistration);
    }

    #[tokio::test]
    async fn test_other_failures_are_returned() {
        let mut backend = MockShopBackend::new();
        backend
            .expect_store()
            .returning(|_| Err(AppError::forbidden("Admins only")));

        let err = ShopService::new(Arc::new(backend))
            .store_lookup("s1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
