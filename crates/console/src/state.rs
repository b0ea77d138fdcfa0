//! Application state for dependency injection.
//!
//! Wires the session store, the HTTP client, the request scheduler and every
//! service once per process. Commands receive an `AppState` and never build
//! clients themselves.

use std::sync::Arc;

use tracing::debug;

use common::AppResult;

use crate::clients::{
    ApiClient, AuthClient, BackendDirectory, Directory, ShopBackend, ShopClient, SupportBackend,
    SupportClient,
};
use crate::config::ConsoleConfig;
use crate::scheduler::RequestScheduler;
use crate::services::{
    Aggregator, ApprovalService, DashboardService, Enricher, ShopService, SupportDesk, UserManager,
};
use crate::session::{FileSessionStore, SessionProvider};

/// Services shared by every command.
#[derive(Clone)]
pub struct AppState {
    pub config: ConsoleConfig,
    pub session: Arc<dyn SessionProvider>,
    pub auth: Arc<AuthClient>,
    pub approvals: Arc<ApprovalService>,
    pub users: Arc<UserManager>,
    pub dashboard: Arc<DashboardService>,
    pub shop: Arc<ShopService>,
    pub support: Arc<SupportDesk>,
}

impl AppState {
    /// Build the state with the session persisted at the configured path.
    pub fn new(config: ConsoleConfig) -> AppResult<Self> {
        let session: Arc<dyn SessionProvider> =
            Arc::new(FileSessionStore::new(config.session.path.clone()));
        Self::with_session(config, session)
    }

    /// Build the state around an existing session provider.
    pub fn with_session(
        config: ConsoleConfig,
        session: Arc<dyn SessionProvider>,
    ) -> AppResult<Self> {
        let api = Arc::new(ApiClient::new(&config.http, session.clone())?);
        let scheduler = Arc::new(RequestScheduler::new(&config.scheduler));

        let directory: Arc<dyn Directory> = Arc::new(BackendDirectory::new(api.clone()));
        let shop_backend: Arc<dyn ShopBackend> = Arc::new(ShopClient::new(
            api.clone(),
            config.http.analytics_timeout(),
        ));
        let support_backend: Arc<dyn SupportBackend> = Arc::new(SupportClient::new(api.clone()));

        let aggregator = Arc::new(Aggregator::new(
            directory.clone(),
            scheduler.clone(),
            config.poll.broad_query_limit,
        ));
        let enricher = Arc::new(Enricher::new(directory.clone(), scheduler));

        debug!(base_url = %api.base_url(), "Console services ready");

        Ok(Self {
            auth: Arc::new(AuthClient::new(api)),
            approvals: Arc::new(ApprovalService::new(
                directory.clone(),
                aggregator.clone(),
                enricher.clone(),
            )),
            users: Arc::new(UserManager::new(directory, aggregator.clone(), enricher)),
            dashboard: Arc::new(DashboardService::new(aggregator, shop_backend.clone())),
            shop: Arc::new(ShopService::new(shop_backend)),
            support: Arc::new(SupportDesk::new(support_backend)),
            session,
            config,
        })
    }
}
