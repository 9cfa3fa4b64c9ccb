//! Service wiring from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use codepage_cache::TokenCache;
use codepage_client::{
    Authenticator, RemoteRecordStore, RequestClient, ReqwestTransport, RetryPolicy,
};
use codepage_core::config::{AppConfig, CollectionsConfig};
use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::traits::clock::SystemClock;
use codepage_core::traits::store::RecordStore;
use codepage_core::traits::transport::HttpTransport;
use codepage_core::types::id::CollectionId;
use codepage_service::{CodepageService, VersionService};
use codepage_validate::Validator;

/// Everything a command needs, built once per invocation.
#[derive(Debug, Clone)]
pub struct Services {
    /// Lifecycle service.
    pub codepages: Arc<CodepageService>,
    /// Version control service.
    pub versions: Arc<VersionService>,
    /// Static validator.
    pub validator: Arc<Validator>,
    /// Configured collections.
    pub collections: CollectionsConfig,
}

impl Services {
    /// Wire services against the configured remote store.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.store)?);
        Self::with_transport(config, transport)
    }

    /// Wire services over an explicit transport.
    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> AppResult<Self> {
        if config.collections.codepages.is_empty() {
            return Err(AppError::configuration(
                "collections.codepages is not set (CODEPAGE__COLLECTIONS__CODEPAGES)",
            ));
        }

        let authenticator = Authenticator::from_config(&config.auth)?;
        debug!(mode = ?authenticator.mode(), base_url = %config.store.base_url, "Wiring services");

        let tokens = Arc::new(TokenCache::new(
            Duration::from_secs(config.auth.token_freshness_seconds),
            Arc::new(SystemClock),
        ));
        let client = RequestClient::new(
            transport,
            authenticator,
            tokens,
            RetryPolicy::from_config(&config.retry),
        )
        .with_realm(config.store.realm_hostname.clone());

        let store: Arc<dyn RecordStore> = Arc::new(RemoteRecordStore::from_config(
            Arc::new(client),
            &config.cache,
            &config.collections,
        ));
        let validator = Arc::new(Validator::new()?);
        let codepages = Arc::new(CodepageService::new(store.clone(), validator.clone()));
        let versions = Arc::new(VersionService::new(
            store,
            codepages.clone(),
            &config.collections,
        ));

        Ok(Self {
            codepages,
            versions,
            validator,
            collections: config.collections.clone(),
        })
    }

    /// The codepages collection.
    pub fn codepage_collection(&self) -> &CollectionId {
        &self.collections.codepages
    }
}
