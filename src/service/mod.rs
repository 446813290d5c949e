pub mod bundle_service;
pub mod registration_service;
pub mod settings_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::integrations::DocumentFetcher;
use crate::storage::DocumentStorage;
use bundle_service::BundleService;
use registration_service::RegistrationService;
use settings_service::SettingsService;

pub use bundle_service::MemberBundle;
pub use settings_service::AllocatedIdentifiers;

pub struct ServiceContext {
    pub member_repo: Arc<dyn MemberRepository>,
    pub storage: Arc<dyn DocumentStorage>,
    pub settings_service: Arc<SettingsService>,
    pub registration_service: Arc<RegistrationService>,
    pub bundle_service: Arc<BundleService>,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        storage: Arc<dyn DocumentStorage>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Self {
        let member_repo = Arc::new(SqliteMemberRepository::new(db_pool.clone()));
        let settings_service = Arc::new(SettingsService::new(db_pool.clone()));
        let registration_service = Arc::new(RegistrationService::new(db_pool, storage.clone()));
        let bundle_service = Arc::new(BundleService::new(storage.clone(), fetcher));

        Self {
            member_repo,
            storage,
            settings_service,
            registration_service,
            bundle_service,
        }
    }
}
