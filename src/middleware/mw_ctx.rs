use crate::config::AppConfig;
use crate::database::client::Database;
use crate::geo::GeoIndex;
use crate::interfaces::file_storage::ImageStorageInterface;
use crate::services::points_ledger::Tariff;
use crate::utils::file::local_file_storage::LocalFileStorage;
use crate::utils::jwt::JWT;
use chrono::Duration;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Request parameter bounds applied by the dispatch routes.
#[derive(Debug, Clone)]
pub struct DispatchLimits {
    pub nearby_default_radius_m: f64,
    pub nearby_max_radius_m: f64,
    pub nearby_default_limit: u16,
    pub nearby_max_limit: u16,
    pub leaderboard_default_limit: u16,
    pub leaderboard_max_limit: u16,
}

impl From<&AppConfig> for DispatchLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            nearby_default_radius_m: config.nearby_default_radius_m,
            nearby_max_radius_m: config.nearby_max_radius_m,
            nearby_default_limit: config.nearby_default_limit,
            nearby_max_limit: config.nearby_max_limit,
            leaderboard_default_limit: config.leaderboard_default_limit,
            leaderboard_max_limit: config.leaderboard_max_limit,
        }
    }
}

pub struct CtxState {
    pub db: Database,
    pub upload_max_size_mb: u64,
    pub jwt: JWT,
    pub geo_index: Arc<GeoIndex>,
    pub tariff: Tariff,
    pub limits: DispatchLimits,
    pub file_storage: Arc<dyn ImageStorageInterface + Send + Sync>,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtxState")
            .field("indexed_open_tasks", &self.geo_index.len())
            .field("tariff", &self.tariff)
            .finish_non_exhaustive()
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
    let ctx_state = CtxState {
        db,
        upload_max_size_mb: config.upload_file_size_max_mb,
        jwt: JWT::new(
            config.jwt_secret.clone(),
            Duration::hours(config.jwt_duration_hours),
        ),
        geo_index: Arc::new(GeoIndex::new(config.geo_cell_degrees)),
        tariff: config.tariff.clone(),
        limits: DispatchLimits::from(config),
        file_storage: Arc::new(LocalFileStorage::new(
            config.uploads_dir.clone(),
            config.uploads_base_url.clone(),
        )),
    };
    Arc::new(ctx_state)
}
