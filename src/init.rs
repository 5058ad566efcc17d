use crate::config::AppConfig;
use crate::geo::GeoPoint;
use crate::interfaces::repositories::task_ifce::TaskRepositoryInterface;
use crate::middleware::error::AppResult;
use crate::middleware::mw_ctx::CtxState;
use crate::routes::{accounts, images, leaderboard, tasks};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Loads every open task into the geo index. Returns the indexed count.
pub async fn warm_geo_index(ctx_state: &CtxState) -> AppResult<usize> {
    let open = ctx_state.db.tasks.list_open().await?;
    ctx_state.geo_index.rebuild(open.into_iter().map(|task| {
        (
            task.id_str(),
            GeoPoint {
                lat: task.lat,
                lng: task.lng,
            },
        )
    }));
    let count = ctx_state.geo_index.len();
    info!("->> geo index warmed with {count} open tasks");
    Ok(count)
}

/// Periodically reloads the geo index from storage so tasks submitted or
/// closed through other instances sharing the database become visible here.
pub fn spawn_geo_resync(ctx_state: Arc<CtxState>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick completes immediately and startup already warmed the index
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = warm_geo_index(&ctx_state).await {
                warn!("->> geo index resync failed: {err}");
            }
        }
    })
}

pub fn main_router(ctx_state: &Arc<CtxState>, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/hc", get(get_hc))
        .merge(tasks::routes())
        .merge(leaderboard::routes())
        .merge(accounts::routes())
        .merge(images::routes(ctx_state.upload_max_size_mb));

    if config.uploads_base_url.starts_with('/') {
        router = router.nest_service(
            &config.uploads_base_url,
            ServeDir::new(&config.uploads_dir),
        );
    }

    router
        .with_state(ctx_state.clone())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
