use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::models::view::leaderboard::LeaderboardEntryView;
use crate::services::leaderboard_service::LeaderboardAggregator;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<u16>,
}

async fn get_leaderboard(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<LeaderboardQuery>,
) -> CtxResult<Json<Vec<LeaderboardEntryView>>> {
    ctx.identity()?;
    let list = LeaderboardAggregator::new(&state.db.accounts, &state.limits)
        .top_n(query.limit)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(list))
}
