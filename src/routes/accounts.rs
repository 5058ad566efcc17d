use crate::database::repository_impl::Repository;
use crate::entities::account::AccountEntity;
use crate::entities::points_credit::PointsCreditEntity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::models::view::account::{AccountView, PointsCreditView, RegisterResponse};
use crate::services::account_service::{AccountService, RegisterInput};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/accounts", post(register_account))
        .route("/api/accounts/current", get(current_account))
        .route("/api/accounts/current/credits", get(current_credits))
}

fn account_service(
    state: &CtxState,
) -> AccountService<'_, Repository<AccountEntity>, Repository<PointsCreditEntity>> {
    AccountService::new(
        &state.db.accounts,
        &state.db.points_credits,
        &state.tariff,
        &state.jwt,
    )
}

async fn register_account(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(data): JsonOrFormValidated<RegisterInput>,
) -> CtxResult<Json<RegisterResponse>> {
    let (account, token) = account_service(&state)
        .register(data)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(RegisterResponse {
        id: account.id_str(),
        token,
    }))
}

async fn current_account(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<AccountView>> {
    let identity = ctx.identity()?;
    let account = account_service(&state)
        .current(&identity)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(account.into()))
}

async fn current_credits(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<PointsCreditView>>> {
    let identity = ctx.identity()?;
    let credits = account_service(&state)
        .credits(&identity)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(credits.into_iter().map(PointsCreditView::from).collect()))
}
