use crate::database::repository_impl::Repository;
use crate::entities::points_credit::PointsCreditEntity;
use crate::entities::task::TaskEntity;
use crate::middleware;
use crate::models::view::task::{
    ClaimResponse, CompleteResponse, NearbyTaskView, SubmitResponse, TaskView,
};
use crate::services::task_service::{
    CompleteTaskInput, NearbyQuery, SubmitTaskInput, TaskService,
};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use middleware::ctx::Ctx;
use middleware::error::CtxResult;
use middleware::mw_ctx::CtxState;
use middleware::utils::extractor_utils::JsonOrFormValidated;
use std::sync::Arc;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/tasks", post(submit_task))
        .route("/api/tasks/nearby", get(nearby_tasks))
        .route("/api/tasks/reported", get(reported_tasks))
        .route("/api/tasks/claimed", get(claimed_tasks))
        .route("/api/tasks/:task_id", get(get_task))
        .route("/api/tasks/:task_id/claim", post(claim_task))
        .route("/api/tasks/:task_id/complete", post(complete_task))
}

type DispatchService<'a> =
    TaskService<'a, Repository<TaskEntity>, Repository<PointsCreditEntity>>;

fn task_service(state: &CtxState) -> DispatchService<'_> {
    TaskService::new(
        &state.db.client,
        &state.db.tasks,
        &state.db.points_credits,
        &state.geo_index,
        &state.tariff,
        &state.limits,
    )
}

async fn submit_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(data): JsonOrFormValidated<SubmitTaskInput>,
) -> CtxResult<Json<SubmitResponse>> {
    let identity = ctx.identity()?;
    let task = task_service(&state)
        .submit(&identity, data)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(SubmitResponse {
        task_id: task.id_str(),
    }))
}

async fn nearby_tasks(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<NearbyQuery>,
) -> CtxResult<Json<Vec<NearbyTaskView>>> {
    ctx.identity()?;
    let list = task_service(&state)
        .nearby(query)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(list))
}

async fn get_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
) -> CtxResult<Json<TaskView>> {
    ctx.identity()?;
    let task = task_service(&state)
        .get(&task_id)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(task.into()))
}

async fn reported_tasks(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<TaskView>>> {
    let identity = ctx.identity()?;
    let list = task_service(&state)
        .list_reported(&identity)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(list.into_iter().map(TaskView::from).collect()))
}

async fn claimed_tasks(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<TaskView>>> {
    let identity = ctx.identity()?;
    let list = task_service(&state)
        .list_claimed(&identity)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(list.into_iter().map(TaskView::from).collect()))
}

async fn claim_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
) -> CtxResult<Json<ClaimResponse>> {
    let identity = ctx.identity()?;
    task_service(&state)
        .claim(&identity, &task_id)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(ClaimResponse { ok: true }))
}

async fn complete_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
    JsonOrFormValidated(data): JsonOrFormValidated<CompleteTaskInput>,
) -> CtxResult<Json<CompleteResponse>> {
    let identity = ctx.identity()?;
    let points_awarded = task_service(&state)
        .complete(&identity, &task_id, data)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(CompleteResponse {
        ok: true,
        points_awarded,
    }))
}
