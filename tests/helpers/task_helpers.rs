use axum_test::{TestResponse, TestServer};
use cleanup_dispatch::database::repository_impl::Repository;
use cleanup_dispatch::entities::points_credit::PointsCreditEntity;
use cleanup_dispatch::entities::task::{SizeClass, TaskEntity};
use cleanup_dispatch::geo::METERS_PER_DEGREE;
use cleanup_dispatch::middleware::mw_ctx::CtxState;
use cleanup_dispatch::models::view::task::SubmitResponse;
use cleanup_dispatch::services::task_service::{CompleteTaskInput, TaskService};
use serde_json::json;

use super::account_helpers::TestAccount;

#[allow(dead_code)]
pub fn lat_north_of(lat: f64, meters: f64) -> f64 {
    lat + meters / METERS_PER_DEGREE
}

#[allow(dead_code)]
pub async fn submit_task_response(
    server: &TestServer,
    reporter: &TestAccount,
    lat: f64,
    lng: f64,
    size_class: SizeClass,
) -> TestResponse {
    server
        .post("/api/tasks")
        .add_header("Authorization", reporter.bearer())
        .json(&json!({
            "lat": lat,
            "lng": lng,
            "size_class": size_class,
            "before_image_ref": "/uploads/before.jpg",
            "description": "bags next to the bench",
        }))
        .await
}

#[allow(dead_code)]
pub async fn submit_task(
    server: &TestServer,
    reporter: &TestAccount,
    lat: f64,
    lng: f64,
    size_class: SizeClass,
) -> String {
    let res = submit_task_response(server, reporter, lat, lng, size_class).await;
    res.assert_status_success();
    res.json::<SubmitResponse>().task_id
}

#[allow(dead_code)]
pub async fn claim_task(server: &TestServer, picker: &TestAccount, task_id: &str) -> TestResponse {
    server
        .post(&format!("/api/tasks/{task_id}/claim"))
        .add_header("Authorization", picker.bearer())
        .await
}

#[allow(dead_code)]
pub async fn complete_task(server: &TestServer, picker: &TestAccount, task_id: &str) -> TestResponse {
    server
        .post(&format!("/api/tasks/{task_id}/complete"))
        .add_header("Authorization", picker.bearer())
        .json(&json!({ "after_image_ref": "/uploads/after.jpg" }))
        .await
}

#[allow(dead_code)]
pub async fn nearby_tasks(
    server: &TestServer,
    account: &TestAccount,
    lat: f64,
    lng: f64,
    radius: f64,
) -> TestResponse {
    server
        .get(&format!("/api/tasks/nearby?lat={lat}&lng={lng}&radius={radius}"))
        .add_header("Authorization", account.bearer())
        .await
}

#[allow(dead_code)]
pub type DispatchService<'a> = TaskService<'a, Repository<TaskEntity>, Repository<PointsCreditEntity>>;

#[allow(dead_code)]
pub fn dispatch_service(ctx_state: &CtxState) -> DispatchService<'_> {
    TaskService::new(
        &ctx_state.db.client,
        &ctx_state.db.tasks,
        &ctx_state.db.points_credits,
        &ctx_state.geo_index,
        &ctx_state.tariff,
        &ctx_state.limits,
    )
}

#[allow(dead_code)]
pub fn after_image() -> CompleteTaskInput {
    CompleteTaskInput {
        after_image_ref: "/uploads/after.jpg".to_string(),
    }
}
