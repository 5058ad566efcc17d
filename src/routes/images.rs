use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::models::view::account::ImageUploadResponse;
use crate::utils::file::convert::convert_field_file_data;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::post;
use axum::{Json, Router};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use std::sync::Arc;
use tempfile::NamedTempFile;
use uuid::Uuid;

pub fn routes(upload_max_size_mb: u64) -> Router<Arc<CtxState>> {
    let max_bytes_val = (1024 * 1024 * upload_max_size_mb) as usize;
    Router::new()
        .route("/api/images", post(upload_image))
        .layer(DefaultBodyLimit::max(max_bytes_val))
}

#[derive(TryFromMultipart)]
pub struct ImageUploadInput {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

async fn upload_image(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    TypedMultipart(input): TypedMultipart<ImageUploadInput>,
) -> CtxResult<Json<ImageUploadResponse>> {
    ctx.identity()?;
    let file = convert_field_file_data(input.file).map_err(|e| ctx.to_ctx_error(e.error))?;
    let object_name = format!("{}.{}", Uuid::new_v4().simple(), file.extension);
    let image_ref = state
        .file_storage
        .upload(file.data, None, &object_name, file.content_type.as_deref())
        .await
        .map_err(|description| ctx.to_ctx_error(AppError::Generic { description }))?;
    Ok(Json(ImageUploadResponse { image_ref }))
}
