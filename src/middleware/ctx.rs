use std::sync::Arc;

use super::error::{AppError, AppResult, CtxError, CtxResult};
use crate::database::surrdb_utils::get_thing;
use crate::entities::account::{AccountRole, TABLE_NAME as ACCOUNT_TABLE_NAME};
use crate::middleware::mw_ctx::CtxState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use surrealdb::sql::Thing;
use uuid::Uuid;

/// Caller resolved from the bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
    pub role: AccountRole,
}

impl Identity {
    pub fn account_thing(&self) -> Thing {
        get_thing(ACCOUNT_TABLE_NAME, &self.account_id)
    }

    pub fn require_role(&self, role: AccountRole) -> AppResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                required: role.to_string(),
            })
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ctx {
    result_identity: AppResult<Identity>,
    pub req_id: Uuid,
}

impl Ctx {
    pub fn new(result_identity: AppResult<Identity>) -> Self {
        Self {
            result_identity,
            req_id: Uuid::new_v4(),
        }
    }

    pub fn identity(&self) -> CtxResult<Identity> {
        self.result_identity
            .clone()
            .map_err(|error| self.to_ctx_error(error))
    }

    pub fn to_ctx_error(&self, error: AppError) -> CtxError {
        CtxError {
            error,
            req_id: self.req_id,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<CtxState>> for Ctx {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state): State<Arc<CtxState>> = State::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let identity = match parts.headers.typed_get::<Authorization<Bearer>>() {
            Some(token) => app_state
                .jwt
                .decode(token.token())
                .map(|claims| Identity {
                    account_id: claims.auth,
                    role: claims.role,
                })
                .map_err(AppError::from),
            None => Err(AppError::AuthFailNoToken),
        };

        Ok(Ctx::new(identity))
    }
}
