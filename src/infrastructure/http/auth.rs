//! Actor Identity Extractor
//!
//! 认证由外部网关完成，网关把已认证用户的 ID 写入配置的请求头（默认 `x-user-id`）。
//! 这里只负责读取并确认该用户存在。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::{User, UserId};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 当前操作者
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        *self.0.id()
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = state.user_header.as_str();

        let raw = parts
            .headers
            .get(&state.user_header)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", header)))?;

        let user_id = Uuid::parse_str(raw.trim())
            .map(UserId::from_uuid)
            .map_err(|_| ApiError::Unauthorized(format!("Malformed {} header", header)))?;

        let user = state
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .ok_or_else(|| ApiError::Unauthorized(format!("Unknown user: {}", user_id)))?;

        Ok(CurrentUser(user))
    }
}
