//! 인증 및 사용자 관리 endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use hris_core::HrisError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::json_body;
use crate::auth::{issue_token, AdminAuth, JwtAuth, TokenResponse};
use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 토큰 주체 정보.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub username: String,
    pub roles: Vec<String>,
    pub expires_at: i64,
}

/// 사용자 생성 요청.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// 생성된 사용자. 해시는 포함하지 않습니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub roles: Vec<String>,
}

/// 로그인.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let request = json_body(body)?;
    let check = state
        .credentials
        .validate_credentials(&request.username, &request.password)
        .await
        .map_err(api_error)?;

    if !check.valid {
        warn!(username = %request.username, "Login rejected");
        return Err(api_error(HrisError::Unauthorized(
            "bad credentials".to_string(),
        )));
    }

    let token = issue_token(&state.jwt, request.username.trim(), &check.roles)
        .map_err(|e| api_error(HrisError::Internal(e.to_string())))?;
    info!(username = %request.username, roles = ?check.roles, "Login succeeded");
    Ok(Json(token))
}

/// 현재 토큰의 주체와 역할.
///
/// GET /api/v1/auth/me
pub async fn me(JwtAuth(claims): JwtAuth) -> Json<MeResponse> {
    Json(MeResponse {
        roles: claims.roles().into_iter().collect(),
        username: claims.sub,
        expires_at: claims.exp,
    })
}

/// 사용자 생성 (또는 교체).
///
/// POST /api/v1/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let request = json_body(body)?;
    state
        .credentials
        .create_user(&request.username, &request.password, &request.roles)
        .await
        .map_err(api_error)?;

    let roles = crate::auth::normalize_roles(request.roles.iter().map(String::as_str));
    info!(created_by = %admin.sub, username = %request.username.trim(), "User created via API");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: request.username.trim().to_string(),
            roles: roles.into_iter().collect(),
        }),
    ))
}

/// 관리자 확인.
///
/// GET /api/v1/admin
pub async fn admin_check(AdminAuth(claims): AdminAuth) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "admin": true, "username": claims.sub }))
}

/// 인증 라우터.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

/// 사용자 관리 라우터.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_user))
}

/// 관리자 라우터.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(admin_check))
}
