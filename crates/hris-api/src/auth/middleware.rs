//! Axum용 JWT 인증 추출기.
//!
//! 서명 키는 라우터 상태에서 `FromRef`로 가져옵니다.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::jwt::{decode_token, Claims, JwtError, JwtKeys};
use super::roles::ADMIN_ROLE;

/// JWT 인증 추출기.
///
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(claims): JwtAuth,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("권한이 부족합니다")]
    Forbidden,
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            JwtAuthError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            JwtAuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            JwtAuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

impl<S> FromRequestParts<S> for JwtAuth
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = JwtAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(JwtAuthError::MissingToken)?;

        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(JwtAuthError::InvalidToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = decode_token(token, &keys).map_err(|e| {
            match &e {
                JwtError::AlgorithmMismatch(alg) => debug!(alg = %alg, "Rejected token algorithm"),
                other => debug!(reason = %other, "Rejected token"),
            }
            JwtAuthError::InvalidToken
        })?;

        Ok(JwtAuth(claims))
    }
}

/// 역할 검사. 없으면 `Forbidden`.
pub fn require_role(role: &str, claims: &Claims) -> Result<(), JwtAuthError> {
    if claims.has_role(role) {
        Ok(())
    } else {
        Err(JwtAuthError::Forbidden)
    }
}

/// Admin 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Claims);

impl<S> FromRequestParts<S> for AdminAuth
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = JwtAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let JwtAuth(claims) = JwtAuth::from_request_parts(parts, state).await?;
        require_role(ADMIN_ROLE, &claims)?;
        Ok(AdminAuth(claims))
    }
}
