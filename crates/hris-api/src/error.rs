//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::StatusCode;
use axum::Json;
use hris_core::HrisError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "찾을 수 없음: employees/emp-123",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 에러 종류별 HTTP 상태 코드.
pub fn status_for(err: &HrisError) -> StatusCode {
    match err {
        HrisError::Validation(_) => StatusCode::BAD_REQUEST,
        HrisError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        HrisError::Forbidden(_) => StatusCode::FORBIDDEN,
        HrisError::NotFound(_) => StatusCode::NOT_FOUND,
        HrisError::Conflict(_) | HrisError::VersionConflict { .. } => StatusCode::CONFLICT,
        HrisError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        HrisError::Config(_) | HrisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `HrisError`를 API 에러 응답으로 변환.
///
/// 서버 측 에러는 응답 전에 로그로 남깁니다.
pub fn api_error(err: HrisError) -> (StatusCode, Json<ApiErrorResponse>) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(code = err.code(), error = %err, "Request failed");
    }

    let body = match &err {
        HrisError::VersionConflict {
            id,
            expected,
            actual,
        } => ApiErrorResponse::with_details(
            err.code(),
            err.to_string(),
            serde_json::json!({
                "id": id,
                "expected_version": expected,
                "current_version": actual,
            }),
        ),
        _ => ApiErrorResponse::new(err.code(), err.to_string()),
    };

    (status, Json(body))
}
