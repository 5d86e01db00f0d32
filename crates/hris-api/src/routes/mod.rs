//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (공개)
//! - `/api/v1/auth` - 로그인, 토큰 주체 조회
//! - `/api/v1/users` - 사용자 생성 (admin)
//! - `/api/v1/admin` - 관리자 확인 (admin)
//! - `/api/v1/employees` - 직원 CRUD 및 목록 조회
//! - `/api/v1/payroll` - 급여 CRUD

pub mod auth;
pub mod employees;
pub mod health;
pub mod payroll;

pub use auth::{admin_router, auth_router, users_router, CreateUserRequest, LoginRequest, MeResponse, UserResponse};
pub use employees::employees_router;
pub use health::{health_router, ComponentStatus, HealthResponse};
pub use payroll::{payroll_router, PayrollListResponse};

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router};
use hris_core::document::integral_value;
use hris_core::{Document, HrisError, VERSION_FIELD};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/users", users_router())
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1/employees", employees_router())
        .nest("/api/v1/payroll", payroll_router())
}

/// JSON 본문 추출 실패(필드 누락, 타입 불일치 등)를 400 `VALIDATION_ERROR`로 변환합니다.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| api_error(HrisError::Validation(rejection.body_text())))
}

/// 요청 본문을 문서로 변환합니다. JSON 객체가 아니면 400.
pub(crate) fn document_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Document> {
    Document::from_value(json_body(body)?).map_err(api_error)
}

/// 본문의 `version` 필드를 기대 버전으로 읽습니다.
pub(crate) fn expected_version(doc: &Document) -> ApiResult<Option<i64>> {
    match doc.get(VERSION_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integral_value(value).map(Some).ok_or_else(|| {
            api_error(HrisError::Validation(
                "version 필드는 정수여야 합니다".to_string(),
            ))
        }),
    }
}
