//! 직원 endpoint.
//!
//! 모든 요청에 유효한 토큰이 필요합니다. 목록 조회는 `page`, `per_page`, `sort`를
//! 예약 키로 사용하고 나머지 쿼리 파라미터는 정확히 일치하는 필터입니다.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hris_core::{Document, ListQuery, Page};
use serde_json::Value;
use tracing::debug;

use super::{document_body, expected_version};
use crate::auth::JwtAuth;
use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 직원 목록.
///
/// GET /api/v1/employees?department=hr&sort=-hire_date&page=2&per_page=10
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Document>>> {
    let query = ListQuery::from_query_params(params);
    debug!(user = %claims.sub, filters = query.filters.len(), "Listing employees");
    let page = state.employees.list(&query).await.map_err(api_error)?;
    Ok(Json(page))
}

/// 직원 생성.
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let doc = document_body(body)?;
    let created = state.employees.create(doc).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 직원 조회.
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let doc = state.employees.get(&id).await.map_err(api_error)?;
    Ok(Json(doc))
}

/// 직원 수정. 본문의 `version`이 기대 버전입니다.
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Document>> {
    let patch = document_body(body)?;
    let expected = expected_version(&patch)?;
    let updated = state
        .employees
        .update(&id, patch, expected)
        .await
        .map_err(api_error)?;
    Ok(Json(updated))
}

/// 직원 삭제.
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.employees.delete(&id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// 직원 라우터.
pub fn employees_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route(
            "/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}
