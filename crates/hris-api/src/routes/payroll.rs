//! 급여 endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use hris_core::Document;
use serde::Serialize;
use serde_json::Value;

use super::{document_body, expected_version};
use crate::auth::JwtAuth;
use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// 직원별 급여 목록 응답.
#[derive(Debug, Serialize)]
pub struct PayrollListResponse {
    pub employee_id: String,
    pub items: Vec<Document>,
    pub total: usize,
}

/// 급여 레코드 생성. `net`이 없으면 계산됩니다.
pub async fn create_payroll(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let doc = document_body(body)?;
    let created = state.payroll.create(doc).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_payroll(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let doc = state.payroll.get(&id).await.map_err(api_error)?;
    Ok(Json(doc))
}

pub async fn update_payroll(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Document>> {
    let patch = document_body(body)?;
    let expected = expected_version(&patch)?;
    let updated = state
        .payroll
        .update(&id, patch, expected)
        .await
        .map_err(api_error)?;
    Ok(Json(updated))
}

pub async fn delete_payroll(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.payroll.delete(&id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// 직원별 급여 목록.
///
/// GET /api/v1/payroll/employee/{employee_id}
pub async fn list_payroll_for_employee(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<PayrollListResponse>> {
    let items = state
        .payroll
        .list_by_employee(&employee_id)
        .await
        .map_err(api_error)?;
    Ok(Json(PayrollListResponse {
        employee_id,
        total: items.len(),
        items,
    }))
}

/// 급여 라우터.
pub fn payroll_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_payroll))
        .route("/employee/{employee_id}", get(list_payroll_for_employee))
        .route(
            "/{id}",
            get(get_payroll).put(update_payroll).delete(delete_payroll),
        )
}
