//! HRIS REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 직원/급여 문서 저장소 (메모리, PostgreSQL JSONB)
//! - 직원/급여 서비스
//! - 자격 증명 저장소와 JWT 인증
//! - Axum 기반 REST API
//!
//! # 모듈 구성
//!
//! - [`repository`]: 낙관적 잠금 문서 저장소
//! - [`services`]: 검증, 목록 조회, 급여 계산
//! - [`auth`]: JWT 인증, 역할 검사, 자격 증명 저장소
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{hash_password, verify_password, AdminAuth, Claims, CredentialStore, JwtAuth, JwtAuthError, JwtKeys};
pub use error::{ApiErrorResponse, ApiResult};
pub use repository::{Database, DocumentRepository, SharedRepository};
pub use routes::create_api_router;
pub use services::{EmployeeService, PayrollService};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
