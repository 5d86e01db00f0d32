//! HRIS 백엔드 핵심 라이브러리.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 반정형 직원/급여 문서 모델
//! - 에러 분류
//! - 목록 필터/정렬/페이지네이션
//! - 직원 필드 검증과 급여 계산
//! - 설정 및 로깅

pub mod config;
pub mod document;
pub mod error;
pub mod legacy;
pub mod logging;
pub mod payroll;
pub mod query;
pub mod validation;

pub use config::{AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, StorageBackend};
pub use document::{CollectionSpec, Document, EMPLOYEES, PAYROLL, VERSION_FIELD};
pub use error::{HrisError, HrisResult};
pub use query::{ListQuery, Page, SortKey};
