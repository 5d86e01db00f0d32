//! HRIS 에러 타입.
//!
//! 저장소, 서비스, 인증 계층이 공유하는 에러 분류를 정의합니다.
//! 각 계층은 이 에러를 삼키지 않고 그대로 반환하며,
//! HTTP 경계에서만 상태 코드로 변환됩니다.

use thiserror::Error;

/// 핵심 HRIS 에러.
#[derive(Debug, Error)]
pub enum HrisError {
    /// 잘못되었거나 누락된 입력 (클라이언트 책임, 재시도 대상 아님)
    #[error("검증 실패: {0}")]
    Validation(String),

    /// 식별자에 해당하는 문서 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 동일 식별자가 이미 존재함
    #[error("중복된 식별자: {0}")]
    Conflict(String),

    /// 낙관적 잠금 버전 불일치
    #[error("버전 충돌: {id} (기대 버전 {expected}, 저장된 버전 {actual})")]
    VersionConflict {
        /// 문서 식별자
        id: String,
        /// 호출자가 제시한 버전
        expected: i64,
        /// 저장소에 기록된 버전
        actual: i64,
    },

    /// 토큰 누락, 위조, 만료 또는 서명 알고리즘 불일치
    #[error("인증 실패: {0}")]
    Unauthorized(String),

    /// 인증은 되었으나 필요한 역할이 없음
    #[error("권한 없음: {0}")]
    Forbidden(String),

    /// 저장소 연결 실패 또는 타임아웃
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// HRIS 작업을 위한 Result 타입.
pub type HrisResult<T> = Result<T, HrisError>;

impl HrisError {
    /// 요청 측 잘못으로 발생한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HrisError::Validation(_)
                | HrisError::NotFound(_)
                | HrisError::Conflict(_)
                | HrisError::VersionConflict { .. }
                | HrisError::Unauthorized(_)
                | HrisError::Forbidden(_)
        )
    }

    /// 호출자가 재시도를 고려할 수 있는 에러인지 확인합니다.
    ///
    /// 코어는 어떤 에러도 자동으로 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HrisError::Storage(_))
    }

    /// API 응답 본문에 사용하는 고정 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            HrisError::Validation(_) => "VALIDATION_ERROR",
            HrisError::NotFound(_) => "NOT_FOUND",
            HrisError::Conflict(_) => "CONFLICT",
            HrisError::VersionConflict { .. } => "VERSION_CONFLICT",
            HrisError::Unauthorized(_) => "UNAUTHORIZED",
            HrisError::Forbidden(_) => "FORBIDDEN",
            HrisError::Storage(_) => "STORAGE_ERROR",
            HrisError::Config(_) => "CONFIG_ERROR",
            HrisError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 식별자 누락 에러 생성.
    pub fn missing_field(field: &str) -> Self {
        HrisError::Validation(format!("{} 필드가 필요합니다", field))
    }
}

impl From<serde_json::Error> for HrisError {
    fn from(err: serde_json::Error) -> Self {
        HrisError::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for HrisError {
    fn from(err: config::ConfigError) -> Self {
        HrisError::Config(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for HrisError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => HrisError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                HrisError::Conflict(db_err.message().to_string())
            }
            _ => HrisError::Storage(err.to_string()),
        }
    }
}
