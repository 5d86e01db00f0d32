//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 저장소 백엔드는 시작 시 한 번 결정되어 각 컴포넌트에 주입됩니다.

use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use hris_core::{AppConfig, HrisError, HrisResult, StorageBackend, EMPLOYEES, PAYROLL};
use tracing::info;

use crate::auth::{hash_password, CredentialStore, InMemoryCredentialStore, JwtKeys, PgCredentialStore, ADMIN_ROLE};
use crate::repository::{Database, InMemoryDocumentRepository, PgDocumentRepository};
use crate::services::{EmployeeService, PayrollService};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 직원 서비스
    pub employees: EmployeeService,

    /// 급여 서비스
    pub payroll: PayrollService,

    /// 자격 증명 저장소
    pub credentials: Arc<dyn CredentialStore>,

    /// JWT 서명 키
    pub jwt: JwtKeys,

    /// 선택된 저장소 백엔드
    pub backend: StorageBackend,

    /// 데이터베이스 연결 (PostgreSQL 백엔드일 때만)
    pub db: Option<Database>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 메모리 백엔드 상태.
    pub fn in_memory(jwt: JwtKeys) -> Self {
        Self {
            employees: EmployeeService::new(Arc::new(InMemoryDocumentRepository::new(EMPLOYEES))),
            payroll: PayrollService::new(Arc::new(InMemoryDocumentRepository::new(PAYROLL))),
            credentials: Arc::new(InMemoryCredentialStore::new()),
            jwt,
            backend: StorageBackend::InMemory,
            db: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// PostgreSQL 백엔드 상태.
    pub fn postgres(db: Database, jwt: JwtKeys) -> Self {
        Self {
            employees: EmployeeService::new(Arc::new(PgDocumentRepository::new(db.clone(), EMPLOYEES))),
            payroll: PayrollService::new(Arc::new(PgDocumentRepository::new(db.clone(), PAYROLL))),
            credentials: Arc::new(PgCredentialStore::new(db.clone())),
            jwt,
            backend: StorageBackend::Postgres,
            db: Some(db),
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 설정에서 상태를 구성하고 관리자 계정을 생성합니다.
    ///
    /// 데이터베이스가 설정되었지만 연결할 수 없으면 에러를 반환합니다.
    pub async fn bootstrap(config: &AppConfig) -> HrisResult<Self> {
        let jwt = JwtKeys::from_config(&config.auth);
        let backend = config.database.backend();

        let state = match backend {
            StorageBackend::InMemory => {
                info!("DATABASE_URL not set, using in-memory storage");
                Self::in_memory(jwt)
            }
            StorageBackend::Postgres => {
                let db = Database::connect(&config.database).await?;
                db.migrate().await?;
                Self::postgres(db, jwt)
            }
        };

        state
            .seed_admin(&config.auth.admin_username, &config.auth.admin_password)
            .await?;
        info!(backend = %state.backend, "Application state initialized");
        Ok(state)
    }

    /// 관리자 계정 생성 (또는 교체).
    pub async fn seed_admin(&self, username: &str, password: &str) -> HrisResult<()> {
        let owned = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&owned))
            .await
            .map_err(|e| HrisError::Internal(format!("해싱 작업 실패: {}", e)))?
            .map_err(|e| HrisError::Internal(e.to_string()))?;

        self.credentials
            .create_user_with_hash(username, &hash, &[ADMIN_ROLE.to_string()])
            .await?;
        info!(username, "Administrator seeded");
        Ok(())
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db {
            Some(db) => db.health_check().await.is_ok(),
            None => false,
        }
    }
}

impl FromRef<Arc<AppState>> for JwtKeys {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.jwt.clone()
    }
}

/// 테스트용 AppState 생성 (메모리 백엔드, 관리자 미생성).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use secrecy::SecretString;

    let secret = SecretString::from("test-jwt-secret-for-hris".to_string());
    AppState::in_memory(JwtKeys::new(&secret, 60))
}
