//! CLI 명령어 구현 모듈.

pub mod create_user;
pub mod hash_password;
pub mod health;
pub mod migrate;

use anyhow::{bail, Context};
use hris_api::Database;
use hris_core::{AppConfig, StorageBackend};

/// PostgreSQL 연결이 필요한 명령에서 사용합니다.
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    if config.database.backend() == StorageBackend::InMemory {
        bail!("DATABASE_URL이 설정되지 않았습니다 (메모리 저장소에는 영구 데이터가 없습니다)");
    }
    Database::connect(&config.database)
        .await
        .context("데이터베이스 연결 실패")
}
