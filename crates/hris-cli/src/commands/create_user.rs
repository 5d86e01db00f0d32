//! 사용자 생성 (또는 교체).

use hris_api::auth::{normalize_roles, CredentialStore, PgCredentialStore};
use hris_core::AppConfig;
use tracing::info;

/// 쉼표로 구분된 역할 목록을 정규화합니다.
pub fn parse_roles(raw: &str) -> Vec<String> {
    normalize_roles(raw.split(',')).into_iter().collect()
}

/// `hris create-user` 실행. 저장된 역할 목록을 반환합니다.
pub async fn run(config: &AppConfig, username: &str, password: &str, roles: &str) -> anyhow::Result<Vec<String>> {
    let db = super::connect(config).await?;
    let store = PgCredentialStore::new(db);
    let roles = parse_roles(roles);

    store.create_user(username, password, &roles).await?;
    info!(username, ?roles, "User stored");
    Ok(roles)
}
