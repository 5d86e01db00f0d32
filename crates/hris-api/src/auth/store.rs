//! 자격 증명 저장소.
//!
//! 사용자 이름, Argon2 해시, 역할 목록을 보관합니다.
//! 백엔드는 문서 저장소와 같은 선택을 따릅니다.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use hris_core::{HrisError, HrisResult};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::password::{hash_password, verify_dummy, verify_password, PasswordError};
use super::roles::normalize_roles;
use crate::repository::{with_timeout, Database};

/// 저장된 사용자 레코드.
#[derive(Clone)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("roles", &self.roles)
            .finish()
    }
}

/// 자격 증명 검사 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialCheck {
    pub valid: bool,
    pub roles: Vec<String>,
}

impl CredentialCheck {
    fn invalid() -> Self {
        Self::default()
    }
}

/// 자격 증명 저장소 trait.
///
/// 백엔드는 `upsert`/`fetch`만 구현하고, 해싱과 검증은 기본 메서드가 담당합니다.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 레코드 저장. 같은 사용자 이름이 있으면 덮어씁니다.
    async fn upsert(&self, record: CredentialRecord) -> HrisResult<()>;

    async fn fetch(&self, username: &str) -> HrisResult<Option<CredentialRecord>>;

    /// 평문 비밀번호로 사용자 생성 (또는 교체).
    async fn create_user(&self, username: &str, password: &str, roles: &[String]) -> HrisResult<()> {
        if password.is_empty() {
            return Err(HrisError::Validation("비밀번호가 비어 있습니다".to_string()));
        }
        let username = require_username(username)?;
        let owned = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&owned))
            .await
            .map_err(|e| HrisError::Internal(format!("해싱 작업 실패: {}", e)))?
            .map_err(|e| HrisError::Internal(e.to_string()))?;

        self.create_user_with_hash(username, &hash, roles).await
    }

    /// 미리 계산된 해시로 사용자 생성 (또는 교체).
    async fn create_user_with_hash(&self, username: &str, password_hash: &str, roles: &[String]) -> HrisResult<()> {
        let username = require_username(username)?;
        if password_hash.is_empty() {
            return Err(HrisError::Validation("비밀번호 해시가 비어 있습니다".to_string()));
        }
        let roles: Vec<String> = normalize_roles(roles.iter().map(String::as_str))
            .into_iter()
            .collect();

        self.upsert(CredentialRecord {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            roles: roles.clone(),
        })
        .await?;
        info!(username, ?roles, "User stored");
        Ok(())
    }

    /// 자격 증명 검사.
    ///
    /// 사용자가 없거나 저장된 해시가 손상된 경우 모두 `valid = false`입니다.
    async fn validate_credentials(&self, username: &str, password: &str) -> HrisResult<CredentialCheck> {
        let record = self.fetch(username.trim()).await?;
        let password = password.to_string();

        let outcome = tokio::task::spawn_blocking(move || match record {
            None => {
                verify_dummy(&password);
                None
            }
            Some(record) => match verify_password(&password, &record.password_hash) {
                Ok(()) => Some(Ok(record.roles)),
                Err(e) => Some(Err(e)),
            },
        })
        .await
        .map_err(|e| HrisError::Internal(format!("검증 작업 실패: {}", e)))?;

        match outcome {
            Some(Ok(roles)) => Ok(CredentialCheck { valid: true, roles }),
            Some(Err(PasswordError::InvalidHashFormat)) => {
                debug!(username, "Stored password hash is malformed");
                Ok(CredentialCheck::invalid())
            }
            Some(Err(_)) | None => Ok(CredentialCheck::invalid()),
        }
    }
}

fn require_username(username: &str) -> HrisResult<&str> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(HrisError::Validation("사용자 이름이 비어 있습니다".to_string()));
    }
    Ok(trimmed)
}

/// 메모리 기반 자격 증명 저장소.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn upsert(&self, record: CredentialRecord) -> HrisResult<()> {
        self.users
            .lock()
            .await
            .insert(record.username.clone(), record);
        Ok(())
    }

    async fn fetch(&self, username: &str) -> HrisResult<Option<CredentialRecord>> {
        Ok(self.users.lock().await.get(username).cloned())
    }
}

/// PostgreSQL 자격 증명 저장소 (`hris_users` 테이블).
#[derive(Clone)]
pub struct PgCredentialStore {
    db: Database,
}

impl PgCredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
    roles: Vec<String>,
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn upsert(&self, record: CredentialRecord) -> HrisResult<()> {
        with_timeout(
            self.db.operation_timeout(),
            "credentials.upsert",
            sqlx::query(
                r#"
                INSERT INTO hris_users (username, password_hash, roles)
                VALUES ($1, $2, $3)
                ON CONFLICT (username) DO UPDATE
                SET password_hash = EXCLUDED.password_hash,
                    roles = EXCLUDED.roles,
                    updated_at = NOW()
                "#,
            )
            .bind(&record.username)
            .bind(&record.password_hash)
            .bind(&record.roles)
            .execute(self.db.pool()),
        )
        .await?;
        Ok(())
    }

    async fn fetch(&self, username: &str) -> HrisResult<Option<CredentialRecord>> {
        let row: Option<UserRow> = with_timeout(
            self.db.operation_timeout(),
            "credentials.fetch",
            sqlx::query_as(
                "SELECT username, password_hash, roles FROM hris_users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(self.db.pool()),
        )
        .await?;

        Ok(row.map(|r| CredentialRecord {
            username: r.username,
            password_hash: r.password_hash,
            roles: r.roles,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// 항상 연결 실패를 반환하는 저장소.
    struct UnavailableStore;

    #[async_trait]
    impl CredentialStore for UnavailableStore {
        async fn upsert(&self, _record: CredentialRecord) -> HrisResult<()> {
            Err(HrisError::Storage("connection refused".to_string()))
        }

        async fn fetch(&self, _username: &str) -> HrisResult<Option<CredentialRecord>> {
            Err(HrisError::Storage("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_invalid_credentials() {
        let store = UnavailableStore;

        let err = store.validate_credentials("admin", "password").await.unwrap_err();
        assert!(matches!(err, HrisError::Storage(_)));

        let err = store
            .create_user("alice", "s3cret", &roles(&["hr"]))
            .await
            .unwrap_err();
        assert!(matches!(err, HrisError::Storage(_)));
    }

    #[tokio::test]
    async fn test_create_and_validate() {
        let store = InMemoryCredentialStore::new();
        store
            .create_user("alice", "s3cret", &roles(&["admin", "hr", "admin"]))
            .await
            .unwrap();

        let check = store.validate_credentials("alice", "s3cret").await.unwrap();
        assert!(check.valid);
        assert_eq!(check.roles, roles(&["admin", "hr"]));

        let check = store.validate_credentials("alice", "wrong").await.unwrap();
        assert_eq!(check, CredentialCheck::invalid());
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid() {
        let store = InMemoryCredentialStore::new();
        let check = store.validate_credentials("ghost", "x").await.unwrap();
        assert!(!check.valid);
        assert!(check.roles.is_empty());
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let store = InMemoryCredentialStore::new();
        assert!(matches!(
            store.create_user("", "pw", &[]).await,
            Err(HrisError::Validation(_))
        ));
        assert!(matches!(
            store.create_user("   ", "pw", &[]).await,
            Err(HrisError::Validation(_))
        ));
        assert!(matches!(
            store.create_user("bob", "", &[]).await,
            Err(HrisError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_replaces_existing_user() {
        let store = InMemoryCredentialStore::new();
        store.create_user("bob", "first", &roles(&["hr"])).await.unwrap();
        store.create_user("bob", "second", &[]).await.unwrap();

        assert!(!store.validate_credentials("bob", "first").await.unwrap().valid);
        let check = store.validate_credentials("bob", "second").await.unwrap();
        assert!(check.valid);
        assert!(check.roles.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_invalid() {
        let store = InMemoryCredentialStore::new();
        store
            .create_user_with_hash("carol", "not-a-phc-string", &roles(&["admin"]))
            .await
            .unwrap();

        let check = store.validate_credentials("carol", "anything").await.unwrap();
        assert!(!check.valid);
    }

    #[tokio::test]
    async fn test_create_with_precomputed_hash() {
        let store = InMemoryCredentialStore::new();
        let hash = hash_password("pw").unwrap();
        store
            .create_user_with_hash("dave", &hash, &roles(&["payroll"]))
            .await
            .unwrap();

        let check = store.validate_credentials("dave", "pw").await.unwrap();
        assert!(check.valid);
        assert_eq!(check.roles, roles(&["payroll"]));
    }

    #[test]
    fn test_record_debug_redacts_hash() {
        let record = CredentialRecord {
            username: "eve".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            roles: vec![],
        };
        assert!(!format!("{:?}", record).contains("argon2id"));
    }
}
