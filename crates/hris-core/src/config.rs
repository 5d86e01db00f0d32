//! 설정 관리.
//!
//! 기본값 → `config/default.toml` (선택) → `HRIS__` 접두사 환경 변수 순으로 병합하며,
//! 배포 환경에서 쓰던 단축 변수(`DATABASE_URL`, `HRIS_JWT_SECRET` 등)가 최종 우선합니다.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HrisError, HrisResult};

/// 개발용 기본 JWT 서명 키.
pub const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret";
/// 개발용 기본 관리자 비밀번호.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 연결 문자열. 없으면 메모리 저장소를 사용합니다.
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 개별 저장소 호출 타임아웃 (초)
    pub operation_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connect_timeout_secs: 5,
            operation_timeout_secs: 5,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 연결 문자열에 비밀번호가 포함될 수 있음
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// 사용할 저장소 백엔드.
    pub fn backend(&self) -> StorageBackend {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => StorageBackend::Postgres,
            _ => StorageBackend::InMemory,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// 저장소 백엔드 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// 프로세스 수명 동안만 유지되는 메모리 저장소
    InMemory,
    /// PostgreSQL JSONB 문서 저장소
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증 설정.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 서명 키
    pub jwt_secret: String,
    /// 토큰 유효 시간 (분)
    pub token_ttl_minutes: i64,
    /// 시작 시 생성되는 관리자 계정
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_minutes: 60,
            admin_username: "admin".to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .finish()
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아닙니다.
    pub fn load<P: AsRef<Path>>(path: P) -> HrisResult<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(path, env)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> HrisResult<Self> {
        Self::load("config/default.toml")
    }

    /// 주어진 환경 변수 스냅샷으로 설정을 로드합니다.
    pub fn load_with_env<P: AsRef<Path>>(
        path: P,
        env: HashMap<String, String>,
    ) -> HrisResult<Self> {
        let defaults = AppConfig::default();
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", defaults.server.host.clone())?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default(
                "database.connect_timeout_secs",
                defaults.database.connect_timeout_secs as i64,
            )?
            .set_default(
                "database.operation_timeout_secs",
                defaults.database.operation_timeout_secs as i64,
            )?
            .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())?
            .set_default("auth.token_ttl_minutes", defaults.auth.token_ttl_minutes)?
            .set_default("auth.admin_username", defaults.auth.admin_username.clone())?
            .set_default("auth.admin_password", defaults.auth.admin_password.clone())?
            .set_default("logging.level", defaults.logging.level.clone())?
            .set_default("logging.format", defaults.logging.format.clone())?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("HRIS")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            // 단축 환경 변수
            .set_override_option("database.url", non_empty(&env, "DATABASE_URL"))?
            .set_override_option("auth.jwt_secret", non_empty(&env, "HRIS_JWT_SECRET"))?
            .set_override_option("auth.admin_username", non_empty(&env, "HRIS_ADMIN_USER"))?
            .set_override_option(
                "auth.admin_password",
                non_empty(&env, "HRIS_ADMIN_PASSWORD"),
            )?
            .set_override_option("server.host", non_empty(&env, "API_HOST"))?
            .set_override_option("server.port", non_empty(&env, "API_PORT"))?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증.
    pub fn validate(&self) -> HrisResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(HrisError::Config("auth.jwt_secret은 비어 있을 수 없습니다".into()));
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(HrisError::Config(
                "auth.token_ttl_minutes는 0보다 커야 합니다".into(),
            ));
        }
        if self.auth.admin_username.is_empty() {
            return Err(HrisError::Config(
                "auth.admin_username은 비어 있을 수 없습니다".into(),
            ));
        }
        if self.database.operation_timeout_secs == 0 {
            return Err(HrisError::Config(
                "database.operation_timeout_secs는 0보다 커야 합니다".into(),
            ));
        }
        Ok(())
    }
}

fn non_empty(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_with_env("does/not/exist.toml", env(&[])).unwrap();

        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.backend(), StorageBackend::InMemory);
        assert_eq!(config.database.operation_timeout(), Duration::from_secs(5));
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.auth.admin_username, "admin");
        assert!(config.auth.uses_default_secret());
        assert!(config.auth.uses_default_admin_password());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_deployment_variables_override() {
        let config = AppConfig::load_with_env(
            "does/not/exist.toml",
            env(&[
                ("DATABASE_URL", "postgres://hris@localhost/hris"),
                ("HRIS_JWT_SECRET", "s3cret"),
                ("HRIS_ADMIN_USER", "root"),
                ("API_PORT", "9090"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database.backend(), StorageBackend::Postgres);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.admin_username, "root");
        assert_eq!(config.server.port, 9090);
        assert!(!config.auth.uses_default_secret());
    }

    #[test]
    fn test_prefixed_environment() {
        let config = AppConfig::load_with_env(
            "does/not/exist.toml",
            env(&[
                ("HRIS__AUTH__TOKEN_TTL_MINUTES", "15"),
                ("HRIS__LOGGING__FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.auth.token_ttl_minutes, 15);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_database_url_means_memory() {
        let config =
            AppConfig::load_with_env("does/not/exist.toml", env(&[("DATABASE_URL", "  ")]))
                .unwrap();
        assert_eq!(config.database.backend(), StorageBackend::InMemory);
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        let result = AppConfig::load_with_env(
            "does/not/exist.toml",
            env(&[("HRIS__AUTH__TOKEN_TTL_MINUTES", "0")]),
        );
        assert!(matches!(result, Err(HrisError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.database.url = Some("postgres://u:pw@db/hris".into());
        let text = format!("{:?}", config);
        assert!(!text.contains("dev-jwt-secret"));
        assert!(!text.contains("pw@db"));
    }
}
