//! JWT 토큰 처리.
//!
//! HS256 전용 토큰 발급/검증. 헤더의 `alg`가 HS256이 아니면
//! 서명을 확인하기 전에 거부합니다.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hris_core::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::roles::RoleClaim;

/// 허용되는 유일한 서명 알고리즘.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// 역할 클레임. 문자열 또는 목록
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleClaim>,
    /// Issued At (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// * `expires_in_minutes` - 만료 시간 (분)
    pub fn new<I, S>(username: impl Into<String>, roles: I, expires_in_minutes: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        Self {
            sub: username.into(),
            roles: Some(RoleClaim::from_roles(roles)),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expires_in_minutes)).timestamp(),
        }
    }

    /// 정규화된 역할 집합.
    pub fn roles(&self) -> BTreeSet<String> {
        self.roles
            .as_ref()
            .map(RoleClaim::normalize)
            .unwrap_or_default()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .as_ref()
            .is_some_and(|claim| claim.contains(role))
    }
}

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    /// 항상 "Bearer"
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("허용되지 않는 서명 알고리즘: {0}")]
    AlgorithmMismatch(String),
    #[error("잘못된 토큰 형식")]
    InvalidToken,
}

/// 서명 키 묶음.
///
/// 비밀 값은 키 생성에만 사용되며 보관하지 않습니다.
#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<KeysInner>,
}

struct KeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl JwtKeys {
    pub fn new(secret: &SecretString, ttl_minutes: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            inner: Arc::new(KeysInner {
                encoding: EncodingKey::from_secret(bytes),
                decoding: DecodingKey::from_secret(bytes),
                ttl_minutes,
            }),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = SecretString::from(config.jwt_secret.clone());
        Self::new(&secret, config.token_ttl_minutes)
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.inner.ttl_minutes
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("secret", &"[REDACTED]")
            .field("ttl_minutes", &self.inner.ttl_minutes)
            .finish()
    }
}

/// 토큰 생성.
pub fn create_token(claims: &Claims, keys: &JwtKeys) -> Result<String, JwtError> {
    encode(&Header::new(TOKEN_ALGORITHM), claims, &keys.inner.encoding).map_err(JwtError::from)
}

/// 사용자에게 토큰 발급.
pub fn issue_token(keys: &JwtKeys, username: &str, roles: &[String]) -> Result<TokenResponse, JwtError> {
    let claims = Claims::new(username, roles.iter().cloned(), keys.ttl_minutes());
    let token = create_token(&claims, keys)?;

    Ok(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: keys.ttl_minutes() * 60,
    })
}

/// 토큰 디코딩 및 검증.
///
/// 헤더의 `alg`를 먼저 확인하고 HS256 이외의 토큰은 서명 검증 없이 거부합니다.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, JwtError> {
    let header = decode_header(token).map_err(|_| JwtError::InvalidToken)?;
    if header.alg != TOKEN_ALGORITHM {
        return Err(JwtError::AlgorithmMismatch(format!("{:?}", header.alg)));
    }

    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, &keys.inner.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidAlgorithm => JwtError::AlgorithmMismatch(format!("{:?}", header.alg)),
            _ => JwtError::InvalidToken,
        })
}
