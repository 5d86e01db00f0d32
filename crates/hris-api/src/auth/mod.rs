//! 인증 및 권한 부여.
//!
//! # 구성 요소
//!
//! - [`Claims`]: JWT 페이로드 (역할 클레임은 문자열 또는 목록)
//! - [`JwtKeys`]: HS256 서명 키
//! - [`JwtAuth`], [`AdminAuth`]: Axum 추출기
//! - [`CredentialStore`]: 사용자/비밀번호 해시 저장소
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     JwtAuth(claims): JwtAuth,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.sub)
//! }
//! ```

mod jwt;
mod middleware;
mod password;
mod roles;
mod store;

pub use jwt::{create_token, decode_token, issue_token, Claims, JwtError, JwtKeys, TokenResponse, TOKEN_ALGORITHM};
pub use middleware::{require_role, AdminAuth, JwtAuth, JwtAuthError};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::{normalize_roles, RoleClaim, ADMIN_ROLE};
pub use store::{CredentialCheck, CredentialRecord, CredentialStore, InMemoryCredentialStore, PgCredentialStore};
