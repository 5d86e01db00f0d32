//! API 통합 테스트 공용 도구.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use hris_api::auth::JwtKeys;
use hris_api::routes::create_api_router;
use hris_api::state::AppState;
use secrecy::SecretString;
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const CLERK_USER: &str = "clerk";
pub const CLERK_PASSWORD: &str = "clerk-pass";

/// 관리자와 일반 사용자가 생성된 메모리 백엔드 앱.
pub async fn test_app() -> (Router, Arc<AppState>) {
    let keys = JwtKeys::new(&SecretString::from(SECRET.to_string()), 60);
    let state = AppState::in_memory(keys);
    state.seed_admin(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    state
        .credentials
        .create_user(CLERK_USER, CLERK_PASSWORD, &["hr".to_string()])
        .await
        .unwrap();

    let state = Arc::new(state);
    let app = create_api_router().with_state(state.clone());
    (app, state)
}

/// 요청을 보내고 상태 코드와 JSON 본문을 반환합니다. 본문이 없으면 `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// 로그인 후 토큰 반환.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// 임의의 헤더로 HMAC-SHA256 서명한 토큰.
pub fn forge_hmac(header: Value, payload: Value, secret: &str) -> String {
    let h = URL_SAFE_NO_PAD.encode(header.to_string());
    let p = URL_SAFE_NO_PAD.encode(payload.to_string());
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.{}", h, p).as_bytes());
    let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{}.{}.{}", h, p, sig)
}

/// 만료 10분 전인 페이로드.
pub fn fresh_payload(sub: &str, roles: Value) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({"sub": sub, "roles": roles, "iat": now, "exp": now + 600})
}
