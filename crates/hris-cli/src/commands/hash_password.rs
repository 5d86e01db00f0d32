//! 시드용 비밀번호 해시 출력.

use anyhow::bail;

/// Argon2id PHC 문자열 생성.
pub fn run(password: &str) -> anyhow::Result<String> {
    if password.is_empty() {
        bail!("비밀번호가 비어 있습니다");
    }
    Ok(hris_api::hash_password(password)?)
}
