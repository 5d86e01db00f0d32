//! 역할 클레임.
//!
//! 토큰의 `roles` 클레임은 문자열 하나, 문자열 목록, 또는 타입이 섞인 목록으로
//! 들어올 수 있습니다. 검사 전에 항상 문자열 집합으로 정규화합니다.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 관리자 역할.
pub const ADMIN_ROLE: &str = "admin";

/// 토큰 페이로드의 역할 클레임.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    /// `"roles": "admin"`
    One(String),
    /// `"roles": ["admin", "hr"]` 또는 `"roles": ["admin", 1, null]`
    Many(Vec<Value>),
}

impl RoleClaim {
    /// 역할 목록에서 클레임 생성.
    pub fn from_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleClaim::Many(
            roles
                .into_iter()
                .map(|r| Value::String(r.into()))
                .collect(),
        )
    }

    /// 문자열 역할 집합. 문자열이 아닌 항목은 무시됩니다.
    pub fn normalize(&self) -> BTreeSet<String> {
        match self {
            RoleClaim::One(role) => normalize_roles([role.as_str()]),
            RoleClaim::Many(values) => normalize_roles(values.iter().filter_map(Value::as_str)),
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        self.normalize().contains(role)
    }
}

/// 공백 제거, 빈 값 제거, 중복 제거.
pub fn normalize_roles<'a, I>(roles: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    roles
        .into_iter()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claim(value: Value) -> RoleClaim {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_string() {
        let roles = claim(json!("admin"));
        assert!(matches!(roles, RoleClaim::One(_)));
        assert!(roles.contains(ADMIN_ROLE));
    }

    #[test]
    fn test_string_list() {
        let roles = claim(json!(["hr", "admin"]));
        assert!(roles.contains(ADMIN_ROLE));
        assert!(roles.contains("hr"));
        assert!(!roles.contains("payroll"));
    }

    #[test]
    fn test_mixed_list_ignores_non_strings() {
        let roles = claim(json!([1, null, {"role": "admin"}, "admin"]));
        assert_eq!(roles.normalize().len(), 1);
        assert!(roles.contains(ADMIN_ROLE));

        let roles = claim(json!([true, 42]));
        assert!(roles.normalize().is_empty());
    }

    #[test]
    fn test_from_roles_round_trip() {
        let roles = RoleClaim::from_roles(vec!["admin", "admin", " hr "]);
        let set = roles.normalize();
        assert_eq!(set.len(), 2);
        assert!(set.contains("hr"));
    }
}
