//! 반정형 문서 모델.
//!
//! 직원/급여 레코드는 스키마가 고정되지 않은 필드 맵으로 저장됩니다.
//! [`Document`]는 `serde_json::Value` 기반 맵을 감싸며,
//! 식별자/버전 접근, 얕은 병합, 점 경로(dot-path) 조회를 제공합니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HrisError, HrisResult};

/// 낙관적 잠금에 사용되는 버전 필드명.
pub const VERSION_FIELD: &str = "version";

/// 컬렉션 메타데이터.
///
/// 문서 저장소는 이 정보로 식별자 필드와 레거시 식별자 철자를 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// 컬렉션 이름 (저장소 키)
    pub name: &'static str,
    /// 정식 식별자 필드
    pub id_field: &'static str,
    /// 과거 데이터에서 사용된 식별자 필드 철자
    pub legacy_id_fields: &'static [&'static str],
    /// 서버 생성 식별자 접두사
    pub id_prefix: &'static str,
}

/// 직원 컬렉션.
pub const EMPLOYEES: CollectionSpec = CollectionSpec {
    name: "employees",
    id_field: "employee_id",
    legacy_id_fields: &["employeeid"],
    id_prefix: "emp",
};

/// 급여 컬렉션.
pub const PAYROLL: CollectionSpec = CollectionSpec {
    name: "payroll",
    id_field: "id",
    legacy_id_fields: &[],
    id_prefix: "pay",
};

impl CollectionSpec {
    /// 서버 측 식별자 생성 (`emp-<uuid>`, `pay-<uuid>`).
    pub fn generate_id(&self) -> String {
        format!("{}-{}", self.id_prefix, uuid::Uuid::new_v4().simple())
    }

    /// 문서가 주어진 식별자를 정식 또는 레거시 필드로 가지는지 확인.
    pub fn matches_id(&self, doc: &Document, id: &str) -> bool {
        if doc.get_str(self.id_field) == Some(id) {
            return true;
        }
        self.legacy_id_fields
            .iter()
            .any(|field| doc.get_str(field) == Some(id))
    }

    /// 문서의 식별자를 반환 (정식 필드 우선, 없으면 레거시 필드).
    pub fn document_id<'a>(&self, doc: &'a Document) -> Option<&'a str> {
        doc.get_str(self.id_field).or_else(|| {
            self.legacy_id_fields
                .iter()
                .find_map(|field| doc.get_str(field))
        })
    }

    /// 생성 시 필요한 식별자를 추출합니다.
    ///
    /// 식별자가 없거나 빈 문자열이거나 문자열이 아니면 `Validation` 에러.
    pub fn require_id(&self, doc: &Document) -> HrisResult<String> {
        match doc.get(self.id_field) {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                Err(HrisError::missing_field(self.id_field))
            }
            Some(other) => Err(HrisError::Validation(format!(
                "{} 필드는 문자열이어야 합니다: {}",
                self.id_field, other
            ))),
        }
    }
}

/// 필드명 → 값 매핑으로 표현되는 문서.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// 빈 문서 생성.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// JSON 값을 문서로 변환합니다. 객체가 아니면 `Validation` 에러.
    pub fn from_value(value: Value) -> HrisResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(HrisError::Validation(format!(
                "문서는 JSON 객체여야 합니다: {}",
                json_type_name(&other)
            ))),
        }
    }

    /// 내부 맵 참조.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// 내부 맵으로 변환.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// JSON 값으로 변환.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// 문자열 필드 조회.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 점 경로로 중첩 필드를 조회합니다 (예: `legal_name.first`).
    ///
    /// 경로 중간이 객체가 아니거나 키가 없으면 `None`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// 필터/정렬 비교에 사용하는 문자열 표현.
    ///
    /// 필드가 없으면 빈 문자열을 반환합니다.
    pub fn display_value(&self, path: &str) -> String {
        self.get_path(path).map(display_string).unwrap_or_default()
    }

    /// 저장된 버전. 정수로 표현 가능한 숫자만 인정합니다 (`3`, `3.0`).
    pub fn version(&self) -> Option<i64> {
        self.0.get(VERSION_FIELD).and_then(integral_value)
    }

    pub fn set_version(&mut self, version: i64) {
        self.0.insert(VERSION_FIELD.to_string(), Value::from(version));
    }

    /// 얕은 병합: 패치의 필드가 기존 값을 덮어쓰고 나머지 필드는 유지됩니다.
    pub fn merge(&mut self, patch: Document) {
        for (key, value) in patch.0 {
            self.0.insert(key, value);
        }
    }

    /// 필드 이름 목록.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = HrisError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

/// 값의 문자열 표현.
///
/// 문자열은 그대로, 숫자/불리언은 JSON 표기, null은 빈 문자열,
/// 배열/객체는 압축 JSON 텍스트로 변환합니다.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// 정수로 표현 가능한 JSON 숫자를 `i64`로 변환.
pub fn integral_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_get_path_nested() {
        let d = doc(json!({
            "employee_id": "emp-1",
            "legal_name": {"first": "Ada", "last": "Lovelace"}
        }));

        assert_eq!(d.get_path("legal_name.first"), Some(&json!("Ada")));
        assert_eq!(d.get_path("legal_name.middle"), None);
        assert_eq!(d.get_path("employee_id.first"), None);
        assert_eq!(d.get_path(""), None);
    }

    #[test]
    fn test_display_value() {
        let d = doc(json!({
            "name": "Bob",
            "age": 42,
            "active": true,
            "manager": null,
            "tags": ["a", "b"]
        }));

        assert_eq!(d.display_value("name"), "Bob");
        assert_eq!(d.display_value("age"), "42");
        assert_eq!(d.display_value("active"), "true");
        assert_eq!(d.display_value("manager"), "");
        assert_eq!(d.display_value("missing"), "");
        assert_eq!(d.display_value("tags"), r#"["a","b"]"#);
    }

    #[test]
    fn test_version_accepts_integral_float() {
        assert_eq!(doc(json!({"version": 3})).version(), Some(3));
        assert_eq!(doc(json!({"version": 3.0})).version(), Some(3));
        assert_eq!(doc(json!({"version": 3.5})).version(), None);
        assert_eq!(doc(json!({"version": "3"})).version(), None);
        assert_eq!(doc(json!({})).version(), None);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut current = doc(json!({
            "employee_id": "emp-1",
            "legal_name": {"first": "Bob", "last": "Smith"},
            "email": "bob@example.com"
        }));
        let patch = doc(json!({
            "legal_name": {"first": "Robert"},
            "preferred_name": "Bobby"
        }));

        current.merge(patch);

        assert_eq!(current.get("legal_name"), Some(&json!({"first": "Robert"})));
        assert_eq!(current.get_str("preferred_name"), Some("Bobby"));
        assert_eq!(current.get_str("email"), Some("bob@example.com"));
    }

    #[test]
    fn test_require_id() {
        assert_eq!(
            EMPLOYEES.require_id(&doc(json!({"employee_id": "e1"}))).unwrap(),
            "e1"
        );
        assert!(EMPLOYEES.require_id(&doc(json!({}))).is_err());
        assert!(EMPLOYEES.require_id(&doc(json!({"employee_id": ""}))).is_err());
        assert!(EMPLOYEES.require_id(&doc(json!({"employee_id": 7}))).is_err());
        assert!(PAYROLL.require_id(&doc(json!({"employee_id": "e1"}))).is_err());
    }

    #[test]
    fn test_matches_legacy_id() {
        let legacy = doc(json!({"employeeid": "old-1"}));
        assert!(EMPLOYEES.matches_id(&legacy, "old-1"));
        assert_eq!(EMPLOYEES.document_id(&legacy), Some("old-1"));

        // 급여 컬렉션에는 레거시 철자가 없음
        let payroll = doc(json!({"employeeid": "old-1"}));
        assert!(!PAYROLL.matches_id(&payroll, "old-1"));
    }

    #[test]
    fn test_generate_id_prefix() {
        let id = EMPLOYEES.generate_id();
        assert!(id.starts_with("emp-"));
        assert_ne!(id, EMPLOYEES.generate_id());
        assert!(PAYROLL.generate_id().starts_with("pay-"));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(Document::from_value(json!([1, 2])).is_err());
        assert!(Document::from_value(json!("x")).is_err());
    }
}
