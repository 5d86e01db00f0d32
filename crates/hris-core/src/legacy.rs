//! 레거시 필드명 정규화.
//!
//! 초기 데이터는 `employeeid`, `legalname`처럼 밑줄 없는 필드명을 사용했습니다.

use crate::document::{CollectionSpec, Document};

/// (레거시 필드, 정식 필드) 쌍.
pub const LEGACY_FIELD_NAMES: [(&str, &str); 4] = [
    ("employeeid", "employee_id"),
    ("legalname", "legal_name"),
    ("hiredate", "hire_date"),
    ("preferredname", "preferred_name"),
];

/// 레거시 필드를 정식 이름으로 옮깁니다.
///
/// 정식 필드가 이미 있으면 값은 유지하고 레거시 키만 제거합니다.
/// 문서가 변경되었으면 `true`.
pub fn normalize_legacy_fields(doc: &mut Document) -> bool {
    let mut changed = false;
    for (legacy, canonical) in LEGACY_FIELD_NAMES {
        if let Some(value) = doc.remove(legacy) {
            if !doc.contains(canonical) {
                doc.insert(canonical, value);
            }
            changed = true;
        }
    }
    changed
}

/// 정식 식별자가 없으면 채웁니다. 채웠으면 `true`.
pub fn ensure_canonical_id(doc: &mut Document, spec: &CollectionSpec) -> bool {
    let has_id = doc
        .get_str(spec.id_field)
        .map_or(false, |id| !id.is_empty());
    if has_id {
        return false;
    }
    let id = spec
        .document_id(doc)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| spec.generate_id());
    doc.insert(spec.id_field, id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EMPLOYEES;
    use serde_json::json;

    #[test]
    fn test_normalize_renames_fields() {
        let mut doc = Document::from_value(json!({
            "employeeid": "old-7",
            "legalname": {"first": "Ada"},
            "hiredate": "2001-01-01",
            "email": "ada@example.com"
        }))
        .unwrap();

        assert!(normalize_legacy_fields(&mut doc));
        assert_eq!(doc.get_str("employee_id"), Some("old-7"));
        assert_eq!(doc.get("legal_name"), Some(&json!({"first": "Ada"})));
        assert_eq!(doc.get_str("hire_date"), Some("2001-01-01"));
        assert!(!doc.contains("employeeid"));
        assert!(!doc.contains("hiredate"));
    }

    #[test]
    fn test_normalize_keeps_canonical_value() {
        let mut doc = Document::from_value(json!({
            "employee_id": "new-1",
            "employeeid": "old-1"
        }))
        .unwrap();

        assert!(normalize_legacy_fields(&mut doc));
        assert_eq!(doc.get_str("employee_id"), Some("new-1"));
        assert!(!doc.contains("employeeid"));
    }

    #[test]
    fn test_normalize_noop() {
        let mut doc = Document::from_value(json!({"employee_id": "e1"})).unwrap();
        assert!(!normalize_legacy_fields(&mut doc));
    }

    #[test]
    fn test_ensure_canonical_id() {
        let mut doc = Document::from_value(json!({"employeeid": "old-2"})).unwrap();
        assert!(ensure_canonical_id(&mut doc, &EMPLOYEES));
        assert_eq!(doc.get_str("employee_id"), Some("old-2"));

        let mut doc = Document::from_value(json!({"name": "x"})).unwrap();
        assert!(ensure_canonical_id(&mut doc, &EMPLOYEES));
        assert!(doc.get_str("employee_id").unwrap().starts_with("emp-"));

        assert!(!ensure_canonical_id(&mut doc, &EMPLOYEES));
    }
}
