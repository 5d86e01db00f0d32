//! 직원 문서 필드 검증.

use chrono::NaiveDate;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::document::Document;
use crate::error::{HrisError, HrisResult};

/// ISO 날짜 형식.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 날짜 형식 검증 (YYYY-MM-DD)
fn validate_date_format(value: &str) -> Result<(), ValidationError> {
    if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
        return Err(ValidationError::new("invalid_date_format")
            .with_message("날짜 형식은 YYYY-MM-DD여야 합니다".into()));
    }
    Ok(())
}

/// 검증 대상 직원 필드.
///
/// 나머지 필드는 스키마가 없으므로 검증하지 않습니다.
#[derive(Debug, Default, Validate)]
pub struct EmployeeFields {
    #[validate(email(message = "이메일 형식이 올바르지 않습니다"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_date_format"))]
    pub hire_date: Option<String>,
}

impl EmployeeFields {
    /// 문서에서 검증 대상 필드를 추출합니다.
    ///
    /// 빈 문자열과 null은 필드가 없는 것으로 취급합니다.
    pub fn from_document(doc: &Document) -> HrisResult<Self> {
        Ok(Self {
            email: optional_string(doc, "email")?,
            hire_date: optional_string(doc, "hire_date")?,
        })
    }
}

/// 직원 문서 (생성 본문 또는 수정 패치) 검증.
pub fn validate_employee(doc: &Document) -> HrisResult<()> {
    let fields = EmployeeFields::from_document(doc)?;
    fields
        .validate()
        .map_err(|errors| HrisError::Validation(describe(&errors)))
}

fn optional_string(doc: &Document, field: &str) -> HrisResult<Option<String>> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(HrisError::Validation(format!(
            "{} 필드는 문자열이어야 합니다",
            field
        ))),
    }
}

/// `ValidationErrors`를 한 줄 메시지로 변환.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| format!("{}: {}", field, m))
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
