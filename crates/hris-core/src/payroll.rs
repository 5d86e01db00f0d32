//! 급여 계산 및 급여 문서 검증.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::document::Document;
use crate::error::{HrisError, HrisResult};

/// 금액 필드.
pub const AMOUNT_FIELDS: [&str; 3] = ["gross", "deductions", "taxes"];

/// 실수령액 = 총액 - 공제 - 세금.
pub fn calculate_net(gross: Decimal, deductions: Decimal, taxes: Decimal) -> Decimal {
    gross - deductions - taxes
}

/// JSON 숫자를 `Decimal`로 변환합니다.
///
/// 필드가 없거나 null이면 `None`, 숫자가 아니면 `Validation` 에러.
pub fn amount(doc: &Document, field: &str) -> HrisResult<Option<Decimal>> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => decimal_from_number(n)
            .map(Some)
            .ok_or_else(|| HrisError::Validation(format!("{} 값을 해석할 수 없습니다: {}", field, n))),
        Some(_) => Err(HrisError::Validation(format!(
            "{} 필드는 숫자여야 합니다",
            field
        ))),
    }
}

fn decimal_from_number(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// `Decimal`을 JSON 숫자로 변환. 정수이면 정수 표기를 유지합니다.
pub fn decimal_to_value(value: Decimal) -> HrisResult<Value> {
    let normalized = value.normalize();
    if normalized.scale() == 0 {
        if let Some(i) = normalized.to_i64() {
            return Ok(Value::from(i));
        }
    }
    normalized
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| HrisError::Internal(format!("금액을 표현할 수 없습니다: {}", value)))
}

/// 급여 생성 본문 준비.
///
/// `employee_id`는 필수이며, 금액 필드는 숫자여야 합니다.
/// `net`이 없고 `gross`가 있으면 실수령액을 계산해 채웁니다.
pub fn prepare_payroll(doc: &mut Document) -> HrisResult<()> {
    match doc.get("employee_id") {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => return Err(HrisError::missing_field("employee_id")),
    }
    validate_amounts(doc)?;

    if doc.get("net").map_or(true, Value::is_null) {
        if let Some(gross) = amount(doc, "gross")? {
            let deductions = amount(doc, "deductions")?.unwrap_or_default();
            let taxes = amount(doc, "taxes")?.unwrap_or_default();
            let net = calculate_net(gross, deductions, taxes);
            doc.insert("net", decimal_to_value(net)?);
        }
    }
    Ok(())
}

/// 금액 필드 형식 검증 (수정 패치에도 사용).
pub fn validate_amounts(doc: &Document) -> HrisResult<()> {
    for field in AMOUNT_FIELDS.iter().chain(std::iter::once(&"net")) {
        amount(doc, field)?;
    }
    Ok(())
}
