//! 스키마 마이그레이션과 레거시 직원 문서 정규화.

use hris_api::repository::PgDocumentRepository;
use hris_core::legacy::{ensure_canonical_id, normalize_legacy_fields};
use hris_core::{AppConfig, CollectionSpec, Document, HrisError, EMPLOYEES};
use tracing::{info, warn};

/// 정규화 결과 집계.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrateReport {
    pub scanned: usize,
    pub normalized: usize,
    pub ids_filled: usize,
    pub skipped: usize,
}

/// 한 문서에 대한 정규화 계획.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizePlan {
    pub new_doc_id: String,
    pub document: Document,
    pub id_filled: bool,
}

/// 저장된 문서를 정규화한 결과. 바꿀 것이 없으면 `None`.
///
/// 식별자가 전혀 없는 문서는 저장 키(`doc_id`)를 식별자로 사용합니다.
pub fn plan_normalization(spec: &CollectionSpec, doc_id: &str, mut doc: Document) -> Option<NormalizePlan> {
    let renamed = normalize_legacy_fields(&mut doc);

    let mut id_filled = false;
    if spec.document_id(&doc).map_or(true, str::is_empty) && !doc_id.is_empty() {
        doc.insert(spec.id_field, doc_id);
        id_filled = true;
    }
    id_filled |= ensure_canonical_id(&mut doc, spec);

    let new_doc_id = doc.get_str(spec.id_field).unwrap_or(doc_id).to_string();
    if !renamed && !id_filled && new_doc_id == doc_id {
        return None;
    }

    Some(NormalizePlan {
        new_doc_id,
        document: doc,
        id_filled,
    })
}

/// `hris migrate` 실행.
pub async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<MigrateReport> {
    let db = super::connect(config).await?;
    if dry_run {
        info!("Dry run: skipping schema migrations");
    } else {
        db.migrate().await?;
    }

    let repo = PgDocumentRepository::new(db, EMPLOYEES);
    let mut report = MigrateReport::default();

    for (doc_id, doc) in repo.list_rows().await? {
        report.scanned += 1;
        let Some(plan) = plan_normalization(&EMPLOYEES, &doc_id, doc) else {
            continue;
        };

        if dry_run {
            info!(doc_id = %doc_id, new_doc_id = %plan.new_doc_id, "Would normalize");
        } else {
            match repo.rewrite(&doc_id, &plan.new_doc_id, &plan.document).await {
                Ok(()) => {}
                Err(HrisError::Conflict(e)) => {
                    warn!(doc_id = %doc_id, new_doc_id = %plan.new_doc_id, error = %e, "Identifier already taken, skipping");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        report.normalized += 1;
        if plan.id_filled {
            report.ids_filled += 1;
        }
    }

    info!(
        scanned = report.scanned,
        normalized = report.normalized,
        ids_filled = report.ids_filled,
        skipped = report.skipped,
        "Legacy normalization finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_canonical_document_untouched() {
        let stored = doc(json!({"employee_id": "e1", "legal_name": "Ada", "version": 3}));
        assert!(plan_normalization(&EMPLOYEES, "e1", stored).is_none());
    }

    #[test]
    fn test_legacy_fields_renamed() {
        let stored = doc(json!({"employeeid": "e7", "hiredate": "2001-01-01", "version": 1}));
        let plan = plan_normalization(&EMPLOYEES, "e7", stored).unwrap();

        assert_eq!(plan.new_doc_id, "e7");
        assert!(!plan.id_filled);
        assert_eq!(plan.document.get_str("employee_id"), Some("e7"));
        assert_eq!(plan.document.get_str("hire_date"), Some("2001-01-01"));
        assert!(!plan.document.contains("employeeid"));
        assert!(!plan.document.contains("hiredate"));
    }

    #[test]
    fn test_missing_identifier_uses_storage_key() {
        let stored = doc(json!({"name": "Orphan"}));
        let plan = plan_normalization(&EMPLOYEES, "row-9", stored).unwrap();

        assert!(plan.id_filled);
        assert_eq!(plan.new_doc_id, "row-9");
        assert_eq!(plan.document.get_str("employee_id"), Some("row-9"));
    }

    #[test]
    fn test_storage_key_moves_to_legacy_identifier() {
        let stored = doc(json!({"employeeid": "legacy-3"}));
        let plan = plan_normalization(&EMPLOYEES, "imported-1", stored).unwrap();

        assert_eq!(plan.new_doc_id, "legacy-3");
        assert_eq!(plan.document.get_str("employee_id"), Some("legacy-3"));
    }

    #[test]
    fn test_canonical_wins_over_legacy_value() {
        let stored = doc(json!({"employee_id": "e1", "employeeid": "old-1"}));
        let plan = plan_normalization(&EMPLOYEES, "e1", stored).unwrap();

        assert_eq!(plan.new_doc_id, "e1");
        assert_eq!(plan.document.get_str("employee_id"), Some("e1"));
        assert!(!plan.document.contains("employeeid"));
    }
}
