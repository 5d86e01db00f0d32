//! 급여 서비스.

use hris_core::payroll::{prepare_payroll, validate_amounts, AMOUNT_FIELDS};
use hris_core::{Document, HrisResult, PAYROLL};
use serde_json::Value;
use tracing::info;

use crate::repository::SharedRepository;

/// 급여 서비스.
#[derive(Clone)]
pub struct PayrollService {
    repo: SharedRepository,
}

impl PayrollService {
    pub fn new(repo: SharedRepository) -> Self {
        Self { repo }
    }

    /// 급여 레코드 생성.
    ///
    /// `id`가 없으면 생성하고, `net`이 없으면 `gross - deductions - taxes`로 채웁니다.
    pub async fn create(&self, mut doc: Document) -> HrisResult<Document> {
        let missing_id = match doc.get(PAYROLL.id_field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if missing_id {
            doc.insert(PAYROLL.id_field, PAYROLL.generate_id());
        }
        prepare_payroll(&mut doc)?;

        let created = self.repo.create(doc).await?;
        info!(
            payroll_id = created.get_str(PAYROLL.id_field).unwrap_or_default(),
            employee_id = created.get_str("employee_id").unwrap_or_default(),
            "Payroll record created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> HrisResult<Document> {
        self.repo.get(id).await
    }

    /// 급여 레코드 수정.
    ///
    /// 금액 필드가 바뀌고 `net`이 지정되지 않으면 병합 결과로 `net`을 다시 계산합니다.
    /// 이때 읽은 버전을 기대 버전으로 사용하므로 동시 수정은 `VersionConflict`가 됩니다.
    pub async fn update(
        &self,
        id: &str,
        mut patch: Document,
        expected_version: Option<i64>,
    ) -> HrisResult<Document> {
        validate_amounts(&patch)?;

        let touches_amounts = AMOUNT_FIELDS.iter().any(|f| patch.contains(f));
        let mut expected = expected_version;
        if touches_amounts && !patch.contains("net") {
            let current = self.repo.get(id).await?;
            let mut merged = current.clone();
            merged.merge(patch.clone());
            merged.remove("net");
            prepare_payroll(&mut merged)?;
            if let Some(net) = merged.get("net").cloned() {
                patch.insert("net", net);
            }
            expected = expected.or(Some(current.version().unwrap_or(0)));
        }

        let updated = self.repo.update(id, patch, expected).await?;
        info!(payroll_id = %id, version = updated.version().unwrap_or_default(), "Payroll record updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> HrisResult<()> {
        self.repo.delete(id).await?;
        info!(payroll_id = %id, "Payroll record deleted");
        Ok(())
    }

    /// 직원별 급여 레코드.
    pub async fn list_by_employee(&self, employee_id: &str) -> HrisResult<Vec<Document>> {
        self.repo.find_by_field("employee_id", employee_id).await
    }
}
