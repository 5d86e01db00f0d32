//! 직원 서비스.
//!
//! 직원 저장소 위에 필드 검증, 필터/정렬, 페이지네이션을 얹습니다.

use std::collections::HashMap;

use hris_core::validation::validate_employee;
use hris_core::{Document, HrisResult, ListQuery, Page, EMPLOYEES};
use serde_json::Value;
use tracing::info;

use crate::repository::SharedRepository;

/// 직원 서비스.
#[derive(Clone)]
pub struct EmployeeService {
    repo: SharedRepository,
}

impl EmployeeService {
    pub fn new(repo: SharedRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &SharedRepository {
        &self.repo
    }

    /// 직원 생성.
    ///
    /// `email`, `hire_date`가 있으면 형식을 검증하고,
    /// `employee_id`가 없으면 서버에서 생성합니다.
    pub async fn create(&self, mut doc: Document) -> HrisResult<Document> {
        validate_employee(&doc)?;
        let missing_id = match doc.get(EMPLOYEES.id_field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if missing_id {
            doc.insert(EMPLOYEES.id_field, EMPLOYEES.generate_id());
        }

        let created = self.repo.create(doc).await?;
        info!(
            employee_id = created.get_str(EMPLOYEES.id_field).unwrap_or_default(),
            "Employee created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> HrisResult<Document> {
        self.repo.get(id).await
    }

    /// 직원 수정. 패치에 포함된 `email`, `hire_date`도 검증합니다.
    pub async fn update(
        &self,
        id: &str,
        patch: Document,
        expected_version: Option<i64>,
    ) -> HrisResult<Document> {
        validate_employee(&patch)?;
        let updated = self.repo.update(id, patch, expected_version).await?;
        info!(employee_id = %id, version = updated.version().unwrap_or_default(), "Employee updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> HrisResult<()> {
        self.repo.delete(id).await?;
        info!(employee_id = %id, "Employee deleted");
        Ok(())
    }

    /// 필터/정렬/페이지네이션을 적용한 목록.
    pub async fn list(&self, query: &ListQuery) -> HrisResult<Page<Document>> {
        let docs = self.repo.list().await?;
        Ok(query.apply(docs))
    }

    /// 필터 맵 기반 목록. `sort` 키는 정렬 표현식으로 해석됩니다.
    pub async fn list_filtered(
        &self,
        page: i64,
        per_page: i64,
        filter: HashMap<String, String>,
    ) -> HrisResult<Page<Document>> {
        self.list(&ListQuery::from_filter_map(page, per_page, filter))
            .await
    }
}
