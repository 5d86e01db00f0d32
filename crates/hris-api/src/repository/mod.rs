//! 문서 저장소.
//!
//! 직원/급여 컬렉션에 대한 CRUD와 낙관적 잠금(버전 검사)을 제공합니다.
//! 백엔드는 메모리([`InMemoryDocumentRepository`])와
//! PostgreSQL JSONB([`PgDocumentRepository`]) 두 가지이며,
//! 동일한 에러 분류와 관찰 가능한 동작을 가집니다.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use hris_core::document::display_string;
use hris_core::{CollectionSpec, Document, HrisError, HrisResult, VERSION_FIELD};
use serde_json::Value;

pub use memory::InMemoryDocumentRepository;
pub use postgres::{Database, PgDocumentRepository};
pub(crate) use postgres::with_timeout;

/// 문서 저장소 trait.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// 컬렉션 메타데이터.
    fn collection(&self) -> &CollectionSpec;

    /// 모든 문서 조회 (순서 보장 없음).
    async fn list(&self) -> HrisResult<Vec<Document>>;

    /// 문서 생성. 식별자 필드가 없으면 `Validation`, 이미 존재하면 `Conflict`.
    async fn create(&self, doc: Document) -> HrisResult<Document>;

    /// 식별자(정식 또는 레거시 필드)로 문서 조회.
    async fn get(&self, id: &str) -> HrisResult<Document>;

    /// 버전 검사 후 얕은 병합 수정. 성공 시 버전이 정확히 1 증가합니다.
    async fn update(
        &self,
        id: &str,
        patch: Document,
        expected_version: Option<i64>,
    ) -> HrisResult<Document>;

    /// 영구 삭제.
    async fn delete(&self, id: &str) -> HrisResult<()>;

    /// 최상위 필드 값이 일치하는 문서 조회.
    ///
    /// 문자열, 숫자, 불리언 값만 비교하며 null, 객체, 배열 필드는 일치하지 않습니다.
    async fn find_by_field(&self, field: &str, value: &str) -> HrisResult<Vec<Document>>;
}

/// 공유 저장소 핸들.
pub type SharedRepository = Arc<dyn DocumentRepository>;

/// 생성할 문서 준비: 식별자를 확인하고 버전을 1로 설정합니다.
///
/// 요청 본문의 `version`은 무시됩니다.
pub(crate) fn prepare_new(spec: &CollectionSpec, mut doc: Document) -> HrisResult<(String, Document)> {
    let id = spec.require_id(&doc)?;
    doc.set_version(1);
    Ok((id, doc))
}

/// 버전 검사와 병합을 수행해 저장할 다음 문서를 만듭니다.
///
/// 저장된 버전이 없으면 0으로 간주합니다. 패치의 `version`과 식별자 필드는 무시됩니다.
pub(crate) fn apply_update(
    spec: &CollectionSpec,
    id: &str,
    current: &Document,
    mut patch: Document,
    expected_version: Option<i64>,
) -> HrisResult<Document> {
    let actual = current.version().unwrap_or(0);
    if let Some(expected) = expected_version {
        if expected != actual {
            return Err(HrisError::VersionConflict {
                id: id.to_string(),
                expected,
                actual,
            });
        }
    }

    patch.remove(VERSION_FIELD);
    patch.remove(spec.id_field);
    for legacy in spec.legacy_id_fields {
        patch.remove(legacy);
    }

    let mut next = current.clone();
    next.merge(patch);
    next.set_version(actual + 1);
    Ok(next)
}

/// `find_by_field` 비교용 스칼라 텍스트. 스칼라가 아니면 `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(display_string(value)),
        _ => None,
    }
}

/// 컬렉션 경로 형식의 NotFound 에러.
pub(crate) fn not_found(spec: &CollectionSpec, id: &str) -> HrisError {
    HrisError::NotFound(format!("{}/{}", spec.name, id))
}
