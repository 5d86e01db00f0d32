//! 메모리 문서 저장소.
//!
//! 데이터베이스가 설정되지 않았을 때 사용됩니다.
//! 컬렉션당 하나의 뮤텍스가 모든 연산 전체를 감싸므로 연산은 선형화됩니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use hris_core::{CollectionSpec, Document, HrisError, HrisResult};
use tokio::sync::Mutex;
use tracing::debug;

use super::{apply_update, not_found, prepare_new, scalar_text, DocumentRepository};

/// 메모리 문서 저장소.
pub struct InMemoryDocumentRepository {
    spec: CollectionSpec,
    docs: Mutex<BTreeMap<String, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            docs: Mutex::new(BTreeMap::new()),
        }
    }

    /// 식별자에 해당하는 저장 키를 찾습니다. 정식 키가 우선합니다.
    fn resolve_key(&self, docs: &BTreeMap<String, Document>, id: &str) -> Option<String> {
        if docs.contains_key(id) {
            return Some(id.to_string());
        }
        docs.iter()
            .find(|(_, doc)| self.spec.matches_id(doc, id))
            .map(|(key, _)| key.clone())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    fn collection(&self) -> &CollectionSpec {
        &self.spec
    }

    async fn list(&self) -> HrisResult<Vec<Document>> {
        let docs = self.docs.lock().await;
        Ok(docs.values().cloned().collect())
    }

    async fn create(&self, doc: Document) -> HrisResult<Document> {
        let (id, doc) = prepare_new(&self.spec, doc)?;
        let mut docs = self.docs.lock().await;
        if self.resolve_key(&docs, &id).is_some() {
            return Err(HrisError::Conflict(format!("{}/{}", self.spec.name, id)));
        }
        docs.insert(id.clone(), doc.clone());
        debug!(collection = self.spec.name, id = %id, "Document created");
        Ok(doc)
    }

    async fn get(&self, id: &str) -> HrisResult<Document> {
        let docs = self.docs.lock().await;
        self.resolve_key(&docs, id)
            .and_then(|key| docs.get(&key).cloned())
            .ok_or_else(|| not_found(&self.spec, id))
    }

    async fn update(
        &self,
        id: &str,
        patch: Document,
        expected_version: Option<i64>,
    ) -> HrisResult<Document> {
        let mut docs = self.docs.lock().await;
        let key = self
            .resolve_key(&docs, id)
            .ok_or_else(|| not_found(&self.spec, id))?;
        let current = docs.get(&key).ok_or_else(|| not_found(&self.spec, id))?;

        let next = apply_update(&self.spec, id, current, patch, expected_version)?;
        docs.insert(key, next.clone());
        Ok(next)
    }

    async fn delete(&self, id: &str) -> HrisResult<()> {
        let mut docs = self.docs.lock().await;
        let key = self
            .resolve_key(&docs, id)
            .ok_or_else(|| not_found(&self.spec, id))?;
        docs.remove(&key);
        debug!(collection = self.spec.name, id = %id, "Document deleted");
        Ok(())
    }

    async fn find_by_field(&self, field: &str, value: &str) -> HrisResult<Vec<Document>> {
        let docs = self.docs.lock().await;
        Ok(docs
            .values()
            .filter(|doc| doc.get(field).and_then(scalar_text).as_deref() == Some(value))
            .cloned()
            .collect())
    }
}
