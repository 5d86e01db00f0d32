//! PostgreSQL JSONB 문서 저장소.
//!
//! 문서는 `hris_documents` 테이블에 (collection, doc_id) 키로 저장되며,
//! 버전은 별도 컬럼으로 관리되어 수정 시 compare-and-swap 조건으로 사용됩니다.
//! 모든 호출은 설정된 타임아웃으로 감싸지며 타임아웃은 `Storage` 에러가 됩니다.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use hris_core::{CollectionSpec, DatabaseConfig, Document, HrisError, HrisResult};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::{debug, info, warn};

use super::{apply_update, not_found, prepare_new, DocumentRepository};

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    operation_timeout: Duration,
}

impl Database {
    /// 연결 풀을 생성하고 연결을 확인합니다.
    pub async fn connect(config: &DatabaseConfig) -> HrisResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| HrisError::Config("database.url이 설정되지 않았습니다".into()))?;

        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(url)
            .await
            .map_err(|e| HrisError::Storage(format!("데이터베이스 연결 실패: {}", e)))?;

        let db = Self {
            pool,
            operation_timeout: config.operation_timeout(),
        };
        db.health_check().await?;
        info!("Database connection established");
        Ok(db)
    }

    /// 기존 연결 풀에서 생성합니다.
    pub fn from_pool(pool: PgPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> HrisResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| HrisError::Storage(format!("마이그레이션 실패: {}", e)))?;
        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> HrisResult<()> {
        with_timeout(
            self.operation_timeout,
            "health_check",
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}

/// 타임아웃을 적용해 데이터베이스 호출을 실행합니다.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, operation: &'static str, fut: F) -> HrisResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(HrisError::from),
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis() as u64, "Storage call timed out");
            Err(HrisError::Storage(format!(
                "{} 작업이 {}ms 내에 완료되지 않았습니다",
                operation,
                timeout.as_millis()
            )))
        }
    }
}

/// 저장된 행.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    doc_id: String,
    body: Json<Value>,
    version: i64,
}

impl DocumentRow {
    /// 본문에 버전 컬럼 값을 반영한 문서.
    fn into_document(self) -> HrisResult<Document> {
        let mut doc = Document::from_value(self.body.0)?;
        doc.set_version(self.version);
        Ok(doc)
    }
}

/// 정식 키와 레거시 식별자 필드를 함께 검사하는 조건 ($2 = 식별자).
fn id_predicate(spec: &CollectionSpec) -> String {
    let mut predicate = String::from("doc_id = $2");
    for legacy in spec.legacy_id_fields {
        predicate.push_str(&format!(" OR body->>'{}' = $2", legacy));
    }
    predicate
}

/// 같은 식별자로 조회되는 행이 없을 때만 삽입합니다.
fn guarded_insert_sql(id_predicate: &str) -> String {
    format!(
        "INSERT INTO hris_documents (collection, doc_id, body, version) \
         SELECT $1, $2, $3, $4 \
         WHERE NOT EXISTS (SELECT 1 FROM hris_documents WHERE collection = $1 AND ({}))",
        id_predicate
    )
}

/// PostgreSQL JSONB 문서 저장소.
pub struct PgDocumentRepository {
    db: Database,
    spec: CollectionSpec,
    /// 정식/레거시 식별자 매칭 조건 ($2 = 식별자)
    id_predicate: String,
    insert_sql: String,
}

impl PgDocumentRepository {
    pub fn new(db: Database, spec: CollectionSpec) -> Self {
        let id_predicate = id_predicate(&spec);
        let insert_sql = guarded_insert_sql(&id_predicate);
        Self {
            db,
            spec,
            id_predicate,
            insert_sql,
        }
    }

    async fn fetch_row(&self, id: &str) -> HrisResult<Option<DocumentRow>> {
        let sql = format!(
            "SELECT doc_id, body, version FROM hris_documents \
             WHERE collection = $1 AND ({}) \
             ORDER BY (doc_id = $2) DESC, doc_id LIMIT 1",
            self.id_predicate
        );
        with_timeout(
            self.db.operation_timeout,
            "get",
            sqlx::query_as::<_, DocumentRow>(&sql)
                .bind(self.spec.name)
                .bind(id)
                .fetch_optional(&self.db.pool),
        )
        .await
    }

    /// 저장된 모든 행을 `(doc_id, 문서)`로 조회합니다.
    pub async fn list_rows(&self) -> HrisResult<Vec<(String, Document)>> {
        let rows = with_timeout(
            self.db.operation_timeout,
            "list_rows",
            sqlx::query_as::<_, DocumentRow>(
                "SELECT doc_id, body, version FROM hris_documents \
                 WHERE collection = $1 ORDER BY doc_id",
            )
            .bind(self.spec.name)
            .fetch_all(&self.db.pool),
        )
        .await?;

        rows.into_iter()
            .map(|row| {
                let doc_id = row.doc_id.clone();
                row.into_document().map(|doc| (doc_id, doc))
            })
            .collect()
    }

    /// 본문을 교체하고 필요하면 `doc_id`를 옮깁니다. 버전은 유지됩니다.
    ///
    /// 대상 `doc_id`가 이미 있으면 `Conflict`.
    pub async fn rewrite(&self, doc_id: &str, new_doc_id: &str, doc: &Document) -> HrisResult<()> {
        let result = with_timeout(
            self.db.operation_timeout,
            "rewrite",
            sqlx::query(
                "UPDATE hris_documents SET doc_id = $3, body = $4, updated_at = NOW() \
                 WHERE collection = $1 AND doc_id = $2",
            )
            .bind(self.spec.name)
            .bind(doc_id)
            .bind(new_doc_id)
            .bind(Json(doc.as_map()))
            .execute(&self.db.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(&self.spec, doc_id));
        }
        info!(collection = self.spec.name, doc_id, new_doc_id, "Document rewritten");
        Ok(())
    }

    async fn current_version(&self, doc_id: &str) -> HrisResult<Option<i64>> {
        with_timeout(
            self.db.operation_timeout,
            "get_version",
            sqlx::query_scalar::<_, i64>(
                "SELECT version FROM hris_documents WHERE collection = $1 AND doc_id = $2",
            )
            .bind(self.spec.name)
            .bind(doc_id)
            .fetch_optional(&self.db.pool),
        )
        .await
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    fn collection(&self) -> &CollectionSpec {
        &self.spec
    }

    async fn list(&self) -> HrisResult<Vec<Document>> {
        let rows = with_timeout(
            self.db.operation_timeout,
            "list",
            sqlx::query_as::<_, DocumentRow>(
                "SELECT doc_id, body, version FROM hris_documents \
                 WHERE collection = $1 ORDER BY doc_id",
            )
            .bind(self.spec.name)
            .fetch_all(&self.db.pool),
        )
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    async fn create(&self, doc: Document) -> HrisResult<Document> {
        let (id, doc) = prepare_new(&self.spec, doc)?;
        let version = doc.version().unwrap_or(1);

        let result = with_timeout(
            self.db.operation_timeout,
            "create",
            sqlx::query(&self.insert_sql)
                .bind(self.spec.name)
                .bind(&id)
                .bind(Json(doc.as_map()))
                .bind(version)
                .execute(&self.db.pool),
        )
        .await;

        // 0행이면 레거시 식별자로 이미 조회되는 문서가 있음
        match result {
            Ok(done) if done.rows_affected() > 0 => {
                debug!(collection = self.spec.name, id = %id, "Document created");
                Ok(doc)
            }
            Ok(_) | Err(HrisError::Conflict(_)) => {
                Err(HrisError::Conflict(format!("{}/{}", self.spec.name, id)))
            }
            Err(e) => Err(e),
        }
    }

    async fn get(&self, id: &str) -> HrisResult<Document> {
        self.fetch_row(id)
            .await?
            .ok_or_else(|| not_found(&self.spec, id))?
            .into_document()
    }

    async fn update(
        &self,
        id: &str,
        patch: Document,
        expected_version: Option<i64>,
    ) -> HrisResult<Document> {
        let row = self
            .fetch_row(id)
            .await?
            .ok_or_else(|| not_found(&self.spec, id))?;
        let doc_id = row.doc_id.clone();
        let read_version = row.version;
        let current = row.into_document()?;

        let next = apply_update(&self.spec, id, &current, patch, expected_version)?;
        let next_version = next.version().unwrap_or(read_version + 1);

        // 읽은 버전이 그대로일 때만 기록
        let result = with_timeout(
            self.db.operation_timeout,
            "update",
            sqlx::query(
                "UPDATE hris_documents SET body = $4, version = $5, updated_at = NOW() \
                 WHERE collection = $1 AND doc_id = $2 AND version = $3",
            )
            .bind(self.spec.name)
            .bind(&doc_id)
            .bind(read_version)
            .bind(Json(next.as_map()))
            .bind(next_version)
            .execute(&self.db.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return match self.current_version(&doc_id).await? {
                None => Err(not_found(&self.spec, id)),
                Some(actual) => {
                    warn!(collection = self.spec.name, id = %id, actual, "Concurrent update detected");
                    Err(HrisError::VersionConflict {
                        id: id.to_string(),
                        expected: expected_version.unwrap_or(read_version),
                        actual,
                    })
                }
            };
        }

        Ok(next)
    }

    async fn delete(&self, id: &str) -> HrisResult<()> {
        let row = self
            .fetch_row(id)
            .await?
            .ok_or_else(|| not_found(&self.spec, id))?;

        let result = with_timeout(
            self.db.operation_timeout,
            "delete",
            sqlx::query("DELETE FROM hris_documents WHERE collection = $1 AND doc_id = $2")
                .bind(self.spec.name)
                .bind(&row.doc_id)
                .execute(&self.db.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(&self.spec, id));
        }
        debug!(collection = self.spec.name, id = %id, "Document deleted");
        Ok(())
    }

    async fn find_by_field(&self, field: &str, value: &str) -> HrisResult<Vec<Document>> {
        let rows = with_timeout(
            self.db.operation_timeout,
            "find_by_field",
            sqlx::query_as::<_, DocumentRow>(
                "SELECT doc_id, body, version FROM hris_documents \
                 WHERE collection = $1 \
                   AND jsonb_typeof(body->$2) IN ('string', 'number', 'boolean') \
                   AND body->>$2 = $3 \
                 ORDER BY doc_id",
            )
            .bind(self.spec.name)
            .bind(field)
            .bind(value)
            .fetch_all(&self.db.pool),
        )
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}
