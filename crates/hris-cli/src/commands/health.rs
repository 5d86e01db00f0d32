//! 저장소 연결 점검.

use hris_core::{AppConfig, StorageBackend};
use serde_json::{json, Value};

/// `hris health` 실행. 결과를 JSON으로 반환하며 연결 실패는 에러입니다.
pub async fn run(config: &AppConfig) -> anyhow::Result<Value> {
    let backend = config.database.backend();
    match backend {
        StorageBackend::InMemory => Ok(json!({
            "storage_backend": backend.as_str(),
            "status": "up",
            "message": "volatile, process lifetime",
        })),
        StorageBackend::Postgres => {
            let db = super::connect(config).await?;
            db.health_check().await?;
            Ok(json!({
                "storage_backend": backend.as_str(),
                "status": "up",
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_is_always_up() {
        let report = run(&AppConfig::default()).await.unwrap();
        assert_eq!(report["storage_backend"], "memory");
        assert_eq!(report["status"], "up");
    }
}
