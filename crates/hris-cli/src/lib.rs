//! HRIS 운영 CLI 도구.
//!
//! - 스키마 마이그레이션과 레거시 직원 문서 정규화
//! - 사용자 생성, 비밀번호 해시 출력
//! - 저장소 상태 점검

pub mod commands;

use anyhow::Context;
use hris_core::AppConfig;

/// 설정 파일 경로가 주어지면 그 파일을, 아니면 기본 위치를 사용합니다.
pub fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path).with_context(|| format!("설정 로드 실패: {}", path))?,
        None => AppConfig::load_default().context("설정 로드 실패")?,
    };
    Ok(config)
}
