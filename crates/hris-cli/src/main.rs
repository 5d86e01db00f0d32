//! HRIS 운영 CLI.
//!
//! ```bash
//! # 스키마 마이그레이션 및 레거시 직원 문서 정규화
//! hris migrate
//! hris migrate --dry-run
//!
//! # 사용자 생성 (기존 사용자는 교체)
//! hris create-user -u alice -p 's3cret' --roles admin,hr
//!
//! # 시드용 해시 출력
//! hris hash-password -p 's3cret'
//!
//! # 저장소 연결 점검
//! hris health
//! ```

use clap::{Parser, Subcommand};
use tracing::error;

use hris_cli::commands::{create_user, hash_password, health, migrate};
use hris_cli::load_config;
use hris_core::logging::init_logging;

#[derive(Parser)]
#[command(name = "hris")]
#[command(about = "HRIS backend operator CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 마이그레이션 적용 후 레거시 직원 문서 정규화
    Migrate {
        /// 변경 없이 대상만 출력
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// 사용자 생성 (또는 교체)
    CreateUser {
        #[arg(short, long)]
        username: String,

        /// 비밀번호 (기본: HRIS_NEW_PASSWORD 환경변수)
        #[arg(short, long, env = "HRIS_NEW_PASSWORD", hide_env_values = true)]
        password: String,

        /// 쉼표로 구분된 역할 목록
        #[arg(short, long, default_value = "")]
        roles: String,
    },

    /// Argon2id 비밀번호 해시 출력
    HashPassword {
        #[arg(short, long, env = "HRIS_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// 저장소 연결 점검
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Commands::HashPassword { password } = &cli.command {
        println!("{}", hash_password::run(password)?);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Migrate { dry_run } => {
            let report = migrate::run(&config, dry_run).await.inspect_err(|e| {
                error!(error = %e, "Migration failed");
            })?;
            println!(
                "scanned: {}, normalized: {}, ids filled: {}, skipped: {}",
                report.scanned, report.normalized, report.ids_filled, report.skipped
            );
        }

        Commands::CreateUser {
            username,
            password,
            roles,
        } => {
            let roles = create_user::run(&config, &username, &password, &roles).await?;
            println!("user '{}' stored with roles {:?}", username.trim(), roles);
        }

        Commands::Health => {
            let report = health::run(&config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::HashPassword { .. } => {}
    }

    Ok(())
}
