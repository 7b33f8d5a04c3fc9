// SPDX-License-Identifier: MPL-2.0

//! 로그 초기화 모듈입니다.
//!
//! 모든 작업 결과는 반환값과 별개로 로그 파일에 기록됩니다. 로그 파일은 덮어쓰지
//! 않고 이어서 기록하며, `RUST_LOG` 환경 변수로 로그 수준을 지정할 수 있습니다.

use anyhow::{Context, Result};
use std::{path::PathBuf, sync::OnceLock};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter,
};

/// 기본 로그 수준
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// 기본 로그 파일명
pub const DEFAULT_LOG_FILE: &str = "out.log";

// 프로그램 종료 전까지 남은 로그를 기록하기 위해 보관합니다.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// 로그 출력 설정입니다.
#[derive(Clone, Debug)]
pub struct LogOptions {
    /// 로그 파일이 생성될 디렉터리
    pub dir: PathBuf,
    /// 로그 파일명
    pub file_name: String,
    /// 표준 에러에도 출력할지에 대한 여부
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { dir: PathBuf::from("."), file_name: DEFAULT_LOG_FILE.to_owned(), console: false }
    }
}

/// 전역 로그 구독자를 설치합니다.
///
/// 프로세스당 한 번만 호출할 수 있습니다.
pub fn init(options: &LogOptions) -> Result<()> {
    std::fs::create_dir_all(&options.dir)
        .with_context(|| format!("failed to create log directory: {}", options.dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&options.dir, &options.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_thread_ids(true)
        .with_target(false)
        .with_ansi(false);

    let console_layer = options
        .console
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    Registry::default()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("failed to install the log subscriber")?;

    Ok(())
}
