// SPDX-License-Identifier: MPL-2.0

// 인증서 관리 및 SM 로그인 메뉴를 실행합니다.

use anyhow::Context;
use clap::Parser;
use futsm::app::{App, Timeouts};
use futsm::cert::CertSession;
use futsm::config::SessionConfig;
use futsm::error::Error;
use futsm::logging::{self, LogOptions};
use futsm::menu::Menu;
use futsm::trade::{TraderLibrary, FLOW_PATH, POST_LOGIN_DELAY};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEMO_VERSION: &str = "v1.0.5";

#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,
    /// 로그 파일 디렉터리
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
    /// 로그를 표준 에러에도 출력합니다.
    #[arg(long)]
    console: bool,
    /// 거래 API 브리지 라이브러리 경로
    #[arg(long)]
    trader_lib: Option<PathBuf>,
    /// 인증 기관 종류와 관계없이 사용할 인증서 SDK 경로
    #[arg(long)]
    cert_lib: Option<PathBuf>,
    /// 프런트 연결 대기 시간 (초)
    #[arg(long)]
    connect_timeout: Option<u64>,
    /// 로그인 응답 대기 시간 (초)
    #[arg(long)]
    login_timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    logging::init(&LogOptions {
        dir: opts.log_dir.clone(),
        console: opts.console,
        ..Default::default()
    })?;

    info!("------DEMO Version : {}------", DEMO_VERSION);

    let config = SessionConfig::load(&opts.config)
        .with_context(|| format!("failed to read {}", opts.config.display()))?;

    let trader = match TraderLibrary::load(opts.trader_lib.as_deref()) {
        Ok(lib) => {
            std::fs::create_dir_all(FLOW_PATH)
                .with_context(|| format!("failed to create {}", FLOW_PATH))?;
            info!("------Current Tradeapi Version : {}------", lib.api_version());
            Some(Arc::new(lib))
        }
        Err(err) => {
            warn!("trader api unavailable : {}", err);
            None
        }
    };

    let cert = CertSession::open(config.clone(), opts.cert_lib.as_deref())
        .context("no SMCertSDK API available")?;

    let timeouts = Timeouts {
        connect: opts.connect_timeout.map(Duration::from_secs),
        login: opts.login_timeout.map(Duration::from_secs),
        post_login: POST_LOGIN_DELAY,
    };

    let create_trader = || match &trader {
        Some(lib) => lib.create_api(FLOW_PATH),
        None => Err(Error::TraderUnavailable),
    };

    let mut app = App::new(cert, config, create_trader, timeouts);
    app.startup();

    let stdin = std::io::stdin();
    let result = Menu::new(stdin.lock(), std::io::stdout()).run(&mut app);

    app.shutdown();
    result.context("terminal i/o failed")
}
