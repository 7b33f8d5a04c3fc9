// SPDX-License-Identifier: MPL-2.0

//! 설정 파일 모듈입니다.
//!
//! 설정은 INI 파일의 `[config]` 섹션에서 읽으며, `FUTSM_CONFIG__<KEY>` 형식의
//! 환경 변수가 파일의 값보다 우선합니다. 키는 대소문자를 구분하지 않습니다.
//!
//! ```ini
//! [config]
//! SMCert=smk
//! BrokerID=9999
//! UserID=000001
//! Password=secret
//! PIN=123456
//! SMFrontAddr=1.2.3.4
//! SMPort=9999
//! SSLFrontAddr=trade
//! AuthCode=0000000000000000
//! AppID=client_demo_1.0
//! ```

use crate::cert::CaKind;
use crate::error::{ConfigError, Error};

use config::{Config, Environment, File, FileFormat, Map, Value};
use std::path::Path;

/// 설정 값이 들어있는 섹션 이름입니다.
pub const SECTION: &str = "config";

/// 환경 변수 접두사입니다.
pub const ENV_PREFIX: &str = "FUTSM";

/// 인증서 및 거래 세션 설정입니다.
///
/// 한 번 읽은 이후에는 변경되지 않습니다.
#[derive(Clone, Default, PartialEq)]
pub struct SessionConfig {
    /// 인증 기관 종류 (`SMCert`)
    pub sm_cert: String,
    /// 브로커 ID (`BrokerID`)
    pub broker_id: String,
    /// 사용자 ID (`UserID`)
    pub user_id: String,
    /// 비밀번호 (`Password`)
    pub password: String,
    /// 인증서 PIN (`PIN`)
    pub pin: String,
    /// 프런트 호스트 (`SMFrontAddr`)
    pub sm_front_addr: String,
    /// 프런트 포트 (`SMPort`)
    pub sm_port: String,
    /// SSL 프런트 ID (`SSLFrontAddr`)
    pub ssl_front_addr: String,
    /// 인증 코드 (`AuthCode`)
    pub auth_code: String,
    /// 앱 ID (`AppID`)
    pub app_id: String,
}

impl SessionConfig {
    /// INI 파일과 환경 변수에서 설정을 불러옵니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(File::new(&path.as_ref().to_string_lossy(), FileFormat::Ini))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::from_config(&cfg)
    }

    /// 이미 만들어진 설정 객체에서 `[config]` 섹션을 읽습니다.
    ///
    /// 누락된 키는 빈 문자열입니다.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let table = cfg
            .get_table(SECTION)
            .map_err(|_| ConfigError::MissingSection(SECTION.to_owned()))?;

        Ok(Self {
            sm_cert: lookup(&table, "SMCert")?,
            broker_id: lookup(&table, "BrokerID")?,
            user_id: lookup(&table, "UserID")?,
            password: lookup(&table, "Password")?,
            pin: lookup(&table, "PIN")?,
            sm_front_addr: lookup(&table, "SMFrontAddr")?,
            sm_port: lookup(&table, "SMPort")?,
            ssl_front_addr: lookup(&table, "SSLFrontAddr")?,
            auth_code: lookup(&table, "AuthCode")?,
            app_id: lookup(&table, "AppID")?,
        })
    }

    /// 인증 기관 종류를 반환합니다.
    pub fn ca_kind(&self) -> Result<CaKind, Error> {
        self.sm_cert.parse()
    }

    /// 포트 번호를 반환합니다.
    pub fn port(&self) -> Result<u16, Error> {
        self.sm_port
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPort(self.sm_port.clone()))
    }

    /// 거래 API에 등록할 프런트 주소를 반환합니다.
    ///
    /// `<SMCert>://<SMFrontAddr>:<SMPort>/<SSLFrontAddr>` 형식입니다.
    pub fn front_addr(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.sm_cert, self.sm_front_addr, self.sm_port, self.ssl_front_addr
        )
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("sm_cert", &self.sm_cert)
            .field("broker_id", &self.broker_id)
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .field("pin", &"***")
            .field("sm_front_addr", &self.sm_front_addr)
            .field("sm_port", &self.sm_port)
            .field("ssl_front_addr", &self.ssl_front_addr)
            .field("auth_code", &"***")
            .field("app_id", &self.app_id)
            .finish()
    }
}

fn lookup(table: &Map<String, Value>, key: &str) -> Result<String, ConfigError> {
    match table.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
        Some((_, value)) => Ok(value.clone().into_string()?),
        None => Ok(String::new()),
    }
}
