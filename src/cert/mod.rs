// SPDX-License-Identifier: MPL-2.0

//! 인증서 SDK 모듈입니다.
//!
//! 인증 기관 종류(`smk`, `sms`, `smi`)에 따라 선택된 동적 라이브러리를 불러와
//! 인증서 발급, 연장, 조회, 폐기 및 PIN 재설정을 수행합니다. 모든 작업의 결과는
//! 로그로 기록되며 `Result`로도 반환됩니다.

pub mod code;

mod entry;
mod raw;

pub use self::entry::CertEntry;

use crate::config::SessionConfig;
use crate::error::Error;

use std::{ffi::OsString, path::Path, str::FromStr, time::Duration};
use tracing::{error, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SDK 전역 초기화 시 지정하는 로그 파일명입니다.
pub const SDK_LOG_FILE: &str = "sdk.log";

/// 인증서 서버 요청 시간 제한입니다.
pub const HANDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// PIN의 최소 길이입니다.
pub const MIN_PIN_LEN: usize = 6;

/// 인증 기관 종류
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CaKind {
    /// `smk`
    Smk,
    /// `sms`
    Sms,
    /// `smi`
    Smi,
}

impl CaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smk => "smk",
            Self::Sms => "sms",
            Self::Smi => "smi",
        }
    }

    /// 확장자와 접두사를 제외한 라이브러리 이름을 반환합니다.
    pub fn library_name(&self) -> &'static str {
        match self {
            Self::Smk => "smk_certsdk",
            Self::Sms => "sms_certsdk",
            Self::Smi => "smi_certsdk",
        }
    }

    /// 현재 플랫폼의 라이브러리 파일명을 반환합니다.
    ///
    /// 윈도우에서는 `smk_certsdk.dll`과 같은 형식입니다.
    pub fn library_file_name(&self) -> OsString {
        libloading::library_filename(self.library_name())
    }
}

impl FromStr for CaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smk" => Ok(Self::Smk),
            "sms" => Ok(Self::Sms),
            "smi" => Ok(Self::Smi),
            _ => Err(Error::UnknownCaKind(s.to_owned())),
        }
    }
}

impl std::fmt::Display for CaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SDK가 생성한 인증서 핸들입니다.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CertHandle(pub usize);

/// 핸들 생성에 사용되는 설정입니다.
#[derive(Clone, PartialEq)]
pub struct HandleConfig {
    pub broker_id: String,
    pub user_id: String,
    pub broker_name: String,
    pub password: String,
    pub pin: String,
    /// 외부 소켓을 사용하지 않는 경우 `-1`
    pub cert_socket: i32,
    pub cert_host: String,
    pub cert_port: u16,
    pub timeout: Duration,
}

impl HandleConfig {
    pub fn from_session(config: &SessionConfig) -> Result<Self, Error> {
        Ok(Self {
            broker_id: config.broker_id.clone(),
            user_id: config.user_id.clone(),
            broker_name: String::new(),
            password: config.password.clone(),
            pin: config.pin.clone(),
            cert_socket: -1,
            cert_host: config.sm_front_addr.clone(),
            cert_port: config.port()?,
            timeout: HANDLE_TIMEOUT,
        })
    }
}

impl std::fmt::Debug for HandleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleConfig")
            .field("broker_id", &self.broker_id)
            .field("user_id", &self.user_id)
            .field("cert_host", &self.cert_host)
            .field("cert_port", &self.cert_port)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// 서버에 등록된 유효한 인증서 정보입니다.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CertRecord {
    pub cert_id: String,
    pub user_id: String,
    pub device_id: String,
    pub cert_info: String,
    /// 현재 장치의 인증서인지에 대한 여부
    pub is_current: bool,
}

/// 인증서 SDK의 진입점에 대한 트레이트입니다.
///
/// 0이 아닌 반환 코드는 [`Error::CertSdk`](crate::error::Error::CertSdk)로 변환됩니다.
pub trait CertApi {
    fn version(&self) -> String;
    fn init(&self, log_file: &str) -> Result<(), Error>;
    fn clean(&self) -> Result<(), Error>;
    fn new_handle(&self, config: &HandleConfig) -> Result<CertHandle, Error>;
    fn free_handle(&self, handle: CertHandle) -> Result<(), Error>;
    fn cert_query(&self, handle: CertHandle) -> Result<Vec<CertRecord>, Error>;
    fn cert_enroll(&self, handle: CertHandle) -> Result<(), Error>;
    fn cert_delay(&self, handle: CertHandle) -> Result<(), Error>;
    fn cert_revoke(&self, handle: CertHandle, cert_id: &str) -> Result<(), Error>;
    fn reset_pin(&self, handle: CertHandle, new_pin: &str) -> Result<(), Error>;
}

/// 인증서 SDK 세션입니다.
///
/// 세션당 하나의 핸들만을 가지며, 프로그램 종료 전에 [`free_handle`](Self::free_handle)과
/// [`cleanup`](Self::cleanup)을 호출해야 합니다.
pub struct CertSession<A: CertApi = CertEntry> {
    api: A,
    kind: CaKind,
    config: SessionConfig,
    handle: Option<CertHandle>,
}

impl CertSession<CertEntry> {
    /// 설정된 인증 기관 종류의 라이브러리를 불러와 세션을 생성합니다.
    ///
    /// `path`가 지정된 경우 종류와 관계없이 해당 경로의 라이브러리를 사용합니다.
    pub fn open(config: SessionConfig, path: Option<&Path>) -> Result<Self, Error> {
        let kind = config.ca_kind()?;

        let entry = match path {
            Some(path) => CertEntry::new_with_path(path)?,
            None => CertEntry::new(kind)?,
        };
        info!(kind = %kind, path = %entry.path().display(), "SMCertSDK loaded");

        Ok(Self { api: entry, kind, config, handle: None })
    }
}

impl<A: CertApi> CertSession<A> {
    /// 이미 불러온 진입점으로 세션을 생성합니다.
    pub fn new(api: A, config: SessionConfig) -> Result<Self, Error> {
        let kind = config.ca_kind()?;
        Ok(Self { api, kind, config, handle: None })
    }

    pub fn kind(&self) -> CaKind {
        self.kind
    }

    pub fn handle(&self) -> Option<CertHandle> {
        self.handle
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn require_handle(&self) -> Result<CertHandle, Error> {
        self.handle.ok_or(Error::NoHandle)
    }

    fn report<T>(&self, op: &str, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Ok(_) => info!(
                "{} DONE : {:#X}, {}",
                op,
                code::ERR_NONE,
                code::describe(code::ERR_NONE)
            ),
            Err(err) => error!("{} Error : {}", op, err),
        }

        result
    }

    /// SDK 버전을 기록하고 반환합니다.
    pub fn version(&self) -> String {
        let version = self.api.version();
        info!("current SMCertSDK version : {}, {}", self.kind, version);

        version
    }

    /// SDK 전역 초기화를 수행합니다.
    pub fn init(&self) -> Result<(), Error> {
        self.report("SMCertSDK_Init", self.api.init(SDK_LOG_FILE))
    }

    /// SDK 전역 정리를 수행합니다.
    pub fn cleanup(&self) -> Result<(), Error> {
        self.report("SMCertSDK_Clean", self.api.clean())
    }

    /// 설정으로 핸들을 생성합니다.
    pub fn create_handle(&mut self) -> Result<(), Error> {
        let result = HandleConfig::from_session(&self.config)
            .and_then(|config| self.api.new_handle(&config));

        let handle = self.report("SMCertSDK_New", result)?;
        if self.handle.replace(handle).is_some() {
            warn!("previous certificate handle replaced without being freed");
        }

        Ok(())
    }

    /// 핸들을 해제합니다.
    pub fn free_handle(&mut self) -> Result<(), Error> {
        let result = match self.handle.take() {
            Some(handle) => self.api.free_handle(handle),
            None => Err(Error::NoHandle),
        };

        self.report("SMCertSDK_Free", result)
    }

    /// 사용자 인증서를 발급받습니다.
    pub fn enroll(&self) -> Result<(), Error> {
        let result = self.require_handle().and_then(|h| self.api.cert_enroll(h));
        self.report("SMCertSDK_CertEnroll", result)
    }

    /// 현재 장치의 인증서 유효 기간을 연장합니다.
    pub fn delay(&self) -> Result<(), Error> {
        let result = self.require_handle().and_then(|h| self.api.cert_delay(h));
        self.report("SMCertSDK_CertDelay", result)
    }

    /// 서버에 등록된 유효한 인증서를 조회합니다.
    ///
    /// 만료되었거나 폐기된 인증서는 반환되지 않습니다.
    pub fn query(&self) -> Result<Vec<CertRecord>, Error> {
        let result = self.require_handle().and_then(|h| self.api.cert_query(h));
        let certs = self.report("SMCertSDK_CertQuery", result)?;

        if certs.is_empty() {
            info!("user has no certificate");
        }
        for cert in &certs {
            info!(
                "CertID={}, UserID={}, DeviceID={}, CertInfo={}, IsCurrent={}",
                cert.cert_id, cert.user_id, cert.device_id, cert.cert_info, cert.is_current as i32
            );
        }

        Ok(certs)
    }

    /// 인증서를 폐기합니다.
    pub fn revoke(&self, cert_id: &str) -> Result<(), Error> {
        let result = self.require_handle().and_then(|h| self.api.cert_revoke(h, cert_id));
        self.report("SMCertSDK_CertRevoke", result)
    }

    /// PIN을 재설정합니다. PIN은 6자 이상이어야 합니다.
    pub fn reset_pin(&self, new_pin: &str) -> Result<(), Error> {
        let result = if new_pin.chars().count() < MIN_PIN_LEN {
            Err(Error::InvalidInput(format!("PIN must be at least {} characters", MIN_PIN_LEN)))
        } else {
            self.require_handle().and_then(|h| self.api.reset_pin(h, new_pin))
        };

        self.report("SMCertSDK_ResetPin", result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;

    use std::cell::RefCell;

    /// 호출 기록을 남기는 진입점입니다.
    #[derive(Default)]
    pub struct MockCertApi {
        pub calls: RefCell<Vec<String>>,
        pub configs: RefCell<Vec<HandleConfig>>,
        pub certs: Vec<CertRecord>,
        pub fail_with: Option<i32>,
    }

    impl MockCertApi {
        fn call(&self, name: String) -> Result<(), Error> {
            self.calls.borrow_mut().push(name);
            match self.fail_with {
                Some(code) => Err(Error::cert_sdk(code)),
                None => Ok(()),
            }
        }
    }

    impl CertApi for MockCertApi {
        fn version(&self) -> String {
            self.calls.borrow_mut().push("version".into());
            "v6.6.2".into()
        }
        fn init(&self, log_file: &str) -> Result<(), Error> {
            self.call(format!("init {}", log_file))
        }
        fn clean(&self) -> Result<(), Error> {
            self.call("clean".into())
        }
        fn new_handle(&self, config: &HandleConfig) -> Result<CertHandle, Error> {
            self.configs.borrow_mut().push(config.clone());
            self.call("new".into()).map(|_| CertHandle(0x1234))
        }
        fn free_handle(&self, handle: CertHandle) -> Result<(), Error> {
            self.call(format!("free {:#x}", handle.0))
        }
        fn cert_query(&self, handle: CertHandle) -> Result<Vec<CertRecord>, Error> {
            self.call(format!("query {:#x}", handle.0)).map(|_| self.certs.clone())
        }
        fn cert_enroll(&self, handle: CertHandle) -> Result<(), Error> {
            self.call(format!("enroll {:#x}", handle.0))
        }
        fn cert_delay(&self, handle: CertHandle) -> Result<(), Error> {
            self.call(format!("delay {:#x}", handle.0))
        }
        fn cert_revoke(&self, handle: CertHandle, cert_id: &str) -> Result<(), Error> {
            self.call(format!("revoke {:#x} {}", handle.0, cert_id))
        }
        fn reset_pin(&self, handle: CertHandle, new_pin: &str) -> Result<(), Error> {
            self.call(format!("reset_pin {:#x} {}", handle.0, new_pin))
        }
    }

    pub fn sample_config() -> SessionConfig {
        SessionConfig {
            sm_cert: "smk".into(),
            broker_id: "9999".into(),
            user_id: "000001".into(),
            password: "secret".into(),
            pin: "123456".into(),
            sm_front_addr: "1.2.3.4".into(),
            sm_port: "9999".into(),
            ssl_front_addr: "trade".into(),
            auth_code: "0000000000000000".into(),
            app_id: "client_demo_1.0".into(),
        }
    }

    #[test]
    fn parse_known_kinds() {
        assert_eq!("smk".parse::<CaKind>().unwrap(), CaKind::Smk);
        assert_eq!("sms".parse::<CaKind>().unwrap(), CaKind::Sms);
        assert_eq!("smi".parse::<CaKind>().unwrap(), CaKind::Smi);
    }

    #[test]
    fn reject_unknown_kinds() {
        for kind in ["", "SMK", "smx", "tcp", " smk"] {
            assert!(matches!(kind.parse::<CaKind>(), Err(Error::UnknownCaKind(_))));
        }
    }

    #[test]
    fn library_names() {
        assert_eq!(CaKind::Smk.library_name(), "smk_certsdk");
        assert_eq!(CaKind::Sms.library_name(), "sms_certsdk");
        assert_eq!(CaKind::Smi.library_name(), "smi_certsdk");

        for kind in [CaKind::Smk, CaKind::Sms, CaKind::Smi] {
            let file_name = kind.library_file_name();
            assert!(file_name.to_string_lossy().contains(kind.library_name()));
        }
    }

    #[cfg(windows)]
    #[test]
    fn library_file_names_on_windows() {
        assert_eq!(CaKind::Smk.library_file_name(), "smk_certsdk.dll");
        assert_eq!(CaKind::Sms.library_file_name(), "sms_certsdk.dll");
        assert_eq!(CaKind::Smi.library_file_name(), "smi_certsdk.dll");
    }

    #[test]
    fn open_rejects_unknown_kind_before_loading() {
        let config = SessionConfig { sm_cert: "abc".into(), ..sample_config() };
        assert!(matches!(CertSession::open(config, None), Err(Error::UnknownCaKind(_))));
    }

    #[test]
    fn handle_config_from_session() {
        let config = HandleConfig::from_session(&sample_config()).unwrap();

        assert_eq!(config.broker_name, "");
        assert_eq!(config.cert_socket, -1);
        assert_eq!(config.cert_host, "1.2.3.4");
        assert_eq!(config.cert_port, 9999);
        assert_eq!(config.timeout, Duration::from_millis(300_000));
    }

    #[test]
    fn operations_use_created_handle() {
        let mut session = CertSession::new(MockCertApi::default(), sample_config()).unwrap();

        session.init().unwrap();
        session.create_handle().unwrap();
        session.enroll().unwrap();
        session.delay().unwrap();
        session.revoke("CERT-1").unwrap();
        session.reset_pin("654321").unwrap();
        session.free_handle().unwrap();
        session.cleanup().unwrap();

        assert_eq!(
            *session.api().calls.borrow(),
            vec![
                "init sdk.log",
                "new",
                "enroll 0x1234",
                "delay 0x1234",
                "revoke 0x1234 CERT-1",
                "reset_pin 0x1234 654321",
                "free 0x1234",
                "clean",
            ]
        );
        assert_eq!(session.handle(), None);
    }

    #[test]
    fn operations_without_handle() {
        let mut session = CertSession::new(MockCertApi::default(), sample_config()).unwrap();

        assert!(matches!(session.enroll(), Err(Error::NoHandle)));
        assert!(matches!(session.query(), Err(Error::NoHandle)));
        assert!(matches!(session.free_handle(), Err(Error::NoHandle)));
        assert!(session.api().calls.borrow().is_empty());
    }

    #[test]
    fn invalid_port_fails_before_sdk_call() {
        let config = SessionConfig { sm_port: "99x".into(), ..sample_config() };
        let mut session = CertSession::new(MockCertApi::default(), config).unwrap();

        assert!(matches!(session.create_handle(), Err(Error::InvalidPort(_))));
        assert!(session.api().configs.borrow().is_empty());
    }

    #[test]
    fn short_pin_is_rejected() {
        let mut session = CertSession::new(MockCertApi::default(), sample_config()).unwrap();
        session.create_handle().unwrap();

        assert!(matches!(session.reset_pin("12345"), Err(Error::InvalidInput(_))));
        assert_eq!(*session.api().calls.borrow(), vec!["new"]);
    }

    #[test]
    fn query_returns_records() {
        let api = MockCertApi {
            certs: vec![CertRecord {
                cert_id: "CERT-1".into(),
                user_id: "000001".into(),
                device_id: "DEV-1".into(),
                cert_info: "demo".into(),
                is_current: true,
            }],
            ..Default::default()
        };
        let mut session = CertSession::new(api, sample_config()).unwrap();
        session.create_handle().unwrap();

        let certs = session.query().unwrap();
        assert_eq!(certs.len(), 1);
        assert!(certs[0].is_current);
    }

    #[test]
    fn sdk_errors_are_returned() {
        let api = MockCertApi { fail_with: Some(code::ERR_USER_PASS), ..Default::default() };
        let mut session = CertSession::new(api, sample_config()).unwrap();

        let err = session.create_handle().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(session.handle(), None);
    }
}
