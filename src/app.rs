// SPDX-License-Identifier: MPL-2.0

//! 인증서 세션과 거래 세션을 메뉴 작업으로 묶는 모듈입니다.

use crate::cert::{CertApi, CertSession};
use crate::config::SessionConfig;
use crate::error::Error;
use crate::menu::Operations;
use crate::trade::{TradeSession, TraderApi, POST_LOGIN_DELAY};

use std::time::Duration;
use tracing::{error, info};

/// 거래 세션의 대기 시간입니다. `None`은 무기한 대기입니다.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeouts {
    pub connect: Option<Duration>,
    pub login: Option<Duration>,
    pub post_login: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { connect: None, login: None, post_login: POST_LOGIN_DELAY }
    }
}

/// 인증서 세션과 거래 API 생성 함수를 가진 응용 프로그램입니다.
///
/// 거래 API는 로그인할 때마다 `trader`로 새로 생성되고 로그인 이후 해제됩니다.
pub struct App<C: CertApi, F> {
    cert: CertSession<C>,
    config: SessionConfig,
    trader: F,
    timeouts: Timeouts,
}

impl<C, A, F> App<C, F>
where
    C: CertApi,
    A: TraderApi,
    F: FnMut() -> Result<A, Error>,
{
    pub fn new(cert: CertSession<C>, config: SessionConfig, trader: F, timeouts: Timeouts) -> Self {
        Self { cert, config, trader, timeouts }
    }

    pub fn cert(&self) -> &CertSession<C> {
        &self.cert
    }

    /// 인증서 SDK 버전을 기록하고 초기화한 뒤 핸들을 생성합니다.
    ///
    /// 실패는 기록만 하며, 이후 작업은 각자의 오류를 반환합니다.
    pub fn startup(&mut self) {
        self.cert.version();
        let _ = self.cert.init();
        let _ = self.cert.create_handle();
    }

    /// 핸들을 해제하고 SDK를 정리합니다.
    pub fn shutdown(&mut self) {
        let _ = self.cert.free_handle();
        let _ = self.cert.cleanup();
    }

    /// 새 거래 세션으로 프런트에 연결하고 SM 로그인을 수행합니다.
    pub fn trade_login(&mut self) -> Result<(), Error> {
        let api = (self.trader)()?;
        let mut session = TradeSession::new(api, self.config.clone())
            .with_post_login_delay(self.timeouts.post_login);

        session.init(self.timeouts.connect)?;
        let outcome = session.req_user_login_sm(self.timeouts.login)?;

        if outcome.is_ok() {
            info!("SM login : {}", outcome);
        } else {
            error!("SM login : {}", outcome);
        }
        session.release();

        Ok(())
    }
}

impl<C, A, F> Operations for App<C, F>
where
    C: CertApi,
    A: TraderApi,
    F: FnMut() -> Result<A, Error>,
{
    fn enroll(&mut self) {
        let _ = self.cert.enroll();
    }

    fn delay(&mut self) {
        let _ = self.cert.delay();
    }

    fn revoke(&mut self, cert_id: &str) {
        let _ = self.cert.revoke(cert_id);
    }

    fn query(&mut self) {
        let _ = self.cert.query();
    }

    fn reset_pin(&mut self, new_pin: &str) {
        let _ = self.cert.reset_pin(new_pin);
    }

    fn version(&mut self) {
        self.cert.version();
    }

    fn login(&mut self) {
        if let Err(err) = self.trade_login() {
            error!("SM login Error : {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{App, Timeouts};
    use crate::cert::tests::{sample_config, MockCertApi};
    use crate::cert::CertSession;
    use crate::error::Error;
    use crate::menu::{Menu, Operations};
    use crate::trade::tests::{MockTrader, Reply};

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn timeouts() -> Timeouts {
        Timeouts {
            connect: Some(Duration::from_secs(5)),
            login: Some(Duration::from_secs(5)),
            post_login: Duration::ZERO,
        }
    }

    fn cert_session() -> CertSession<MockCertApi> {
        CertSession::new(MockCertApi::default(), sample_config()).unwrap()
    }

    #[test]
    fn startup_and_shutdown() {
        let mut app = App::new(
            cert_session(),
            sample_config(),
            || Err::<MockTrader, _>(Error::TraderUnavailable),
            timeouts(),
        );

        app.startup();
        app.shutdown();

        assert_eq!(
            *app.cert().api().calls.borrow(),
            vec!["version", "init sdk.log", "new", "free 0x1234", "clean"]
        );
    }

    #[test]
    fn login_creates_fresh_trader() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let trader_calls = calls.clone();

        let mut app = App::new(
            cert_session(),
            sample_config(),
            move || Ok(MockTrader { calls: trader_calls.clone(), ..Default::default() }),
            timeouts(),
        );

        app.trade_login().unwrap();
        app.trade_login().unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|c| *c == "init").count(), 2);
        assert_eq!(calls.iter().filter(|c| *c == "release").count(), 2);
    }

    #[test]
    fn login_failure_is_returned() {
        let mut app = App::new(
            cert_session(),
            sample_config(),
            || Ok(MockTrader { reply: Reply::Silent, ..Default::default() }),
            Timeouts { login: Some(Duration::from_millis(50)), ..timeouts() },
        );

        assert!(matches!(app.trade_login(), Err(Error::TimedOut)));
    }

    #[test]
    fn missing_trader_is_logged() {
        let mut app = App::new(
            cert_session(),
            sample_config(),
            || Err::<MockTrader, _>(Error::TraderUnavailable),
            timeouts(),
        );

        assert!(matches!(app.trade_login(), Err(Error::TraderUnavailable)));
        app.login();
    }

    #[test]
    fn menu_drives_cert_session() {
        let mut app = App::new(
            cert_session(),
            sample_config(),
            || Ok(MockTrader::default()),
            timeouts(),
        );
        app.startup();

        let mut output = Vec::new();
        Menu::new("1\n3\nCERT-1\n5\n123\n7\n100\n".as_bytes(), &mut output)
            .run(&mut app)
            .unwrap();
        app.shutdown();

        assert_eq!(
            *app.cert().api().calls.borrow(),
            vec![
                "version",
                "init sdk.log",
                "new",
                "enroll 0x1234",
                "revoke 0x1234 CERT-1",
                "free 0x1234",
                "clean",
            ]
        );
    }
}
