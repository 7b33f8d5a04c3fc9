// SPDX-License-Identifier: MPL-2.0

use super::{ReqUserLoginSm, ResumeType, TraderApi, TraderSpi};
use crate::config::SessionConfig;
use crate::error::Error;
use crate::response::{LoginOutcome, Message, RspAuthenticate, RspInfo, RspUserLogin};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 로그인 응답을 받은 이후 반환하기 전까지 대기하는 시간의 기본값입니다.
pub const POST_LOGIN_DELAY: Duration = Duration::from_secs(1);

/// 거래 세션의 연결 상태
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// 연결되지 않음
    Disconnected,
    /// 프런트에 연결됨
    Connected,
    /// 로그인 응답을 기다리는 중
    AwaitingLoginResponse,
}

// 세션과 콜백이 공유하는 상태입니다.
struct Signals {
    state: Mutex<SessionState>,
    connected: (Sender<()>, Receiver<()>),
    outcome: (Sender<LoginOutcome>, Receiver<LoginOutcome>),
}

impl Signals {
    fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Disconnected),
            connected: crossbeam_channel::bounded(1),
            outcome: crossbeam_channel::bounded(1),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn set_state(&self, state: SessionState) {
        *self.state() = state;
    }

    fn notify_connected(&self) {
        let _ = self.connected.0.try_send(());
    }

    fn notify_outcome(&self, outcome: LoginOutcome) {
        if self.outcome.0.try_send(outcome).is_err() {
            debug!("login outcome dropped; previous outcome not consumed");
        }
    }
}

fn drain<T>(rx: &Receiver<T>) {
    while rx.try_recv().is_ok() {}
}

fn wait<T>(rx: &Receiver<T>, timeout: Option<Duration>) -> Result<T, Error> {
    match timeout {
        Some(timeout) => rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => Error::TimedOut,
            RecvTimeoutError::Disconnected => Error::Disconnected,
        }),
        None => rx.recv().map_err(|_| Error::Disconnected),
    }
}

fn log_info(info: Option<&RspInfo>) {
    if let Some(info) = info {
        if info.is_ok() {
            info!("ErrorID={}, ErrorMsg={}", info.error_id(), info.error_msg());
        } else {
            error!("ErrorID={}, ErrorMsg={}", info.error_id(), info.error_msg());
        }
    }
}

// 비밀번호, PIN, 인증 코드를 제외한 모든 필드를 기록합니다.
fn log_login_request(req: &ReqUserLoginSm) {
    info!(
        "ReqUserLoginSM : TradingDay={}, BrokerID={}, UserID={}, Password=***",
        req.trading_day, req.broker_id, req.user_id
    );
    info!(
        "UserProductInfo={}, InterfaceProductInfo={}, ProtocolInfo={}, MacAddress={}",
        req.user_product_info, req.interface_product_info, req.protocol_info, req.mac_address
    );
    info!(
        "OneTimePassword={}, ClientIPAddress={}, LoginRemark={}, ClientIPPort={}",
        req.one_time_password, req.client_ip_address, req.login_remark, req.client_ip_port
    );
    info!(
        "BrokerName={}, AuthCode=***, AppID={}, PIN=***",
        req.broker_name, req.app_id
    );
}

// 거래 API에 등록되는 콜백 수신 객체입니다.
struct SessionSpi {
    signals: Arc<Signals>,
}

impl TraderSpi for SessionSpi {
    fn on_front_connected(&self) {
        info!("OnFrontConnected");
        self.signals.set_state(SessionState::Connected);
        self.signals.notify_connected();
    }

    fn on_front_disconnected(&self, reason: i32) {
        warn!("OnFrontDisconnected : {:#x}", reason);
        self.signals.set_state(SessionState::Disconnected);
        self.signals.notify_outcome(LoginOutcome::Disconnected { reason });
    }

    fn on_rsp_authenticate(
        &self,
        rsp: Option<&RspAuthenticate>,
        info: Option<&RspInfo>,
        request_id: i32,
        is_last: bool,
    ) {
        info!("OnRspAuthenticate : request {}, last {}", request_id, is_last);
        if let Some(rsp) = rsp {
            info!(
                "BrokerID={}, UserID={}, UserProductInfo={}, AppID={}, AppType={}",
                rsp.broker_id, rsp.user_id, rsp.user_product_info, rsp.app_id, rsp.app_type
            );
        }
        log_info(info);
    }

    fn on_rsp_user_login(
        &self,
        rsp: Option<&RspUserLogin>,
        info: Option<&RspInfo>,
        request_id: i32,
        is_last: bool,
    ) {
        info!("OnRspUserLogin : request {}, last {}", request_id, is_last);
        if let Some(rsp) = rsp {
            info!(
                "TradingDay={}, LoginTime={}, BrokerID={}, UserID={}, SystemName={}",
                rsp.trading_day, rsp.login_time, rsp.broker_id, rsp.user_id, rsp.system_name
            );
            info!(
                "FrontID={}, SessionID={}, MaxOrderRef={}",
                rsp.front_id, rsp.session_id, rsp.max_order_ref
            );
            info!(
                "SHFETime={}, DCETime={}, CZCETime={}, FFEXTime={}, INETime={}",
                rsp.shfe_time, rsp.dce_time, rsp.czce_time, rsp.ffex_time, rsp.ine_time
            );
        }
        log_info(info);

        self.signals.set_state(SessionState::Connected);
        self.signals.notify_outcome(LoginOutcome::LoggedIn {
            rsp: rsp.cloned(),
            info: info.cloned(),
            request_id,
        });
    }

    fn on_rsp_error(&self, info: Option<&RspInfo>, request_id: i32, is_last: bool) {
        error!("OnRspError : request {}, last {}", request_id, is_last);
        log_info(info);

        let mut state = self.signals.state();
        if *state == SessionState::AwaitingLoginResponse {
            *state = SessionState::Connected;
        }
        drop(state);

        self.signals.notify_outcome(LoginOutcome::Rejected { info: info.cloned(), request_id });
    }
}

/// 거래 API 세션입니다.
///
/// 프런트에 연결한 뒤 SM 로그인 요청을 보내고 응답을 기다립니다. 세션이 소멸될 때
/// 해제되지 않은 클라이언트는 자동으로 해제됩니다.
pub struct TradeSession<A: TraderApi> {
    api: A,
    config: SessionConfig,
    signals: Arc<Signals>,
    request_id: AtomicI32,
    post_login_delay: Duration,
    released: bool,
}

impl<A: TraderApi> TradeSession<A> {
    pub fn new(api: A, config: SessionConfig) -> Self {
        Self {
            api,
            config,
            signals: Arc::new(Signals::new()),
            request_id: AtomicI32::new(0),
            post_login_delay: POST_LOGIN_DELAY,
            released: false,
        }
    }

    /// 로그인 응답 이후 대기 시간을 지정합니다.
    pub fn with_post_login_delay(mut self, delay: Duration) -> Self {
        self.post_login_delay = delay;
        self
    }

    pub fn state(&self) -> SessionState {
        *self.signals.state()
    }

    /// 다음 요청 번호를 반환합니다. 첫 요청 번호는 0입니다.
    pub fn next_request_id(&self) -> i32 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// 콜백과 프런트를 등록하고 연결될 때까지 기다립니다.
    ///
    /// `timeout`이 `None`이면 연결될 때까지 무기한 대기합니다.
    pub fn init(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        let spi = Arc::new(SessionSpi { signals: self.signals.clone() });
        self.api.register_spi(spi);

        let front_addr = self.config.front_addr();
        self.api.register_front(&front_addr)?;
        info!("RegisterFront : {}", front_addr);

        self.api.subscribe_private_topic(ResumeType::Quick);
        self.api.subscribe_public_topic(ResumeType::Quick);

        drain(&self.signals.connected.1);
        self.api.init();
        info!("trader api started, waiting for front connection");

        match wait(&self.signals.connected.1, timeout) {
            Ok(()) => Ok(()),
            Err(err) => {
                error!("front connection failed : {}", err);
                Err(err)
            }
        }
    }

    fn login_request(&self) -> ReqUserLoginSm {
        ReqUserLoginSm {
            broker_id: self.config.broker_id.clone(),
            broker_name: String::new(),
            user_id: self.config.user_id.clone(),
            password: self.config.password.clone(),
            pin: self.config.pin.clone(),
            app_id: self.config.app_id.clone(),
            auth_code: self.config.auth_code.clone(),
            ..Default::default()
        }
    }

    /// SM 로그인 요청을 보내고 응답을 기다립니다.
    ///
    /// 로그인 응답, 에러 응답 또는 연결 끊김 중 먼저 도착한 결과를 반환합니다.
    pub fn req_user_login_sm(&mut self, timeout: Option<Duration>) -> Result<LoginOutcome, Error> {
        drain(&self.signals.outcome.1);

        {
            let mut state = self.signals.state();
            if *state != SessionState::Connected {
                return Err(Error::Disconnected);
            }
            *state = SessionState::AwaitingLoginResponse;
        }

        let req = self.login_request();
        log_login_request(&req);

        let request_id = self.next_request_id();
        let code = match self.api.req_user_login_sm(&req, request_id) {
            Ok(code) => code,
            Err(err) => {
                self.restore_connected();
                return Err(err);
            }
        };

        if code != 0 {
            error!("ReqUserLoginSM : request {}, result {}", request_id, code);
            self.restore_connected();
            return Err(Error::Trade { code });
        }
        info!("ReqUserLoginSM : request {}, result {}", request_id, code);

        let outcome = match wait(&self.signals.outcome.1, timeout) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("login response not received : {}", err);
                self.restore_connected();
                return Err(err);
            }
        };

        std::thread::sleep(self.post_login_delay);
        Ok(outcome)
    }

    fn restore_connected(&self) {
        let mut state = self.signals.state();
        if *state == SessionState::AwaitingLoginResponse {
            *state = SessionState::Connected;
        }
    }

    /// 거래 API 클라이언트를 해제합니다.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.api.release();
            self.signals.set_state(SessionState::Disconnected);
            info!("trader api released");
        }
    }
}

impl<A: TraderApi> Drop for TradeSession<A> {
    fn drop(&mut self) {
        self.release();
    }
}
