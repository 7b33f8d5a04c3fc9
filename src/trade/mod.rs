// SPDX-License-Identifier: MPL-2.0

//! 거래 API 모듈입니다.
//!
//! 인증서 기반 보안 채널(`smk://` 등)의 프런트에 연결하여 SM 로그인을 한 번
//! 수행합니다. 콜백은 거래 API 내부 스레드에서 호출되며, 대기 중인 호출자에게
//! 채널로 결과를 전달합니다.

mod bridge;
mod raw;
mod session;

pub use self::bridge::{BridgeTraderApi, TraderLibrary};
pub use self::session::{SessionState, TradeSession, POST_LOGIN_DELAY};

#[cfg(test)]
pub(crate) use self::session::tests;

use crate::error::Error;
use crate::response::{RspAuthenticate, RspInfo, RspUserLogin};

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 거래 API의 흐름 파일 경로입니다.
pub const FLOW_PATH: &str = "./flow/";

/// 공개 및 개인 토픽의 재전송 방식
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeType {
    /// 당일 처음부터 재전송
    Restart,
    /// 마지막 수신 이후부터 재전송
    Resume,
    /// 로그인 이후의 데이터만 전송
    Quick,
    /// 전송하지 않음
    None,
}

/// SM 로그인 요청입니다.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReqUserLoginSm {
    pub trading_day: String,
    pub broker_id: String,
    pub user_id: String,
    pub password: String,
    pub user_product_info: String,
    pub interface_product_info: String,
    pub protocol_info: String,
    pub mac_address: String,
    pub one_time_password: String,
    pub client_ip_address: String,
    pub login_remark: String,
    pub client_ip_port: i32,
    pub broker_name: String,
    pub auth_code: String,
    pub app_id: String,
    pub pin: String,
}

impl std::fmt::Debug for ReqUserLoginSm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqUserLoginSm")
            .field("trading_day", &self.trading_day)
            .field("broker_id", &self.broker_id)
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .field("user_product_info", &self.user_product_info)
            .field("client_ip_address", &self.client_ip_address)
            .field("client_ip_port", &self.client_ip_port)
            .field("broker_name", &self.broker_name)
            .field("app_id", &self.app_id)
            .field("pin", &"***")
            .finish_non_exhaustive()
    }
}

/// 거래 API의 콜백을 수신하는 트레이트입니다.
///
/// 모든 함수는 거래 API 내부 스레드에서 호출됩니다.
#[allow(unused_variables)]
pub trait TraderSpi: Send + Sync {
    fn on_front_connected(&self) {}

    fn on_front_disconnected(&self, reason: i32) {}

    fn on_rsp_authenticate(
        &self,
        rsp: Option<&RspAuthenticate>,
        info: Option<&RspInfo>,
        request_id: i32,
        is_last: bool,
    ) {
    }

    fn on_rsp_user_login(
        &self,
        rsp: Option<&RspUserLogin>,
        info: Option<&RspInfo>,
        request_id: i32,
        is_last: bool,
    ) {
    }

    fn on_rsp_error(&self, info: Option<&RspInfo>, request_id: i32, is_last: bool) {}
}

/// 거래 API 클라이언트에 대한 트레이트입니다.
pub trait TraderApi {
    fn register_spi(&mut self, spi: Arc<dyn TraderSpi>);

    fn register_front(&mut self, addr: &str) -> Result<(), Error>;

    fn subscribe_private_topic(&mut self, resume: ResumeType);

    fn subscribe_public_topic(&mut self, resume: ResumeType);

    /// 연결을 시작합니다. 연결 결과는 콜백으로 전달됩니다.
    fn init(&mut self);

    /// 로그인 요청을 보내고 거래 API의 반환값을 그대로 반환합니다. 0은 전송 성공입니다.
    fn req_user_login_sm(&mut self, req: &ReqUserLoginSm, request_id: i32) -> Result<i32, Error>;

    fn release(&mut self);
}
