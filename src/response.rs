// SPDX-License-Identifier: MPL-2.0

//! 서버 응답 모듈입니다.
//!
//! 응답의 에러 코드나 메시지가 필요하다면 코드에 아래와 같이 [Message](Message) 트레이트를
//! 추가해야 합니다.
//! ```rust
//! use futsm::response::Message;
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 응답 메시지에 대한 트레이트입니다.
pub trait Message {
    /// 에러 코드를 반환합니다. 0은 정상 처리입니다.
    fn error_id(&self) -> i32;

    /// 에러 메시지를 반환합니다. 메시지가 없는 경우 빈 문자열을 반환합니다.
    fn error_msg(&self) -> &str;

    /// 정상 처리 여부를 반환합니다.
    fn is_ok(&self) -> bool {
        self.error_id() == 0
    }

    /// 처리 실패 여부를 반환합니다.
    fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

/// 응답에 포함된 에러 정보입니다.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RspInfo {
    pub error_id: i32,
    pub error_msg: String,
}

impl Message for RspInfo {
    fn error_id(&self) -> i32 {
        self.error_id
    }
    fn error_msg(&self) -> &str {
        &self.error_msg
    }
}

impl std::fmt::Display for RspInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_id, self.error_msg)
    }
}

/// 로그인 응답입니다.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RspUserLogin {
    pub trading_day: String,
    pub login_time: String,
    pub broker_id: String,
    pub user_id: String,
    pub system_name: String,
    pub front_id: i32,
    pub session_id: i32,
    pub max_order_ref: String,
    pub shfe_time: String,
    pub dce_time: String,
    pub czce_time: String,
    pub ffex_time: String,
    pub ine_time: String,
}

/// 클라이언트 인증 응답입니다.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RspAuthenticate {
    pub broker_id: String,
    pub user_id: String,
    pub user_product_info: String,
    pub app_id: String,
    pub app_type: char,
}

/// 로그인 요청의 대기를 해제한 응답입니다.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LoginOutcome {
    /// 로그인 응답을 수신함. 에러 정보가 있다면 로그인에 실패한 것입니다.
    LoggedIn {
        rsp: Option<RspUserLogin>,
        info: Option<RspInfo>,
        request_id: i32,
    },
    /// 에러 응답을 수신함
    Rejected {
        info: Option<RspInfo>,
        request_id: i32,
    },
    /// 프런트와의 연결이 끊어짐
    Disconnected {
        reason: i32,
    },
}

impl LoginOutcome {
    /// 로그인 성공 여부를 반환합니다.
    pub fn is_ok(&self) -> bool {
        match self {
            Self::LoggedIn { info, .. } => info.as_ref().map_or(true, |info| info.is_ok()),
            _ => false,
        }
    }

    /// 응답에 해당하는 요청 번호를 반환합니다.
    pub fn request_id(&self) -> Option<i32> {
        match self {
            Self::LoggedIn { request_id, .. } | Self::Rejected { request_id, .. } => {
                Some(*request_id)
            }
            Self::Disconnected { .. } => None,
        }
    }
}

impl std::fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedIn { info: Some(info), request_id, .. } if info.is_err() => {
                write!(f, "login failed {} (request {})", info, request_id)
            }
            Self::LoggedIn { request_id, .. } => write!(f, "logged in (request {})", request_id),
            Self::Rejected { info: Some(info), request_id } => {
                write!(f, "rejected {} (request {})", info, request_id)
            }
            Self::Rejected { info: None, request_id } => {
                write!(f, "rejected (request {})", request_id)
            }
            Self::Disconnected { reason } => write!(f, "disconnected ({:#x})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginOutcome, Message, RspInfo};

    #[test]
    fn login_outcome_status() {
        let ok = LoginOutcome::LoggedIn { rsp: None, info: None, request_id: 3 };
        assert!(ok.is_ok());
        assert_eq!(ok.request_id(), Some(3));

        let failed = LoginOutcome::LoggedIn {
            rsp: None,
            info: Some(RspInfo { error_id: 3, error_msg: "invalid login".into() }),
            request_id: 4,
        };
        assert!(!failed.is_ok());
        assert_eq!(failed.to_string(), "login failed [3] invalid login (request 4)");

        let rejected = LoginOutcome::Rejected { info: None, request_id: 5 };
        assert!(!rejected.is_ok());

        let disconnected = LoginOutcome::Disconnected { reason: 0x1001 };
        assert!(!disconnected.is_ok());
        assert_eq!(disconnected.request_id(), None);
        assert_eq!(disconnected.to_string(), "disconnected (0x1001)");
    }

    #[test]
    fn rsp_info_message() {
        let info = RspInfo { error_id: 0, error_msg: "CTP:正确".into() };
        assert!(info.is_ok());
        assert_eq!(info.error_msg(), "CTP:正确");
    }
}
