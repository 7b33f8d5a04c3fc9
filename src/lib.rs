// SPDX-License-Identifier: MPL-2.0

//! 선물 거래 게이트웨이용 SM 인증서 관리 및 SM 로그인 라이브러리입니다.
//!
//! 인증서 SDK와 거래 API는 실행 시간에 동적 라이브러리로 불러옵니다.

pub mod app;
pub mod cert;
pub mod config;
pub mod error;
pub mod logging;
pub mod menu;
pub mod response;
pub mod trade;

mod gbk;

pub use self::error::{Error, ErrorKind};
