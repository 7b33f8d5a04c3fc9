// SPDX-License-Identifier: MPL-2.0

//! 일반적인 에러 모듈입니다.

use crate::cert::code;

use std::path::PathBuf;

/// 인증서 SDK 오류 종류에 대한 열거형 객체입니다.
///
/// 자주 발생되는 오류를 좀 더 쉽게 처리할 수 있습니다.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorKind {
    /// 연결 및 SSL 오류
    Connection,
    /// PIN 오류
    Pin,
    /// 인증서가 없거나 유효하지 않음
    Certificate,
    /// 사용자명 또는 비밀번호 오류
    Authentication,
    /// 인수가 올바르지 않음
    InvalidInput,
    /// SDK 내부 오류
    Internal,
    /// 시간 초과
    TimedOut,
    /// 기타 오류
    Other,
}

impl ErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            code::ERR_NETWORK_CONNECT
            | code::ERR_NETWORK_REQUEST
            | code::ERR_NETWORK_RESPONSE
            | code::SSL_ERROR_SSL
            | code::SSL_ERROR_SYSCALL
            | code::SSL_ERROR_ZERO_RETURN
            | code::SSL_ERROR_WANT_CONNECT => Self::Connection,
            code::ERR_PIN_INCORRECT | code::ERR_PIN_LOCKED | code::ERR_PIN_WRONGFORMAT => {
                Self::Pin
            }
            code::ERR_CERT_NOT_EXISTS
            | code::ERR_CERT_EXPIRED
            | code::ERR_CERT_OVERLIMIT
            | code::ERR_CERT_INVALID => Self::Certificate,
            code::ERR_USER_PASS => Self::Authentication,
            code::ERR_PARAM_NULL | code::ERR_PARAM_INVALID | code::ERR_PARAM_BUFFER_SMALL => {
                Self::InvalidInput
            }
            code::ERR_INTERNAL_UNKNOWN
            | code::ERR_INTERNAL_GENKEY
            | code::ERR_INTERNAL_DIGEST
            | code::ERR_INTERNAL_BASE64
            | code::ERR_INTERNAL_RANDOM
            | code::ERR_INTERNAL_XTSIGN
            | code::ERR_STORE_UNKNOWN => Self::Internal,
            _ => Self::Other,
        }
    }
}

/// 여러 오류에 대한 열거형 객체입니다.
#[derive(Debug)]
pub enum Error {
    /// 인증서 SDK 오류
    CertSdk {
        /// SDK 에러 코드
        code: i32,
        /// 에러 코드 표에서 찾은 설명
        message: &'static str,
    },
    /// 거래 API 요청 오류
    Trade {
        /// 요청 함수의 반환값
        code: i32,
    },
    /// 알 수 없는 인증 기관 종류 (`SMCert`)
    UnknownCaKind(String),
    /// 포트 번호로 변환할 수 없음 (`SMPort`)
    InvalidPort(String),
    /// 인수가 올바르지 않음
    InvalidInput(String),
    /// 인증서 핸들이 생성되지 않았음
    NoHandle,
    /// 거래 API 라이브러리를 사용할 수 없음
    TraderUnavailable,
    /// 프런트와의 연결이 끊어졌음
    Disconnected,
    /// 시간 초과
    TimedOut,
    /// 라이브러리 불러오기 오류
    Entry(EntryError),
    /// 설정 오류
    Config(ConfigError),
}

impl Error {
    /// SDK 에러 코드로 오류를 생성합니다.
    pub fn cert_sdk(code: i32) -> Self {
        Self::CertSdk { code, message: code::describe(code) }
    }

    /// 에러 메시지 종류를 반환합니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CertSdk { code, .. } => ErrorKind::from_code(*code),
            Self::Trade { .. } | Self::Disconnected => ErrorKind::Connection,
            Self::UnknownCaKind(_) | Self::InvalidPort(_) | Self::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            Self::NoHandle => ErrorKind::Certificate,
            Self::TimedOut => ErrorKind::TimedOut,
            Self::TraderUnavailable | Self::Entry(_) | Self::Config(_) => ErrorKind::Other,
        }
    }
}

impl From<EntryError> for Error {
    fn from(err: EntryError) -> Self {
        Self::Entry(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CertSdk { code, message } => {
                write!(f, "{:#X}, {}", code, message)
            }
            Self::Trade { code } => write!(f, "trader request failed: {}", code),
            Self::UnknownCaKind(kind) => write!(f, "unknown SMCert kind: {:?}", kind),
            Self::InvalidPort(port) => write!(f, "invalid SMPort: {:?}", port),
            Self::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
            Self::NoHandle => f.write_str("certificate handle is not created"),
            Self::TraderUnavailable => f.write_str("trader api library is not loaded"),
            Self::Disconnected => f.write_str("front disconnected"),
            Self::TimedOut => f.write_str("request timed out"),
            Self::Entry(err) => {
                write!(f, "entry error: ")?;
                err.fmt(f)
            }
            Self::Config(err) => {
                write!(f, "config error: ")?;
                err.fmt(f)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Entry(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

/// 라이브러리 불러오기 오류에 대한 객체입니다.
#[derive(Debug)]
pub enum EntryError {
    /// 라이브러리 불러오기 오류
    Library {
        /// 라이브러리 경로
        path: PathBuf,
        /// 에러
        error: libloading::Error,
    },
    /// 기호 불러오기 오류
    Symbol {
        /// 기호명
        symbol: String,
        /// 라이브러리 경로
        path: PathBuf,
        /// 에러
        error: libloading::Error,
    },
    /// 라이브러리가 객체를 생성하지 못했음
    NullObject {
        /// 객체를 생성한 기호명
        symbol: String,
    },
}

impl std::fmt::Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Library { path, error } => {
                write!(f, "could not load a library; ")?;
                write!(f, "path: {:?}, error: {}", path, error)
            }
            Self::Symbol { path, symbol, error } => {
                write!(f, "could not load a symbol: {:?}; ", symbol)?;
                write!(f, "path: {:?}, error: {}", path, error)
            }
            Self::NullObject { symbol } => {
                write!(f, "{:?} returned a null object", symbol)
            }
        }
    }
}

impl std::error::Error for EntryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Library { error, .. } => Some(error),
            Self::Symbol { error, .. } => Some(error),
            Self::NullObject { .. } => None,
        }
    }
}

/// 설정 파일을 읽는 과정에서 발생하는 오류입니다.
#[derive(Debug)]
pub enum ConfigError {
    /// 설정 파일 또는 환경 변수 읽기 오류
    Source(config::ConfigError),
    /// 섹션이 누락되었습니다.
    MissingSection(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::Source(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => err.fmt(f),
            Self::MissingSection(section) => write!(f, "missing section: [{}]", section),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::MissingSection(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use crate::cert::code;

    #[test]
    fn cert_sdk_error_uses_code_table() {
        let err = Error::cert_sdk(code::ERR_PIN_LOCKED);

        assert_eq!(err.kind(), ErrorKind::Pin);
        assert_eq!(err.to_string(), format!("{:#X}, PIN is locked", code::ERR_PIN_LOCKED));
    }

    #[test]
    fn unknown_code_is_other() {
        assert_eq!(ErrorKind::from_code(0x7777), ErrorKind::Other);
        assert_eq!(Error::cert_sdk(0x7777).to_string(), "0x7777, unknown error");
    }

    #[test]
    fn kind_of_local_errors() {
        assert_eq!(Error::TimedOut.kind(), ErrorKind::TimedOut);
        assert_eq!(Error::UnknownCaKind("abc".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::NoHandle.kind(), ErrorKind::Certificate);
    }
}
