// SPDX-License-Identifier: MPL-2.0

//! 인증서 SDK의 반환 코드와 설명입니다.

#![allow(dead_code)]

use lazy_static::lazy_static;
use std::collections::HashMap;

// SDK 에러 코드
pub const ERR_NONE: i32 = 0;
pub const ERR_BASE: i32 = 0x0A00_0000;
pub const ERR_FAILED: i32 = ERR_BASE + 0x001;
pub const ERR_LOCALRETRY: i32 = ERR_BASE + 0x002;

pub const ERR_INTERNAL_UNKNOWN: i32 = ERR_BASE + 0x100;
pub const ERR_INTERNAL_GENKEY: i32 = ERR_BASE + 0x101;
pub const ERR_INTERNAL_DIGEST: i32 = ERR_BASE + 0x102;
pub const ERR_INTERNAL_BASE64: i32 = ERR_BASE + 0x103;
pub const ERR_INTERNAL_RANDOM: i32 = ERR_BASE + 0x104;
pub const ERR_INTERNAL_XTSIGN: i32 = ERR_BASE + 0x105;

pub const ERR_PARAM_NULL: i32 = ERR_BASE + 0x200;
pub const ERR_PARAM_INVALID: i32 = ERR_BASE + 0x201;
pub const ERR_PARAM_BUFFER_SMALL: i32 = ERR_BASE + 0x202;

pub const ERR_NETWORK_CONNECT: i32 = ERR_BASE + 0x300;
pub const ERR_NETWORK_REQUEST: i32 = ERR_BASE + 0x301;
pub const ERR_NETWORK_RESPONSE: i32 = ERR_BASE + 0x302;

pub const ERR_STORE_UNKNOWN: i32 = ERR_BASE + 0x400;
pub const ERR_PIN_INCORRECT: i32 = ERR_BASE + 0x401;
pub const ERR_PIN_LOCKED: i32 = ERR_BASE + 0x402;
pub const ERR_CERT_NOT_EXISTS: i32 = ERR_BASE + 0x403;
pub const ERR_CERT_EXPIRED: i32 = ERR_BASE + 0x404;
pub const ERR_CERT_OVERLIMIT: i32 = ERR_BASE + 0x405;
pub const ERR_CERT_INVALID: i32 = ERR_BASE + 0x406;
pub const ERR_USER_PASS: i32 = ERR_BASE + 0x407;
pub const ERR_PIN_WRONGFORMAT: i32 = ERR_BASE + 0x408;

// SSL 에러 코드 (성공은 SDK와 같은 0)
pub const SSL_ERROR_NONE: i32 = 0;
pub const SSL_ERROR_BASE: i32 = 0x0B00_0000;
pub const SSL_ERROR_SSL: i32 = SSL_ERROR_BASE + 1;
pub const SSL_ERROR_WANT_READ: i32 = SSL_ERROR_BASE + 2;
pub const SSL_ERROR_WANT_WRITE: i32 = SSL_ERROR_BASE + 3;
pub const SSL_ERROR_SYSCALL: i32 = SSL_ERROR_BASE + 5;
pub const SSL_ERROR_ZERO_RETURN: i32 = SSL_ERROR_BASE + 6;
pub const SSL_ERROR_WANT_CONNECT: i32 = SSL_ERROR_BASE + 7;
pub const SSL_ERROR_WANT_ACCEPT: i32 = SSL_ERROR_BASE + 8;

lazy_static! {
    static ref MESSAGE_TBL: HashMap<i32, &'static str> = {
        let mut tbl = HashMap::new();

        tbl.insert(ERR_NONE, "success");
        tbl.insert(ERR_BASE, "error base");
        tbl.insert(ERR_FAILED, "failed");
        tbl.insert(ERR_LOCALRETRY, "retry the asynchronous call locally");

        tbl.insert(ERR_INTERNAL_UNKNOWN, "internal unknown error");
        tbl.insert(ERR_INTERNAL_GENKEY, "failed to generate a key pair");
        tbl.insert(ERR_INTERNAL_DIGEST, "failed to digest");
        tbl.insert(ERR_INTERNAL_BASE64, "failed to encode base64");
        tbl.insert(ERR_INTERNAL_RANDOM, "failed to generate random numbers");
        tbl.insert(ERR_INTERNAL_XTSIGN, "failed to co-sign");

        tbl.insert(ERR_PARAM_NULL, "null parameter");
        tbl.insert(ERR_PARAM_INVALID, "invalid parameter");
        tbl.insert(ERR_PARAM_BUFFER_SMALL, "buffer too small");

        tbl.insert(ERR_NETWORK_CONNECT, "connection error");
        tbl.insert(ERR_NETWORK_REQUEST, "request error");
        tbl.insert(ERR_NETWORK_RESPONSE, "response error");

        tbl.insert(ERR_STORE_UNKNOWN, "unknown storage error");
        tbl.insert(ERR_PIN_INCORRECT, "PIN is incorrect");
        tbl.insert(ERR_PIN_LOCKED, "PIN is locked");
        tbl.insert(ERR_CERT_NOT_EXISTS, "local certificate does not exist");
        tbl.insert(ERR_CERT_EXPIRED, "certificate expired");
        tbl.insert(ERR_CERT_OVERLIMIT, "too many certificates");
        tbl.insert(ERR_CERT_INVALID, "invalid certificate or other undefined error");
        tbl.insert(ERR_USER_PASS, "wrong user name or password");
        tbl.insert(ERR_PIN_WRONGFORMAT, "PIN format is incorrect");

        tbl.insert(SSL_ERROR_SSL, "SSL error");
        tbl.insert(SSL_ERROR_WANT_READ, "read would block");
        tbl.insert(SSL_ERROR_WANT_WRITE, "write would block");
        tbl.insert(SSL_ERROR_SYSCALL, "system call interrupted");
        tbl.insert(SSL_ERROR_ZERO_RETURN, "SSL connection closed");
        tbl.insert(SSL_ERROR_WANT_CONNECT, "connect would block");
        tbl.insert(SSL_ERROR_WANT_ACCEPT, "accept would block");

        tbl
    };
}

/// 반환 코드에 대한 설명을 반환합니다.
///
/// 표에 없는 코드는 `"unknown error"`입니다.
pub fn describe(code: i32) -> &'static str {
    MESSAGE_TBL.get(&code).copied().unwrap_or("unknown error")
}

/// 반환 코드가 성공인지에 대한 여부입니다.
pub fn is_success(code: i32) -> bool {
    code == ERR_NONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_known_codes() {
        assert_eq!(describe(ERR_NONE), "success");
        assert_eq!(describe(SSL_ERROR_NONE), "success");
        assert_eq!(describe(ERR_USER_PASS), "wrong user name or password");
        assert_eq!(describe(SSL_ERROR_ZERO_RETURN), "SSL connection closed");
    }

    #[test]
    fn describe_unknown_code() {
        assert_eq!(describe(-1), "unknown error");
    }

    #[test]
    fn sdk_and_ssl_codes_do_not_collide() {
        assert_eq!(MESSAGE_TBL.len(), 32);
    }
}
