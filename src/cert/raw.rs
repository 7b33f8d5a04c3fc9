// SPDX-License-Identifier: MPL-2.0

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_void};

pub type SMCERT_SDK = *mut c_void;

#[repr(C)]
pub struct SMCERT_USER_CONFIG {
    pub broker_id: *const c_char,
    pub user_id: *const c_char,
    pub broker_name: *const c_char,
    pub password: *const c_char,
    pub pin: *const c_char,
    pub cert_socket: c_int,
    pub cert_host: *const c_char,
    pub cert_port: c_int,
    pub timeout_ms: c_int,
}

#[repr(C)]
pub struct SMCERT {
    pub cert_id: *const c_char,
    pub user_id: *const c_char,
    pub device_id: *const c_char,
    pub cert_info: *const c_char,
    pub is_current: c_int,
}

pub type GetVersion = unsafe extern "C" fn() -> *const c_char;
pub type Init = unsafe extern "C" fn(*const c_char) -> c_int;
pub type Clean = unsafe extern "C" fn() -> c_int;
pub type New = unsafe extern "C" fn(*const SMCERT_USER_CONFIG, *mut SMCERT_SDK) -> c_int;
pub type Free = unsafe extern "C" fn(SMCERT_SDK) -> c_int;
pub type CertQuery = unsafe extern "C" fn(SMCERT_SDK, *mut *const SMCERT, *mut c_int) -> c_int;
pub type CertEnroll = unsafe extern "C" fn(SMCERT_SDK) -> c_int;
pub type CertDelay = unsafe extern "C" fn(SMCERT_SDK) -> c_int;
pub type CertRevoke = unsafe extern "C" fn(SMCERT_SDK, *const c_char) -> c_int;
pub type ResetPin = unsafe extern "C" fn(SMCERT_SDK, *const c_char) -> c_int;
