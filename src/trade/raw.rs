// SPDX-License-Identifier: MPL-2.0

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_void};

pub const THOST_TERT_RESTART: c_int = 0;
pub const THOST_TERT_RESUME: c_int = 1;
pub const THOST_TERT_QUICK: c_int = 2;
pub const THOST_TERT_NONE: c_int = 3;

#[repr(C)]
pub struct REQ_USER_LOGIN_SM {
    pub trading_day: [c_char; 9],
    pub broker_id: [c_char; 11],
    pub user_id: [c_char; 16],
    pub password: [c_char; 41],
    pub user_product_info: [c_char; 11],
    pub interface_product_info: [c_char; 11],
    pub protocol_info: [c_char; 11],
    pub mac_address: [c_char; 21],
    pub one_time_password: [c_char; 41],
    pub reserve1: [c_char; 16],
    pub login_remark: [c_char; 36],
    pub client_ip_port: c_int,
    pub client_ip_address: [c_char; 33],
    pub broker_name: [c_char; 81],
    pub auth_code: [c_char; 17],
    pub app_id: [c_char; 33],
    pub pin: [c_char; 41],
}

#[repr(C)]
pub struct RSP_USER_LOGIN {
    pub trading_day: [c_char; 9],
    pub login_time: [c_char; 9],
    pub broker_id: [c_char; 11],
    pub user_id: [c_char; 16],
    pub system_name: [c_char; 41],
    pub front_id: c_int,
    pub session_id: c_int,
    pub max_order_ref: [c_char; 13],
    pub shfe_time: [c_char; 9],
    pub dce_time: [c_char; 9],
    pub czce_time: [c_char; 9],
    pub ffex_time: [c_char; 9],
    pub ine_time: [c_char; 9],
}

#[repr(C)]
pub struct RSP_AUTHENTICATE {
    pub broker_id: [c_char; 11],
    pub user_id: [c_char; 16],
    pub user_product_info: [c_char; 11],
    pub app_id: [c_char; 33],
    pub app_type: c_char,
}

#[repr(C)]
pub struct RSP_INFO {
    pub error_id: c_int,
    pub error_msg: [c_char; 81],
}

// 거래 API 브리지에 등록되는 콜백 표입니다. 첫 인자는 등록 시 전달한 컨텍스트입니다.
#[repr(C)]
pub struct SPI_CALLBACKS {
    pub on_front_connected: unsafe extern "C" fn(*mut c_void),
    pub on_front_disconnected: unsafe extern "C" fn(*mut c_void, c_int),
    pub on_rsp_authenticate:
        unsafe extern "C" fn(*mut c_void, *const RSP_AUTHENTICATE, *const RSP_INFO, c_int, bool),
    pub on_rsp_user_login:
        unsafe extern "C" fn(*mut c_void, *const RSP_USER_LOGIN, *const RSP_INFO, c_int, bool),
    pub on_rsp_error: unsafe extern "C" fn(*mut c_void, *const RSP_INFO, c_int, bool),
}

pub type GetApiVersion = unsafe extern "C" fn() -> *const c_char;
pub type Create = unsafe extern "C" fn(*const c_char) -> *mut c_void;
pub type RegisterSpi = unsafe extern "C" fn(*mut c_void, *const SPI_CALLBACKS, *mut c_void);
pub type RegisterFront = unsafe extern "C" fn(*mut c_void, *const c_char);
pub type SubscribeTopic = unsafe extern "C" fn(*mut c_void, c_int);
pub type Init = unsafe extern "C" fn(*mut c_void);
pub type ReqUserLoginSm = unsafe extern "C" fn(*mut c_void, *const REQ_USER_LOGIN_SM, c_int) -> c_int;
pub type Release = unsafe extern "C" fn(*mut c_void);
