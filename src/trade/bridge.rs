// SPDX-License-Identifier: MPL-2.0

// 거래 API를 C 함수로 감싼 브리지 라이브러리(`thosttraderapi_c`)를 불러와
// [`TraderApi`]를 구현합니다.

use super::raw::{self, REQ_USER_LOGIN_SM, RSP_AUTHENTICATE, RSP_INFO, RSP_USER_LOGIN, SPI_CALLBACKS};
use super::{ReqUserLoginSm, ResumeType, TraderApi, TraderSpi};
use crate::error::{EntryError, Error};
use crate::gbk;
use crate::response::{RspAuthenticate, RspInfo, RspUserLogin};

use libloading::Library;
use std::ffi::OsString;
use std::os::raw::{c_char, c_int, c_void};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 브리지 라이브러리 이름입니다.
pub const BRIDGE_LIBRARY_NAME: &str = "thosttraderapi_c";

/// 불러온 거래 API 브리지 라이브러리입니다.
///
/// 로그인할 때마다 [`create_api`](Self::create_api)로 새 클라이언트를 생성합니다.
pub struct TraderLibrary {
    get_api_version: raw::GetApiVersion,
    create: raw::Create,
    register_spi: raw::RegisterSpi,
    register_front: raw::RegisterFront,
    subscribe_private_topic: raw::SubscribeTopic,
    subscribe_public_topic: raw::SubscribeTopic,
    init: raw::Init,
    req_user_login_sm: raw::ReqUserLoginSm,
    release: raw::Release,

    lib_path: PathBuf,
    _lib: Library,
}

impl TraderLibrary {
    /// 현재 플랫폼의 기본 브리지 라이브러리 파일명을 반환합니다.
    pub fn default_file_name() -> OsString {
        libloading::library_filename(BRIDGE_LIBRARY_NAME)
    }

    /// 브리지 라이브러리를 불러옵니다. 경로가 없으면 기본 파일명을 사용합니다.
    pub fn load(path: Option<&Path>) -> Result<Self, EntryError> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => PathBuf::from(Self::default_file_name()),
        };

        let lib = unsafe {
            Library::new(&path).map_err(|error| EntryError::Library { path: path.clone(), error })?
        };

        macro_rules! load_sym {
            ($ty:ty, $sym_name:literal) => {
                unsafe { lib.get::<$ty>($sym_name.as_bytes()) }
                    .map(|sym| *sym)
                    .map_err(|error| EntryError::Symbol {
                        symbol: $sym_name.into(),
                        path: path.clone(),
                        error,
                    })
            };
        }

        let get_api_version = load_sym!(raw::GetApiVersion, "TdApi_GetApiVersion")?;
        let create = load_sym!(raw::Create, "TdApi_Create")?;
        let register_spi = load_sym!(raw::RegisterSpi, "TdApi_RegisterSpi")?;
        let register_front = load_sym!(raw::RegisterFront, "TdApi_RegisterFront")?;
        let subscribe_private_topic =
            load_sym!(raw::SubscribeTopic, "TdApi_SubscribePrivateTopic")?;
        let subscribe_public_topic = load_sym!(raw::SubscribeTopic, "TdApi_SubscribePublicTopic")?;
        let init = load_sym!(raw::Init, "TdApi_Init")?;
        let req_user_login_sm = load_sym!(raw::ReqUserLoginSm, "TdApi_ReqUserLoginSM")?;
        let release = load_sym!(raw::Release, "TdApi_Release")?;

        Ok(Self {
            get_api_version,
            create,
            register_spi,
            register_front,
            subscribe_private_topic,
            subscribe_public_topic,
            init,
            req_user_login_sm,
            release,

            lib_path: path,
            _lib: lib,
        })
    }

    pub fn path(&self) -> &Path {
        self.lib_path.as_path()
    }

    /// 거래 API 버전을 반환합니다.
    pub fn api_version(&self) -> String {
        unsafe { gbk::decode_ptr((self.get_api_version)()) }
    }

    /// 지정된 흐름 파일 경로로 클라이언트를 생성합니다.
    pub fn create_api(self: &Arc<Self>, flow_path: &str) -> Result<BridgeTraderApi, Error> {
        let flow_path = gbk::encode(flow_path)?;
        let api = unsafe { (self.create)(flow_path.as_ptr()) };

        if api.is_null() {
            return Err(EntryError::NullObject { symbol: "TdApi_Create".into() }.into());
        }

        Ok(BridgeTraderApi { lib: self.clone(), api, spi: None, released: false })
    }
}

/// 브리지 라이브러리로 생성된 거래 API 클라이언트입니다.
pub struct BridgeTraderApi {
    lib: Arc<TraderLibrary>,
    api: *mut c_void,
    // 브리지에 전달된 컨텍스트 포인터가 가리키는 객체입니다.
    spi: Option<Box<Arc<dyn TraderSpi>>>,
    released: bool,
}

impl TraderApi for BridgeTraderApi {
    fn register_spi(&mut self, spi: Arc<dyn TraderSpi>) {
        let spi = Box::new(spi);
        let ctx = &*spi as *const Arc<dyn TraderSpi> as *mut c_void;

        unsafe { (self.lib.register_spi)(self.api, &CALLBACKS, ctx) };
        self.spi = Some(spi);
    }

    fn register_front(&mut self, addr: &str) -> Result<(), Error> {
        let addr = gbk::encode(addr)?;
        unsafe { (self.lib.register_front)(self.api, addr.as_ptr()) };

        Ok(())
    }

    fn subscribe_private_topic(&mut self, resume: ResumeType) {
        unsafe { (self.lib.subscribe_private_topic)(self.api, resume_code(resume)) }
    }

    fn subscribe_public_topic(&mut self, resume: ResumeType) {
        unsafe { (self.lib.subscribe_public_topic)(self.api, resume_code(resume)) }
    }

    fn init(&mut self) {
        unsafe { (self.lib.init)(self.api) }
    }

    fn req_user_login_sm(&mut self, req: &ReqUserLoginSm, request_id: i32) -> Result<i32, Error> {
        let raw_req = encode_login_req(req)?;
        Ok(unsafe { (self.lib.req_user_login_sm)(self.api, &raw_req, request_id) })
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            unsafe { (self.lib.release)(self.api) };
        }
    }
}

impl Drop for BridgeTraderApi {
    fn drop(&mut self) {
        // 콜백 컨텍스트보다 클라이언트가 먼저 해제되어야 합니다.
        self.release();
        self.spi = None;
    }
}

fn resume_code(resume: ResumeType) -> c_int {
    match resume {
        ResumeType::Restart => raw::THOST_TERT_RESTART,
        ResumeType::Resume => raw::THOST_TERT_RESUME,
        ResumeType::Quick => raw::THOST_TERT_QUICK,
        ResumeType::None => raw::THOST_TERT_NONE,
    }
}

fn encode_login_req(req: &ReqUserLoginSm) -> Result<REQ_USER_LOGIN_SM, Error> {
    let mut raw_req: REQ_USER_LOGIN_SM = unsafe { std::mem::zeroed() };

    gbk::copy_to(&mut raw_req.trading_day, &req.trading_day)?;
    gbk::copy_to(&mut raw_req.broker_id, &req.broker_id)?;
    gbk::copy_to(&mut raw_req.user_id, &req.user_id)?;
    gbk::copy_to(&mut raw_req.password, &req.password)?;
    gbk::copy_to(&mut raw_req.user_product_info, &req.user_product_info)?;
    gbk::copy_to(&mut raw_req.interface_product_info, &req.interface_product_info)?;
    gbk::copy_to(&mut raw_req.protocol_info, &req.protocol_info)?;
    gbk::copy_to(&mut raw_req.mac_address, &req.mac_address)?;
    gbk::copy_to(&mut raw_req.one_time_password, &req.one_time_password)?;
    gbk::copy_to(&mut raw_req.login_remark, &req.login_remark)?;
    gbk::copy_to(&mut raw_req.client_ip_address, &req.client_ip_address)?;
    gbk::copy_to(&mut raw_req.broker_name, &req.broker_name)?;
    gbk::copy_to(&mut raw_req.auth_code, &req.auth_code)?;
    gbk::copy_to(&mut raw_req.app_id, &req.app_id)?;
    gbk::copy_to(&mut raw_req.pin, &req.pin)?;
    raw_req.client_ip_port = req.client_ip_port;

    Ok(raw_req)
}

fn decode(data: &[c_char]) -> String {
    gbk::decode(gbk::as_bytes(data)).into_owned()
}

unsafe fn decode_info(info: *const RSP_INFO) -> Option<RspInfo> {
    let info = info.as_ref()?;
    Some(RspInfo { error_id: info.error_id, error_msg: decode(&info.error_msg) })
}

unsafe fn decode_user_login(rsp: *const RSP_USER_LOGIN) -> Option<RspUserLogin> {
    let rsp = rsp.as_ref()?;
    Some(RspUserLogin {
        trading_day: decode(&rsp.trading_day),
        login_time: decode(&rsp.login_time),
        broker_id: decode(&rsp.broker_id),
        user_id: decode(&rsp.user_id),
        system_name: decode(&rsp.system_name),
        front_id: rsp.front_id,
        session_id: rsp.session_id,
        max_order_ref: decode(&rsp.max_order_ref),
        shfe_time: decode(&rsp.shfe_time),
        dce_time: decode(&rsp.dce_time),
        czce_time: decode(&rsp.czce_time),
        ffex_time: decode(&rsp.ffex_time),
        ine_time: decode(&rsp.ine_time),
    })
}

unsafe fn decode_authenticate(rsp: *const RSP_AUTHENTICATE) -> Option<RspAuthenticate> {
    let rsp = rsp.as_ref()?;
    Some(RspAuthenticate {
        broker_id: decode(&rsp.broker_id),
        user_id: decode(&rsp.user_id),
        user_product_info: decode(&rsp.user_product_info),
        app_id: decode(&rsp.app_id),
        app_type: rsp.app_type as u8 as char,
    })
}

unsafe fn load_spi<'a>(ctx: *mut c_void) -> &'a dyn TraderSpi {
    &**(ctx as *const Arc<dyn TraderSpi>)
}

static CALLBACKS: SPI_CALLBACKS = SPI_CALLBACKS {
    on_front_connected,
    on_front_disconnected,
    on_rsp_authenticate,
    on_rsp_user_login,
    on_rsp_error,
};

unsafe extern "C" fn on_front_connected(ctx: *mut c_void) {
    load_spi(ctx).on_front_connected();
}

unsafe extern "C" fn on_front_disconnected(ctx: *mut c_void, reason: c_int) {
    load_spi(ctx).on_front_disconnected(reason);
}

unsafe extern "C" fn on_rsp_authenticate(
    ctx: *mut c_void,
    rsp: *const RSP_AUTHENTICATE,
    info: *const RSP_INFO,
    request_id: c_int,
    is_last: bool,
) {
    let rsp = decode_authenticate(rsp);
    let info = decode_info(info);
    load_spi(ctx).on_rsp_authenticate(rsp.as_ref(), info.as_ref(), request_id, is_last);
}

unsafe extern "C" fn on_rsp_user_login(
    ctx: *mut c_void,
    rsp: *const RSP_USER_LOGIN,
    info: *const RSP_INFO,
    request_id: c_int,
    is_last: bool,
) {
    let rsp = decode_user_login(rsp);
    let info = decode_info(info);
    load_spi(ctx).on_rsp_user_login(rsp.as_ref(), info.as_ref(), request_id, is_last);
}

unsafe extern "C" fn on_rsp_error(
    ctx: *mut c_void,
    info: *const RSP_INFO,
    request_id: c_int,
    is_last: bool,
) {
    let info = decode_info(info);
    load_spi(ctx).on_rsp_error(info.as_ref(), request_id, is_last);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_login_request() {
        let req = ReqUserLoginSm {
            broker_id: "9999".into(),
            user_id: "000001".into(),
            password: "secret".into(),
            pin: "123456".into(),
            app_id: "client_demo_1.0".into(),
            auth_code: "0000000000000000".into(),
            ..Default::default()
        };

        let raw_req = encode_login_req(&req).unwrap();
        assert_eq!(decode(&raw_req.broker_id), "9999");
        assert_eq!(decode(&raw_req.user_id), "000001");
        assert_eq!(decode(&raw_req.app_id), "client_demo_1.0");
        assert_eq!(decode(&raw_req.auth_code), "0000000000000000");
        assert_eq!(decode(&raw_req.broker_name), "");
        assert_eq!(decode(&raw_req.trading_day), "");
    }

    #[test]
    fn reject_oversized_field() {
        let req = ReqUserLoginSm { broker_id: "123456789012".into(), ..Default::default() };
        assert!(matches!(encode_login_req(&req), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn decode_null_info() {
        assert!(unsafe { decode_info(std::ptr::null()) }.is_none());
    }

    #[test]
    fn missing_bridge_library() {
        let result = TraderLibrary::load(Some(Path::new("./no_such_dir/thosttraderapi_c.dll")));
        assert!(matches!(result, Err(EntryError::Library { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_bridge_symbol() {
        let result = TraderLibrary::load(Some(Path::new("libc.so.6")));
        assert!(matches!(
            result,
            Err(EntryError::Symbol { ref symbol, .. }) if symbol == "TdApi_GetApiVersion"
        ));
    }

    #[cfg(windows)]
    #[test]
    fn missing_bridge_symbol() {
        let result = TraderLibrary::load(Some(Path::new("kernel32.dll")));
        assert!(matches!(
            result,
            Err(EntryError::Symbol { ref symbol, .. }) if symbol == "TdApi_GetApiVersion"
        ));
    }
}
