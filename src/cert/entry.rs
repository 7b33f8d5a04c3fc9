// SPDX-License-Identifier: MPL-2.0

use super::raw::{self, SMCERT, SMCERT_SDK, SMCERT_USER_CONFIG};
use super::{code, CaKind, CertApi, CertHandle, CertRecord, HandleConfig};
use crate::error::{EntryError, Error};
use crate::gbk;

use libloading::Library;
use std::ffi::CString;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// SDK가 설정 문자열의 포인터를 보관할 수 있으므로 핸들이 해제될 때까지 유지합니다.
struct RetainedConfig {
    _strings: Vec<CString>,
    _raw: Box<SMCERT_USER_CONFIG>,
}

// 포인터는 `_strings`만을 가리키며 함께 이동합니다.
unsafe impl Send for RetainedConfig {}

/// 인증서 SDK 동적 라이브러리의 진입점입니다.
pub struct CertEntry {
    get_version: raw::GetVersion,
    init: raw::Init,
    clean: raw::Clean,
    new: raw::New,
    free: raw::Free,
    cert_query: raw::CertQuery,
    cert_enroll: raw::CertEnroll,
    cert_delay: raw::CertDelay,
    cert_revoke: raw::CertRevoke,
    reset_pin: raw::ResetPin,

    retained: Mutex<Option<RetainedConfig>>,
    lib_path: PathBuf,
    _lib: Library,
}

impl CertEntry {
    fn load_lib(path: &Path) -> Result<Library, EntryError> {
        unsafe {
            Library::new(path).map_err(|error| EntryError::Library { path: path.into(), error })
        }
    }

    fn load_entry(lib: Library, path: &Path) -> Result<Self, EntryError> {
        macro_rules! load_sym {
            ($ty:ty, $sym_name:literal) => {
                unsafe { lib.get::<$ty>($sym_name.as_bytes()) }
                    .map(|sym| *sym)
                    .map_err(|error| EntryError::Symbol {
                        symbol: $sym_name.into(),
                        path: path.into(),
                        error,
                    })
            };
        }

        let get_version = load_sym!(raw::GetVersion, "SMCertSDK_GetVersion")?;
        let init = load_sym!(raw::Init, "SMCertSDK_Init")?;
        let clean = load_sym!(raw::Clean, "SMCertSDK_Clean")?;
        let new = load_sym!(raw::New, "SMCertSDK_New")?;
        let free = load_sym!(raw::Free, "SMCertSDK_Free")?;
        let cert_query = load_sym!(raw::CertQuery, "SMCertSDK_CertQuery")?;
        let cert_enroll = load_sym!(raw::CertEnroll, "SMCertSDK_CertEnroll")?;
        let cert_delay = load_sym!(raw::CertDelay, "SMCertSDK_CertDelay")?;
        let cert_revoke = load_sym!(raw::CertRevoke, "SMCertSDK_CertRevoke")?;
        let reset_pin = load_sym!(raw::ResetPin, "SMCertSDK_ResetPin")?;

        Ok(Self {
            get_version,
            init,
            clean,
            new,
            free,
            cert_query,
            cert_enroll,
            cert_delay,
            cert_revoke,
            reset_pin,

            retained: Mutex::new(None),
            lib_path: path.to_owned(),
            _lib: lib,
        })
    }

    /// 인증 기관 종류에 해당하는 라이브러리를 불러옵니다.
    pub fn new(kind: CaKind) -> Result<Self, EntryError> {
        Self::new_with_path(kind.library_file_name())
    }

    /// 지정된 경로의 라이브러리를 불러옵니다.
    pub fn new_with_path<P: AsRef<Path>>(path: P) -> Result<Self, EntryError> {
        Self::load_entry(Self::load_lib(path.as_ref())?, path.as_ref())
    }

    pub fn path(&self) -> &Path {
        self.lib_path.as_path()
    }

    fn retained(&self) -> MutexGuard<'_, Option<RetainedConfig>> {
        lock_ignoring_poison(&self.retained)
    }
}

// 다른 스레드가 패닉하더라도 보관된 설정은 핸들이 해제될 때까지 유지되어야 합니다.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn check(code: c_int) -> Result<(), Error> {
    if code::is_success(code) {
        Ok(())
    } else {
        Err(Error::cert_sdk(code))
    }
}

fn raw_handle(handle: CertHandle) -> SMCERT_SDK {
    handle.0 as SMCERT_SDK
}

impl CertApi for CertEntry {
    fn version(&self) -> String {
        unsafe { gbk::decode_ptr((self.get_version)()) }
    }

    fn init(&self, log_file: &str) -> Result<(), Error> {
        let log_file = gbk::encode(log_file)?;
        check(unsafe { (self.init)(log_file.as_ptr()) })
    }

    fn clean(&self) -> Result<(), Error> {
        check(unsafe { (self.clean)() })
    }

    fn new_handle(&self, config: &HandleConfig) -> Result<CertHandle, Error> {
        let strings = vec![
            gbk::encode(&config.broker_id)?,
            gbk::encode(&config.user_id)?,
            gbk::encode(&config.broker_name)?,
            gbk::encode(&config.password)?,
            gbk::encode(&config.pin)?,
            gbk::encode(&config.cert_host)?,
        ];

        let raw = Box::new(SMCERT_USER_CONFIG {
            broker_id: strings[0].as_ptr(),
            user_id: strings[1].as_ptr(),
            broker_name: strings[2].as_ptr(),
            password: strings[3].as_ptr(),
            pin: strings[4].as_ptr(),
            cert_socket: config.cert_socket,
            cert_host: strings[5].as_ptr(),
            cert_port: config.cert_port as c_int,
            timeout_ms: config.timeout.as_millis().min(c_int::MAX as u128) as c_int,
        });

        let mut sdk: SMCERT_SDK = std::ptr::null_mut();
        check(unsafe { (self.new)(&*raw, &mut sdk) })?;

        *self.retained() = Some(RetainedConfig { _strings: strings, _raw: raw });

        Ok(CertHandle(sdk as usize))
    }

    fn free_handle(&self, handle: CertHandle) -> Result<(), Error> {
        let result = check(unsafe { (self.free)(raw_handle(handle)) });

        *self.retained() = None;

        result
    }

    fn cert_query(&self, handle: CertHandle) -> Result<Vec<CertRecord>, Error> {
        let mut certs: *const SMCERT = std::ptr::null();
        let mut total: c_int = 0;

        check(unsafe { (self.cert_query)(raw_handle(handle), &mut certs, &mut total) })?;

        if certs.is_null() || total <= 0 {
            return Ok(Vec::new());
        }

        let certs = unsafe { std::slice::from_raw_parts(certs, total as usize) };
        Ok(certs
            .iter()
            .map(|cert| unsafe {
                CertRecord {
                    cert_id: gbk::decode_ptr(cert.cert_id),
                    user_id: gbk::decode_ptr(cert.user_id),
                    device_id: gbk::decode_ptr(cert.device_id),
                    cert_info: gbk::decode_ptr(cert.cert_info),
                    is_current: cert.is_current != 0,
                }
            })
            .collect())
    }

    fn cert_enroll(&self, handle: CertHandle) -> Result<(), Error> {
        check(unsafe { (self.cert_enroll)(raw_handle(handle)) })
    }

    fn cert_delay(&self, handle: CertHandle) -> Result<(), Error> {
        check(unsafe { (self.cert_delay)(raw_handle(handle)) })
    }

    fn cert_revoke(&self, handle: CertHandle, cert_id: &str) -> Result<(), Error> {
        let cert_id = gbk::encode(cert_id)?;
        check(unsafe { (self.cert_revoke)(raw_handle(handle), cert_id.as_ptr()) })
    }

    fn reset_pin(&self, handle: CertHandle, new_pin: &str) -> Result<(), Error> {
        let new_pin = gbk::encode(new_pin)?;
        check(unsafe { (self.reset_pin)(raw_handle(handle), new_pin.as_ptr()) })
    }
}
