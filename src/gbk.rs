// SPDX-License-Identifier: MPL-2.0

use crate::error::Error;

use encoding_rs::GBK;
use std::{borrow::Cow, ffi::CString, os::raw::c_char};

// GBK로 인코딩된 null-terminated 문자열을 포인터에서 참조하여
// UTF-8 문자열로 디코딩합니다. 널 포인터는 빈 문자열입니다.
pub unsafe fn decode_ptr(data: *const c_char) -> String {
    if data.is_null() {
        return String::new();
    }

    let bytes = std::ffi::CStr::from_ptr(data).to_bytes();
    GBK.decode(bytes).0.into_owned()
}

// GBK로 인코딩된 고정 길이 문자 배열을 UTF-8 문자열로 디코딩합니다.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let mut len = data.len();
    for (i, &ch) in data.iter().enumerate() {
        if ch == b'\0' {
            len = i;
            break;
        }
    }

    GBK.decode(&data[0..len]).0
}

// `c_char` 배열을 바이트 슬라이스로 참조합니다.
pub fn as_bytes(data: &[c_char]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, data.len()) }
}

// UTF-8 문자열을 GBK로 인코딩된 null-terminated 문자열로 인코딩합니다.
pub fn encode(text: &str) -> Result<CString, Error> {
    CString::new(GBK.encode(text).0.into_owned())
        .map_err(|_| Error::InvalidInput(format!("{:?} contains a null character", text)))
}

// UTF-8 문자열을 GBK로 인코딩하여 고정 길이 문자 배열에 복사합니다.
//
// 마지막 null 문자를 포함하여 배열에 들어가지 않으면 오류를 반환합니다.
pub fn copy_to(dst: &mut [c_char], text: &str) -> Result<(), Error> {
    let encoded = encode(text)?;
    let bytes = encoded.as_bytes_with_nul();

    if bytes.len() > dst.len() {
        return Err(Error::InvalidInput(format!(
            "{:?} exceeds {} bytes",
            text,
            dst.len() - 1
        )));
    }

    for (d, &b) in dst.iter_mut().zip(bytes) {
        *d = b as c_char;
    }
    for d in dst.iter_mut().skip(bytes.len()) {
        *d = 0;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{as_bytes, copy_to, decode, encode};
    use std::os::raw::c_char;

    #[test]
    fn decode_stops_at_null() {
        assert_eq!(decode(b"9999\0garbage"), "9999");
        assert_eq!(decode(b"no-null"), "no-null");
    }

    #[test]
    fn decode_gbk_text() {
        // "成功"
        assert_eq!(decode(&[0xb3, 0xc9, 0xb9, 0xa6, 0x00]), "成功");
    }

    #[test]
    fn encode_rejects_null() {
        assert!(encode("ab\0c").is_err());
    }

    #[test]
    fn copy_to_fixed_array() {
        let mut buf: [c_char; 6] = [1; 6];
        copy_to(&mut buf, "9999").unwrap();
        assert_eq!(decode(as_bytes(&buf)), "9999");
        assert_eq!(buf[4], 0);
        assert_eq!(buf[5], 0);

        assert!(copy_to(&mut buf, "123456").is_err());
        assert!(copy_to(&mut buf, "12345").is_ok());
    }
}
