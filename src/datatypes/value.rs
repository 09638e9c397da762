//! Typed parameter values and their wire forms.
//!
//! SMPP bodies are built from four value shapes: fixed-length octet
//! strings, NUL-terminated C-octet strings (plain and fixed-length), and
//! big-endian unsigned integers of 1, 2 or 4 octets. A tagged enum covers
//! all of them; typed accessors pattern-match and report `BadType` on a
//! shape mismatch.

use crate::codec::CodecError;
use bytes::{Buf, BufMut, BytesMut};
use std::fmt;
use std::io::Cursor;

/// A single mandatory or optional parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Fixed-length octet string. The stored length is the declared wire
    /// length; `set` replaces it with the input's length. That elasticity
    /// exists for `short_message`, whose true length is dictated by
    /// `sm_length` during decoding.
    Octet(Vec<u8>),
    /// NUL-terminated string, at most `max` bytes on the wire including
    /// the terminator. `bytes` always includes the terminator.
    CString { bytes: Vec<u8>, max: usize },
    /// NUL-terminated string that is either empty (1 byte, just the NUL)
    /// or exactly `len` bytes on the wire.
    FixedCString { bytes: Vec<u8>, len: usize },
    U8(u8),
    U16(u16),
    U32(u32),
}

/// Natural inputs accepted by [`Value::set`].
#[derive(Clone, Debug)]
pub enum FieldValue {
    Text(String),
    Bytes(Vec<u8>),
    Uint(u32),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        FieldValue::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::Uint(u32::from(v))
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        FieldValue::Uint(u32::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Uint(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Uint(v as u32)
    }
}

impl Value {
    /// Empty octet string of the declared length, zero-filled.
    pub fn octet(len: usize) -> Value {
        Value::Octet(vec![0; len])
    }

    /// Empty C-octet string bounded by `max` total bytes.
    pub fn cstring(max: usize) -> Value {
        Value::CString {
            bytes: vec![0],
            max,
        }
    }

    /// Empty fixed-length C-octet string.
    pub fn fixed_cstring(len: usize) -> Value {
        Value::FixedCString {
            bytes: vec![0],
            len,
        }
    }

    /// Number of bytes this value occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Octet(bytes) => bytes.len(),
            Value::CString { bytes, .. } => bytes.len(),
            Value::FixedCString { bytes, .. } => bytes.len(),
            Value::U8(_) => 1,
            Value::U16(_) => 2,
            Value::U32(_) => 4,
        }
    }

    /// Append the wire form to `buf`.
    pub fn write_into(&self, buf: &mut BytesMut) {
        match self {
            Value::Octet(bytes) => buf.put_slice(bytes),
            Value::CString { bytes, .. } => buf.put_slice(bytes),
            Value::FixedCString { bytes, .. } => buf.put_slice(bytes),
            Value::U8(v) => buf.put_u8(*v),
            Value::U16(v) => buf.put_u16(*v),
            Value::U32(v) => buf.put_u32(*v),
        }
    }

    /// Read the wire form from `buf`, replacing the current content. The
    /// shape (and for octet strings, the declared length) stays as
    /// constructed.
    pub fn read_from(&mut self, buf: &mut Cursor<&[u8]>) -> Result<(), CodecError> {
        match self {
            Value::Octet(bytes) => {
                let want = bytes.len();
                if buf.remaining() < want {
                    return Err(CodecError::ShortBuffer);
                }
                let pos = buf.position() as usize;
                bytes.copy_from_slice(&buf.get_ref()[pos..pos + want]);
                buf.advance(want);
                Ok(())
            }
            Value::CString { bytes, max } => {
                *bytes = read_cstring(buf, *max)?;
                Ok(())
            }
            Value::FixedCString { bytes, len } => {
                let read = read_cstring(buf, *len)?;
                if read.len() != 1 && read.len() != *len {
                    return Err(CodecError::FixedLengthMismatch {
                        actual: read.len(),
                        fixed: *len,
                    });
                }
                *bytes = read;
                Ok(())
            }
            Value::U8(v) => {
                if buf.remaining() < 1 {
                    return Err(CodecError::ShortBuffer);
                }
                *v = buf.get_u8();
                Ok(())
            }
            Value::U16(v) => {
                if buf.remaining() < 2 {
                    return Err(CodecError::ShortBuffer);
                }
                *v = buf.get_u16();
                Ok(())
            }
            Value::U32(v) => {
                if buf.remaining() < 4 {
                    return Err(CodecError::ShortBuffer);
                }
                *v = buf.get_u32();
                Ok(())
            }
        }
    }

    /// Replace the content from a natural typed input. Integer inputs are
    /// truncated to the shape's width; text inputs are validated against
    /// the shape's length rules.
    pub fn set(&mut self, input: impl Into<FieldValue>) -> Result<(), CodecError> {
        match (self, input.into()) {
            (Value::Octet(bytes), FieldValue::Bytes(new)) => {
                *bytes = new;
                Ok(())
            }
            (Value::CString { bytes, max }, FieldValue::Text(text)) => {
                let mut new = text.into_bytes();
                new.push(0);
                if new.len() > *max {
                    return Err(CodecError::LengthExceeded {
                        actual: new.len(),
                        max: *max,
                    });
                }
                *bytes = new;
                Ok(())
            }
            (Value::FixedCString { bytes, len }, FieldValue::Text(text)) => {
                let mut new = text.into_bytes();
                new.push(0);
                if new.len() != 1 && new.len() != *len {
                    return Err(CodecError::FixedLengthMismatch {
                        actual: new.len(),
                        fixed: *len,
                    });
                }
                *bytes = new;
                Ok(())
            }
            (Value::U8(v), FieldValue::Uint(new)) => {
                *v = new as u8;
                Ok(())
            }
            (Value::U16(v), FieldValue::Uint(new)) => {
                *v = new as u16;
                Ok(())
            }
            (Value::U32(v), FieldValue::Uint(new)) => {
                *v = new;
                Ok(())
            }
            _ => Err(CodecError::BadType),
        }
    }

    /// Integer view; only integer shapes qualify.
    pub fn as_u32(&self) -> Result<u32, CodecError> {
        match self {
            Value::U8(v) => Ok(u32::from(*v)),
            Value::U16(v) => Ok(u32::from(*v)),
            Value::U32(v) => Ok(*v),
            _ => Err(CodecError::BadType),
        }
    }

    /// Text view of a C-octet string, NUL terminator stripped.
    pub fn text(&self) -> Result<String, CodecError> {
        match self {
            Value::CString { bytes, .. } | Value::FixedCString { bytes, .. } => {
                Ok(String::from_utf8_lossy(&bytes[..bytes.len() - 1]).into_owned())
            }
            _ => Err(CodecError::BadType),
        }
    }

    /// Raw octet view; only the octet-string shape qualifies.
    pub fn octets(&self) -> Result<&[u8], CodecError> {
        match self {
            Value::Octet(bytes) => Ok(bytes),
            _ => Err(CodecError::BadType),
        }
    }
}

/// Consume bytes up to and including the first NUL. Fails with
/// `ShortBuffer` when no NUL appears in the remaining bytes and with
/// `LengthExceeded` when the terminated run is longer than `max`.
fn read_cstring(buf: &mut Cursor<&[u8]>, max: usize) -> Result<Vec<u8>, CodecError> {
    let pos = buf.position() as usize;
    let rest = &buf.get_ref()[pos..];
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::ShortBuffer)?;
    let total = nul + 1;
    if total > max {
        return Err(CodecError::LengthExceeded { actual: total, max });
    }
    let bytes = rest[..total].to_vec();
    buf.advance(total);
    Ok(bytes)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Octet(bytes) => write!(f, "{bytes:?}"),
            Value::CString { bytes, .. } | Value::FixedCString { bytes, .. } => {
                write!(f, "{}", String::from_utf8_lossy(&bytes[..bytes.len() - 1]))
            }
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(value: &mut Value, data: &[u8]) -> Result<usize, CodecError> {
        let mut cursor = Cursor::new(data);
        value.read_from(&mut cursor)?;
        Ok(cursor.position() as usize)
    }

    #[test]
    fn octet_reads_exact_declared_length() {
        let mut value = Value::octet(4);
        let consumed = read(&mut value, b"abcdef").unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(value.octets().unwrap(), b"abcd");
    }

    #[test]
    fn octet_short_read_fails() {
        let mut value = Value::octet(4);
        assert!(matches!(
            read(&mut value, b"ab"),
            Err(CodecError::ShortBuffer)
        ));
    }

    #[test]
    fn octet_set_is_elastic() {
        let mut value = Value::octet(0);
        value.set(&b"hello"[..]).unwrap();
        assert_eq!(value.encoded_len(), 5);
        assert!(value.set("text").is_err());
        assert!(value.as_u32().is_err());
    }

    #[test]
    fn cstring_round_trip() {
        let mut value = Value::cstring(16);
        let consumed = read(&mut value, b"auto_client\0tail").unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(value.text().unwrap(), "auto_client");
        assert_eq!(value.encoded_len(), 12);

        let mut buf = BytesMut::new();
        value.write_into(&mut buf);
        assert_eq!(buf.as_ref(), b"auto_client\0");
    }

    #[test]
    fn cstring_requires_terminator() {
        let mut value = Value::cstring(16);
        assert!(matches!(
            read(&mut value, b"no terminator"),
            Err(CodecError::ShortBuffer)
        ));
    }

    #[test]
    fn cstring_enforces_max_including_nul() {
        let mut value = Value::cstring(4);
        assert!(read(&mut value, b"abc\0").is_ok());
        let mut value = Value::cstring(4);
        assert!(matches!(
            read(&mut value, b"abcd\0"),
            Err(CodecError::LengthExceeded { actual: 5, max: 4 })
        ));
        assert!(matches!(
            value.set("abcd"),
            Err(CodecError::LengthExceeded { .. })
        ));
    }

    #[test]
    fn fixed_cstring_accepts_empty_or_exact() {
        let mut value = Value::fixed_cstring(17);
        assert!(read(&mut value, b"\0").is_ok());
        assert_eq!(value.text().unwrap(), "");

        let mut value = Value::fixed_cstring(17);
        assert!(read(&mut value, b"201024120604000+\0").is_ok());
        assert_eq!(value.text().unwrap(), "201024120604000+");

        let mut value = Value::fixed_cstring(17);
        assert!(matches!(
            read(&mut value, b"2010\0"),
            Err(CodecError::FixedLengthMismatch {
                actual: 5,
                fixed: 17
            })
        ));
    }

    #[test]
    fn integers_are_big_endian() {
        let mut value = Value::U16(0);
        read(&mut value, &[0x4C, 0xAC]).unwrap();
        assert_eq!(value.as_u32().unwrap(), 0x4CAC);

        let mut value = Value::U32(0);
        read(&mut value, &[0x00, 0x01, 0x00, 0x02]).unwrap();
        assert_eq!(value.as_u32().unwrap(), 0x0001_0002);

        let mut buf = BytesMut::new();
        Value::U16(0x4CAC).write_into(&mut buf);
        assert_eq!(buf.as_ref(), &[0x4C, 0xAC]);
    }

    #[test]
    fn integer_short_reads_fail() {
        assert!(matches!(
            read(&mut Value::U16(0), &[0x01]),
            Err(CodecError::ShortBuffer)
        ));
        assert!(matches!(
            read(&mut Value::U32(0), &[0x01, 0x02, 0x03]),
            Err(CodecError::ShortBuffer)
        ));
    }

    #[test]
    fn integer_set_truncates_wider_input() {
        let mut value = Value::U8(0);
        value.set(0x1234u32).unwrap();
        assert_eq!(value.as_u32().unwrap(), 0x34);

        let mut value = Value::U16(0);
        value.set(0x0001_4CACu32).unwrap();
        assert_eq!(value.as_u32().unwrap(), 0x4CAC);

        assert!(value.set("52").is_err());
    }
}
