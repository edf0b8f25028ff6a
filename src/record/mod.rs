//! Typed scalars and the key/value record built from them.
//!
//! A [`Scalar`] is a tagged union over the five supported types (`INT`,
//! `LONG`, `DOUBLE`, `CHAR`, `STRING`). A [`Record`] pairs two scalars —
//! key and value — and is the atomic unit moved between the memory table,
//! run files, and the catalog.
//!
//! The wire format is hand-rolled on top of [`crate::encoding`], matching
//! the rest of the crate: every record is prefixed with a checksum equal
//! to the byte length of its own serialized body, and every scalar is
//! prefixed with a `u32` type tag.


use std::cmp::Ordering;
use std::fmt;

use crate::encoding::{Decode, Encode, EncodingError};

/// Scalar type tags as they appear on the wire (§6 of the design).
const TAG_INT: u32 = 0;
const TAG_LONG: u32 = 1;
const TAG_DOUBLE: u32 = 2;
const TAG_CHAR: u32 = 3;
const TAG_STRING: u32 = 4;

/// A dynamically-typed scalar: the closed set of key/value types this
/// store supports.
///
/// Ordering and equality follow the total order: numeric variants compare
/// by value after widening to `f64` (so `Int`, `Long`, and `Double` can
/// compare equal across tags), `Char`/`Str` compare lexicographically by
/// UTF-8 bytes, and any numeric scalar sorts strictly before any
/// text scalar.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// IEEE-754 binary64 float.
    Double(f64),
    /// A single Unicode scalar value, carried as a 1-character string on
    /// the wire.
    Char(char),
    /// An arbitrary-length UTF-8 string.
    Str(String),
}

impl Scalar {
    /// The zero value of this scalar's own tag — the "not found" sentinel
    /// (§3, Emptiness).
    pub fn zero_of_same_tag(&self) -> Scalar {
        match self {
            Scalar::Int(_) => Scalar::Int(0),
            Scalar::Long(_) => Scalar::Long(0),
            Scalar::Double(_) => Scalar::Double(0.0),
            Scalar::Char(_) => Scalar::Char('\0'),
            Scalar::Str(_) => Scalar::Str(String::new()),
        }
    }

    /// True iff this scalar equals the zero value of its tag.
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Int(v) => *v == 0,
            Scalar::Long(v) => *v == 0,
            Scalar::Double(v) => *v == 0.0,
            Scalar::Char(v) => *v == '\0',
            Scalar::Str(v) => v.is_empty(),
        }
    }

    fn numeric_value(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(f64::from(*v)),
            Scalar::Long(v) => Some(*v as f64),
            Scalar::Double(v) => Some(*v),
            Scalar::Char(_) | Scalar::Str(_) => None,
        }
    }

    fn tag(&self) -> u32 {
        match self {
            Scalar::Int(_) => TAG_INT,
            Scalar::Long(_) => TAG_LONG,
            Scalar::Double(_) => TAG_DOUBLE,
            Scalar::Char(_) => TAG_CHAR,
            Scalar::Str(_) => TAG_STRING,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (Scalar::Str(a), Scalar::Str(b)) => a.as_bytes().cmp(b.as_bytes()),
                (Scalar::Char(a), Scalar::Char(b)) => {
                    let mut abuf = [0u8; 4];
                    let mut bbuf = [0u8; 4];
                    a.encode_utf8(&mut abuf)
                        .as_bytes()
                        .cmp(b.encode_utf8(&mut bbuf).as_bytes())
                }
                (Scalar::Str(a), Scalar::Char(b)) => {
                    let mut bbuf = [0u8; 4];
                    a.as_bytes().cmp(b.encode_utf8(&mut bbuf).as_bytes())
                }
                (Scalar::Char(a), Scalar::Str(b)) => {
                    let mut abuf = [0u8; 4];
                    a.encode_utf8(&mut abuf).as_bytes().cmp(b.as_bytes())
                }
                _ => unreachable!("numeric pairs are handled above"),
            },
        }
    }
}

impl fmt::Display for Scalar {
    /// Bounded rendering for log lines — long strings are truncated so a
    /// pathological key never blows up a log line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY_LEN: usize = 32;
        match self {
            Scalar::Int(v) => write!(f, "INT({v})"),
            Scalar::Long(v) => write!(f, "LONG({v})"),
            Scalar::Double(v) => write!(f, "DOUBLE({v})"),
            Scalar::Char(v) => write!(f, "CHAR({v:?})"),
            Scalar::Str(v) if v.len() > MAX_DISPLAY_LEN => {
                write!(f, "STRING({:?}…, {} bytes)", &v[..MAX_DISPLAY_LEN], v.len())
            }
            Scalar::Str(v) => write!(f, "STRING({v:?})"),
        }
    }
}

impl Encode for Scalar {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.tag().encode_to(buf)?;
        match self {
            Scalar::Int(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Scalar::Long(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Scalar::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
            Scalar::Char(v) => {
                let mut utf8 = [0u8; 4];
                v.encode_utf8(&mut utf8).as_bytes().encode_to(buf)?;
            }
            Scalar::Str(v) => v.encode_to(buf)?,
        }
        Ok(())
    }
}

impl Decode for Scalar {
    fn decode_from(buf: &[u8]) -> Result<(Self, usize), EncodingError> {
        let (tag, mut offset) = u32::decode_from(buf)?;
        match tag {
            TAG_INT => {
                let bytes: [u8; 4] = require_array(buf, offset)?;
                offset += 4;
                Ok((Scalar::Int(i32::from_le_bytes(bytes)), offset))
            }
            TAG_LONG => {
                let bytes: [u8; 8] = require_array(buf, offset)?;
                offset += 8;
                Ok((Scalar::Long(i64::from_le_bytes(bytes)), offset))
            }
            TAG_DOUBLE => {
                let bytes: [u8; 8] = require_array(buf, offset)?;
                offset += 8;
                Ok((Scalar::Double(f64::from_le_bytes(bytes)), offset))
            }
            TAG_CHAR => {
                let (raw, consumed) = Vec::<u8>::decode_from(&buf[offset..])?;
                offset += consumed;
                let s = String::from_utf8(raw)?;
                let mut chars = s.chars();
                let c = chars.next().ok_or_else(|| {
                    EncodingError::Custom("CHAR payload decoded to an empty string".into())
                })?;
                if chars.next().is_some() {
                    return Err(EncodingError::Custom(format!(
                        "CHAR payload decoded to {} codepoints, expected exactly 1",
                        s.chars().count()
                    )));
                }
                Ok((Scalar::Char(c), offset))
            }
            TAG_STRING => {
                let (s, consumed) = String::decode_from(&buf[offset..])?;
                offset += consumed;
                Ok((Scalar::Str(s), offset))
            }
            other => Err(EncodingError::InvalidTag {
                tag: other,
                type_name: "Scalar",
            }),
        }
    }
}

fn require_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], EncodingError> {
    let slice = buf.get(offset..offset + N).ok_or(EncodingError::UnexpectedEof {
        needed: offset + N,
        available: buf.len(),
    })?;
    let mut arr = [0u8; N];
    arr.copy_from_slice(slice);
    Ok(arr)
}

/// An ordered pair `(key, value)`, each independently typed.
///
/// Equality and ordering of a `Record` are defined solely in terms of its
/// `key` — the value is opaque payload. Use [`Record::key`] /
/// [`Record::value`] to destructure, or match on the fields directly.
#[derive(Debug, Clone)]
pub struct Record {
    /// The key scalar.
    pub key: Scalar,
    /// The value scalar.
    pub value: Scalar,
}

impl Record {
    /// Builds a record from a key/value pair. Tag inference happens at
    /// the call site through the [`Scalar`] variant the caller picks —
    /// there is no separate "unsupported tag" rejection path in Rust
    /// since the enum is closed.
    pub fn make(key: Scalar, value: Scalar) -> Record {
        Record { key, value }
    }

    /// The canonical empty record: an `INT(0)` key paired with an
    /// `INT(0)` placeholder value. Used as the "not found" sentinel.
    pub fn empty() -> Record {
        Record {
            key: Scalar::Int(0),
            value: Scalar::Int(0),
        }
    }

    /// True iff this record's key is the zero value of its tag.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl Encode for Record {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodingError> {
        let mut body = Vec::new();
        self.key.encode_to(&mut body)?;
        self.value.encode_to(&mut body)?;
        let checksum = u32::try_from(body.len())
            .map_err(|_| EncodingError::LengthOverflow(format!("record body of {} bytes", body.len())))?;
        checksum.encode_to(buf)?;
        buf.extend_from_slice(&body);
        Ok(())
    }
}

impl Decode for Record {
    fn decode_from(buf: &[u8]) -> Result<(Self, usize), EncodingError> {
        let (checksum, mut offset) = u32::decode_from(buf)?;
        let body_start = offset;
        let (key, consumed) = Scalar::decode_from(&buf[offset..])?;
        offset += consumed;
        let (value, consumed) = Scalar::decode_from(&buf[offset..])?;
        offset += consumed;
        let actual = u32::try_from(offset - body_start)
            .map_err(|_| EncodingError::LengthOverflow("record body exceeds u32::MAX".into()))?;
        if actual != checksum {
            return Err(EncodingError::ChecksumMismatch {
                declared: checksum,
                actual,
            });
        }
        Ok((Record { key, value }, offset))
    }
}
