//! Raw registry values and their parsed representation.

use crate::codec::{
    decode_multi_string, decode_string, decode_u32_be, decode_u32_le, decode_u64_le,
    encode_multi_string, encode_string, encode_u32_le, encode_u64_le,
};
use crate::error::{RegistryError, Result};
use crate::value_type::ValueType;
use std::fmt;

/// Value bytes exactly as stored, tagged with their value type.
///
/// The type tag and data cannot be changed once a value has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Value data type.
    value_type: ValueType,

    /// Value data.
    data: Vec<u8>,
}

impl RawValue {
    /// Creates a raw value.
    pub fn new(value_type: ValueType, data: Vec<u8>) -> Self {
        Self { value_type, data }
    }

    /// Returns the value data type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the value data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the value, returning its data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Parses the value data according to its type.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnsupportedValueType` for types without a
    /// parsing rule (`REG_NONE`, `REG_LINK`, resource lists and unknown
    /// tags), or a decoding error if the data does not fit the type.
    pub fn parse(&self) -> Result<ParsedValue> {
        let data = self.data.as_slice();
        match self.value_type {
            ValueType::String => Ok(ParsedValue::String(decode_string(data)?)),
            ValueType::ExpandString => Ok(ParsedValue::ExpandString(decode_string(data)?)),
            ValueType::Binary => Ok(ParsedValue::Binary(data.to_vec())),
            ValueType::Dword => Ok(ParsedValue::Dword(decode_u32_le(data)?)),
            ValueType::DwordBigEndian => Ok(ParsedValue::DwordBigEndian(decode_u32_be(data)?)),
            ValueType::Qword => Ok(ParsedValue::Qword(decode_u64_le(data)?)),
            ValueType::MultiString => Ok(ParsedValue::MultiString(decode_multi_string(data)?)),
            other => Err(RegistryError::UnsupportedValueType(other)),
        }
    }
}

/// Parses an optional raw value.
///
/// A missing value stays missing: `parse_value(None)` is `Ok(None)`, so
/// "not found" never turns into an error.
pub fn parse_value(value: Option<RawValue>) -> Result<Option<ParsedValue>> {
    value.as_ref().map(RawValue::parse).transpose()
}

/// Parsed registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParsedValue {
    /// String value.
    String(String),

    /// Expandable string value, environment references left as stored.
    ExpandString(String),

    /// Binary data.
    Binary(Vec<u8>),

    /// 32-bit integer.
    Dword(u32),

    /// 32-bit big-endian integer.
    DwordBigEndian(u32),

    /// 64-bit integer.
    Qword(u64),

    /// Multiple strings.
    MultiString(Vec<String>),
}

impl ParsedValue {
    /// Returns the value type this value is stored as.
    pub fn value_type(&self) -> ValueType {
        match self {
            ParsedValue::String(_) => ValueType::String,
            ParsedValue::ExpandString(_) => ValueType::ExpandString,
            ParsedValue::Binary(_) => ValueType::Binary,
            ParsedValue::Dword(_) => ValueType::Dword,
            ParsedValue::DwordBigEndian(_) => ValueType::DwordBigEndian,
            ParsedValue::Qword(_) => ValueType::Qword,
            ParsedValue::MultiString(_) => ValueType::MultiString,
        }
    }

    /// Returns the text of a `REG_SZ` or `REG_EXPAND_SZ` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParsedValue::String(s) | ParsedValue::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number held by a DWORD value of either byte order.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParsedValue::Dword(d) | ParsedValue::DwordBigEndian(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the number held by a DWORD or QWORD value.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ParsedValue::Qword(q) => Some(*q),
            _ => self.as_u32().map(u64::from),
        }
    }

    /// Returns the entries of a `REG_MULTI_SZ` value.
    pub fn as_multi_string(&self) -> Option<&[String]> {
        match self {
            ParsedValue::MultiString(strings) => Some(strings),
            _ => None,
        }
    }

    /// Encodes the value back into its stored form.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ContractViolation` if a multi-string entry
    /// contains an embedded null.
    pub fn to_raw(&self) -> Result<RawValue> {
        let data = match self {
            ParsedValue::String(s) | ParsedValue::ExpandString(s) => encode_string(s),
            ParsedValue::Binary(b) => b.clone(),
            ParsedValue::Dword(d) => encode_u32_le(*d).to_vec(),
            ParsedValue::DwordBigEndian(d) => d.to_be_bytes().to_vec(),
            ParsedValue::Qword(q) => encode_u64_le(*q).to_vec(),
            ParsedValue::MultiString(strings) => encode_multi_string(strings)?,
        };
        Ok(RawValue::new(self.value_type(), data))
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedValue::String(s) | ParsedValue::ExpandString(s) => f.write_str(s),
            ParsedValue::Binary(b) => f.write_str(&hex::encode_upper(b)),
            ParsedValue::Dword(d) | ParsedValue::DwordBigEndian(d) => {
                write!(f, "{} (0x{:08X})", d, d)
            }
            ParsedValue::Qword(q) => write!(f, "{} (0x{:016X})", q, q),
            ParsedValue::MultiString(strings) => f.write_str(&strings.join(", ")),
        }
    }
}

impl From<&str> for ParsedValue {
    fn from(value: &str) -> Self {
        ParsedValue::String(value.to_string())
    }
}

impl From<String> for ParsedValue {
    fn from(value: String) -> Self {
        ParsedValue::String(value)
    }
}

impl From<u32> for ParsedValue {
    fn from(value: u32) -> Self {
        ParsedValue::Dword(value)
    }
}

impl From<u64> for ParsedValue {
    fn from(value: u64) -> Self {
        ParsedValue::Qword(value)
    }
}

impl From<Vec<String>> for ParsedValue {
    fn from(value: Vec<String>) -> Self {
        ParsedValue::MultiString(value)
    }
}

impl From<Vec<u8>> for ParsedValue {
    fn from(value: Vec<u8>) -> Self {
        ParsedValue::Binary(value)
    }
}
