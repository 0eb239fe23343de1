//! Encoding and decoding of registry value payloads.
//!
//! Text values are stored as UTF-16LE code units. The store does not
//! guarantee that a string was written with its terminating null, so the
//! decoders tolerate a missing terminator and strip at most one.

use crate::error::{RegistryError, Result};
use crate::value_type::ValueType;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use encoding_rs::UTF_16LE;

/// Size of one UTF-16 code unit in bytes.
const UNIT: usize = 2;

/// Encodes a string as null-terminated UTF-16LE.
///
/// # Examples
///
/// ```rust
/// use native_reg::codec::encode_string;
///
/// assert_eq!(encode_string("AB"), vec![b'A', 0, b'B', 0, 0, 0]);
/// ```
pub fn encode_string(value: &str) -> Vec<u8> {
    let mut units: Vec<u16> = value.encode_utf16().collect();
    units.push(0);
    units_to_bytes(&units)
}

/// Decodes a UTF-16LE string, stripping exactly one trailing null when
/// present.
///
/// Embedded nulls and any further trailing nulls are preserved.
///
/// # Errors
///
/// Returns `RegistryError::InvalidUtf16` if the data has an odd length or
/// contains unpaired surrogates.
pub fn decode_string(data: &[u8]) -> Result<String> {
    decode_utf16(strip_null(data))
}

/// Encodes a list of strings as a `REG_MULTI_SZ` payload.
///
/// Entries are separated by a single null and the list is terminated by a
/// double null. An empty list encodes to just the terminator.
///
/// # Errors
///
/// Returns `RegistryError::ContractViolation` if an entry contains a null
/// character, since it would be read back as two entries.
pub fn encode_multi_string<S: AsRef<str>>(values: &[S]) -> Result<Vec<u8>> {
    let mut units = Vec::new();
    for (index, value) in values.iter().enumerate() {
        let value = value.as_ref();
        if value.contains('\0') {
            return Err(RegistryError::contract(format!(
                "multi-string entry {} contains an embedded null",
                index
            )));
        }
        if index > 0 {
            units.push(0);
        }
        units.extend(value.encode_utf16());
    }
    units.extend([0, 0]);
    Ok(units_to_bytes(&units))
}

/// Decodes a `REG_MULTI_SZ` payload into its entries.
///
/// The double-null list terminator is stripped (a lone trailing null is
/// accepted for data written without the final terminator), then the rest
/// is split on single nulls. Empty data decodes to an empty list.
///
/// # Errors
///
/// Returns `RegistryError::InvalidUtf16` if the data is not valid UTF-16LE.
pub fn decode_multi_string(data: &[u8]) -> Result<Vec<String>> {
    if data.len() % UNIT != 0 {
        return Err(RegistryError::InvalidUtf16 { len: data.len() });
    }

    let body = if data.ends_with(&[0, 0, 0, 0]) {
        &data[..data.len() - 2 * UNIT]
    } else {
        strip_null(data)
    };

    if body.is_empty() {
        return Ok(Vec::new());
    }

    Ok(decode_utf16(body)?
        .split('\0')
        .map(str::to_string)
        .collect())
}

/// Encodes a 32-bit integer in little-endian order.
pub fn encode_u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Decodes a little-endian `REG_DWORD` payload.
///
/// # Errors
///
/// Returns `RegistryError::InvalidLength` unless the data is exactly 4 bytes.
pub fn decode_u32_le(data: &[u8]) -> Result<u32> {
    check_len(data, 4, ValueType::Dword)?;
    Ok(LittleEndian::read_u32(data))
}

/// Decodes a big-endian `REG_DWORD_BIG_ENDIAN` payload.
///
/// # Errors
///
/// Returns `RegistryError::InvalidLength` unless the data is exactly 4 bytes.
pub fn decode_u32_be(data: &[u8]) -> Result<u32> {
    check_len(data, 4, ValueType::DwordBigEndian)?;
    Ok(BigEndian::read_u32(data))
}

/// Encodes a 64-bit integer in little-endian order.
pub fn encode_u64_le(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Decodes a little-endian `REG_QWORD` payload.
///
/// # Errors
///
/// Returns `RegistryError::InvalidLength` unless the data is exactly 8 bytes.
pub fn decode_u64_le(data: &[u8]) -> Result<u64> {
    check_len(data, 8, ValueType::Qword)?;
    Ok(LittleEndian::read_u64(data))
}

fn check_len(data: &[u8], expected: usize, value_type: ValueType) -> Result<()> {
    if data.len() != expected {
        return Err(RegistryError::InvalidLength {
            value_type,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Drops one trailing null code unit, if present.
fn strip_null(data: &[u8]) -> &[u8] {
    if data.len() >= UNIT && data.len() % UNIT == 0 && data.ends_with(&[0, 0]) {
        &data[..data.len() - UNIT]
    } else {
        data
    }
}

fn decode_utf16(data: &[u8]) -> Result<String> {
    if data.len() % UNIT != 0 {
        return Err(RegistryError::InvalidUtf16 { len: data.len() });
    }

    // BOM sniffing would silently eat a leading U+FEFF that is part of the value.
    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|decoded| decoded.into_owned())
        .ok_or(RegistryError::InvalidUtf16 { len: data.len() })
}

fn units_to_bytes(units: &[u16]) -> Vec<u8> {
    let mut bytes = vec![0u8; units.len() * UNIT];
    LittleEndian::write_u16_into(units, &mut bytes);
    bytes
}
