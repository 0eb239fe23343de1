//! Registry value type tags.
//!
//! The numeric tags are passed through to the native layer unmodified, so
//! they must match `winnt.h` exactly.

use std::borrow::Cow;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with unexpanded environment variable references.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings, doubly null-terminated.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Store-defined value type with no standard meaning.
    /// Contains the raw type value.
    Unknown(u32),
}

impl ValueType {
    /// Alias for [`ValueType::Dword`].
    pub const DWORD_LITTLE_ENDIAN: ValueType = ValueType::Dword;

    /// Alias for [`ValueType::Qword`].
    pub const QWORD_LITTLE_ENDIAN: ValueType = ValueType::Qword;

    /// Converts a raw type tag to a value type.
    ///
    /// Tags 0-11 are predefined; anything else is returned as
    /// `ValueType::Unknown` so that the tag survives a round trip.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ValueType::None,
            1 => ValueType::String,
            2 => ValueType::ExpandString,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiString,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            _ => ValueType::Unknown(value),
        }
    }

    /// Returns the raw type tag.
    pub fn as_u32(&self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiString => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(value) => *value,
        }
    }

    /// Returns the `REG_*` name of this value type.
    ///
    /// Only unknown tags allocate.
    pub fn name(&self) -> Cow<'static, str> {
        let name = match self {
            ValueType::None => "REG_NONE",
            ValueType::String => "REG_SZ",
            ValueType::ExpandString => "REG_EXPAND_SZ",
            ValueType::Binary => "REG_BINARY",
            ValueType::Dword => "REG_DWORD",
            ValueType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN",
            ValueType::Link => "REG_LINK",
            ValueType::MultiString => "REG_MULTI_SZ",
            ValueType::ResourceList => "REG_RESOURCE_LIST",
            ValueType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR",
            ValueType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST",
            ValueType::Qword => "REG_QWORD",
            ValueType::Unknown(value) => {
                return Cow::Owned(format!("REG_UNKNOWN_{:#010x}", value))
            }
        };
        Cow::Borrowed(name)
    }
}

impl From<u32> for ValueType {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl From<ValueType> for u32 {
    fn from(value: ValueType) -> Self {
        value.as_u32()
    }
}
