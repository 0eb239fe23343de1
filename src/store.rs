//! The raw store collaborator.
//!
//! [`RawStore`] is the seam between this crate and whatever actually holds
//! the registry: a bridge to the native Windows API, or a fake in tests.
//! Implementations report native status codes unchanged; the
//! [`Registry`](crate::registry::Registry) facade decides which of them
//! mean "absent" and which are errors.

use crate::flags::{Access, CreateKeyOptions, GetValueFlags, OpenKeyOptions};
use crate::handle::Hkey;
use crate::value::RawValue;
use crate::value_type::ValueType;
use std::fmt;
use std::path::Path;

/// Result of a raw store call.
pub type StoreResult<T> = std::result::Result<T, Status>;

/// Native status code reported by a failed store call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(pub u32);

impl Status {
    /// `ERROR_FILE_NOT_FOUND`: the key or value does not exist.
    pub const FILE_NOT_FOUND: Status = Status(2);

    /// `ERROR_ACCESS_DENIED`
    pub const ACCESS_DENIED: Status = Status(5);

    /// `ERROR_INVALID_HANDLE`: the handle is closed or was never valid.
    pub const INVALID_HANDLE: Status = Status(6);

    /// `ERROR_INVALID_PARAMETER`
    pub const INVALID_PARAMETER: Status = Status(87);

    /// `ERROR_MORE_DATA`: a caller-supplied buffer was too small.
    pub const MORE_DATA: Status = Status(234);

    /// `ERROR_NO_MORE_ITEMS`: enumeration index past the last item.
    pub const NO_MORE_ITEMS: Status = Status(259);

    /// `ERROR_KEY_DELETED`: the key was marked for deletion.
    pub const KEY_DELETED: Status = Status(1018);

    /// Returns the raw code.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Returns the symbolic name for well-known codes.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Status::FILE_NOT_FOUND => Some("ERROR_FILE_NOT_FOUND"),
            Status::ACCESS_DENIED => Some("ERROR_ACCESS_DENIED"),
            Status::INVALID_HANDLE => Some("ERROR_INVALID_HANDLE"),
            Status::INVALID_PARAMETER => Some("ERROR_INVALID_PARAMETER"),
            Status::MORE_DATA => Some("ERROR_MORE_DATA"),
            Status::NO_MORE_ITEMS => Some("ERROR_NO_MORE_ITEMS"),
            Status::KEY_DELETED => Some("ERROR_KEY_DELETED"),
            _ => None,
        }
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Status({})", name),
            None => write!(f, "Status({})", self.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "status {}", self.0),
        }
    }
}

/// Counts a key reports before its children are enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInfo {
    /// Number of subkeys.
    pub subkey_count: u32,

    /// Length of the longest subkey name, in UTF-16 units.
    pub max_subkey_name_len: u32,

    /// Number of values.
    pub value_count: u32,

    /// Length of the longest value name, in UTF-16 units.
    pub max_value_name_len: u32,
}

/// Handle-based primitives of the underlying registry.
///
/// Every method is a single blocking call. Strings are passed exactly as the
/// native API expects them: an empty sub-key addresses the key itself and
/// an empty value name addresses the key's unnamed default value.
/// "Does not exist" must be reported as [`Status::FILE_NOT_FOUND`], and the
/// end of an enumeration as [`Status::NO_MORE_ITEMS`].
pub trait RawStore {
    /// Creates `sub_key` under `parent` (or opens it if it exists).
    fn create_key(
        &self,
        parent: Hkey,
        sub_key: &str,
        options: CreateKeyOptions,
        access: Access,
    ) -> StoreResult<Hkey>;

    /// Opens an existing `sub_key` under `parent`.
    fn open_key(
        &self,
        parent: Hkey,
        sub_key: &str,
        options: OpenKeyOptions,
        access: Access,
    ) -> StoreResult<Hkey>;

    /// Opens the current user's root key for the calling thread's identity.
    fn open_current_user(&self, access: Access) -> StoreResult<Hkey>;

    /// Loads a hive file as a private application key.
    fn load_app_key(&self, file: &Path, access: Access) -> StoreResult<Hkey>;

    /// Returns subkey and value counts for `hkey`.
    fn query_info_key(&self, hkey: Hkey) -> StoreResult<KeyInfo>;

    /// Returns the name of the subkey at `index`.
    fn enum_key(&self, hkey: Hkey, index: u32) -> StoreResult<String>;

    /// Returns the name of the value at `index`.
    fn enum_value(&self, hkey: Hkey, index: u32) -> StoreResult<String>;

    /// Reads a value of `hkey`.
    fn query_value(&self, hkey: Hkey, value_name: &str) -> StoreResult<RawValue>;

    /// Reads a value of `hkey\sub_key`, restricted and expanded per `flags`.
    fn get_value(
        &self,
        hkey: Hkey,
        sub_key: &str,
        value_name: &str,
        flags: GetValueFlags,
    ) -> StoreResult<RawValue>;

    /// Writes a value of `hkey`.
    fn set_value(
        &self,
        hkey: Hkey,
        value_name: &str,
        value_type: ValueType,
        data: &[u8],
    ) -> StoreResult<()>;

    /// Renames `hkey\sub_key` to `new_name`.
    fn rename_key(&self, hkey: Hkey, sub_key: &str, new_name: &str) -> StoreResult<()>;

    /// Copies `src\sub_key` and everything below it into `dest`.
    fn copy_tree(&self, src: Hkey, sub_key: &str, dest: Hkey) -> StoreResult<()>;

    /// Deletes `hkey\sub_key`, which must have no subkeys.
    fn delete_key(&self, hkey: Hkey, sub_key: &str) -> StoreResult<()>;

    /// Deletes `hkey\sub_key` with all its subkeys and values.
    fn delete_tree(&self, hkey: Hkey, sub_key: &str) -> StoreResult<()>;

    /// Deletes a value of `hkey`.
    fn delete_value(&self, hkey: Hkey, value_name: &str) -> StoreResult<()>;

    /// Deletes a value of `hkey\sub_key`.
    fn delete_key_value(&self, hkey: Hkey, sub_key: &str, value_name: &str) -> StoreResult<()>;

    /// Closes a handle returned by this store.
    fn close_key(&self, hkey: Hkey) -> StoreResult<()>;
}

impl<S: RawStore + ?Sized> RawStore for &S {
    fn create_key(
        &self,
        parent: Hkey,
        sub_key: &str,
        options: CreateKeyOptions,
        access: Access,
    ) -> StoreResult<Hkey> {
        (**self).create_key(parent, sub_key, options, access)
    }

    fn open_key(
        &self,
        parent: Hkey,
        sub_key: &str,
        options: OpenKeyOptions,
        access: Access,
    ) -> StoreResult<Hkey> {
        (**self).open_key(parent, sub_key, options, access)
    }

    fn open_current_user(&self, access: Access) -> StoreResult<Hkey> {
        (**self).open_current_user(access)
    }

    fn load_app_key(&self, file: &Path, access: Access) -> StoreResult<Hkey> {
        (**self).load_app_key(file, access)
    }

    fn query_info_key(&self, hkey: Hkey) -> StoreResult<KeyInfo> {
        (**self).query_info_key(hkey)
    }

    fn enum_key(&self, hkey: Hkey, index: u32) -> StoreResult<String> {
        (**self).enum_key(hkey, index)
    }

    fn enum_value(&self, hkey: Hkey, index: u32) -> StoreResult<String> {
        (**self).enum_value(hkey, index)
    }

    fn query_value(&self, hkey: Hkey, value_name: &str) -> StoreResult<RawValue> {
        (**self).query_value(hkey, value_name)
    }

    fn get_value(
        &self,
        hkey: Hkey,
        sub_key: &str,
        value_name: &str,
        flags: GetValueFlags,
    ) -> StoreResult<RawValue> {
        (**self).get_value(hkey, sub_key, value_name, flags)
    }

    fn set_value(
        &self,
        hkey: Hkey,
        value_name: &str,
        value_type: ValueType,
        data: &[u8],
    ) -> StoreResult<()> {
        (**self).set_value(hkey, value_name, value_type, data)
    }

    fn rename_key(&self, hkey: Hkey, sub_key: &str, new_name: &str) -> StoreResult<()> {
        (**self).rename_key(hkey, sub_key, new_name)
    }

    fn copy_tree(&self, src: Hkey, sub_key: &str, dest: Hkey) -> StoreResult<()> {
        (**self).copy_tree(src, sub_key, dest)
    }

    fn delete_key(&self, hkey: Hkey, sub_key: &str) -> StoreResult<()> {
        (**self).delete_key(hkey, sub_key)
    }

    fn delete_tree(&self, hkey: Hkey, sub_key: &str) -> StoreResult<()> {
        (**self).delete_tree(hkey, sub_key)
    }

    fn delete_value(&self, hkey: Hkey, value_name: &str) -> StoreResult<()> {
        (**self).delete_value(hkey, value_name)
    }

    fn delete_key_value(&self, hkey: Hkey, sub_key: &str, value_name: &str) -> StoreResult<()> {
        (**self).delete_key_value(hkey, sub_key, value_name)
    }

    fn close_key(&self, hkey: Hkey) -> StoreResult<()> {
        (**self).close_key(hkey)
    }
}
