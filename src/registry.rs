//! The registry access facade.
//!
//! [`Registry`] is the only component that calls the [`RawStore`]. Each
//! operation checks its arguments first (handles against the set of keys
//! this facade has closed, names and paths for embedded nulls), then makes a
//! single store call and translates the resulting status:
//!
//! - `ERROR_FILE_NOT_FOUND` from open, query and delete calls becomes
//!   `None` or `false`,
//! - `ERROR_ACCESS_DENIED` becomes [`RegistryError::AccessDenied`],
//! - anything else becomes [`RegistryError::Store`].

use crate::codec::{encode_multi_string, encode_string, encode_u32_le, encode_u64_le};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::flags::{Access, CreateKeyOptions, GetValueFlags, OpenKeyOptions};
use crate::handle::Hkey;
use crate::store::{KeyInfo, RawStore, Status, StoreResult};
use crate::value::{parse_value, ParsedValue, RawValue};
use crate::value_type::ValueType;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, trace, warn};

/// Typed access to a registry through a [`RawStore`].
///
/// # Handle ownership
///
/// Handles returned by `create_key`, `open_key`, `open_current_user` and
/// `load_app_key` belong to the caller until passed to
/// [`close_key`](Registry::close_key). The facade remembers closed handles
/// and rejects any later use of them with
/// [`RegistryError::HandleClosed`]; a handle value reissued by the store is
/// accepted again. [`OwnedKey`] closes its handle automatically.
///
/// The closed set holds one entry per handle closed and not yet reissued,
/// so it grows with the number of distinct handle values the store has
/// handed out and retired. Stores that recycle handle values keep it small.
///
/// A single handle must not be used from several threads at once without
/// external synchronization.
///
/// # Examples
///
/// ```no_run
/// use native_reg::{Access, Hkey, OpenKeyOptions, RawStore, Registry, Result};
///
/// fn temp_dir<S: RawStore>(registry: &Registry<S>) -> Result<Option<String>> {
///     let Some(env) = registry.open_key(Hkey::HKCU, "Environment", Access::READ, OpenKeyOptions::NONE)? else {
///         return Ok(None);
///     };
///     let temp = registry.query_value(env, Some("TEMP"));
///     registry.close_key(Some(env))?;
///     Ok(temp?.and_then(|value| value.as_str().map(str::to_string)))
/// }
/// ```
pub struct Registry<S> {
    store: S,
    config: RegistryConfig,
    closed: Mutex<HashSet<Hkey>>,
}

impl<S: RawStore> Registry<S> {
    /// Creates a facade using the detected host configuration.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnsupportedPlatform` if the host has no
    /// registry.
    pub fn new(store: S) -> Result<Self> {
        Self::with_config(store, RegistryConfig::detect())
    }

    /// Creates a facade with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnsupportedPlatform` if the configuration
    /// says the platform has no registry.
    pub fn with_config(store: S, config: RegistryConfig) -> Result<Self> {
        if !config.platform_supported {
            return Err(RegistryError::UnsupportedPlatform);
        }
        debug!(?config, "Registry facade initialized");
        Ok(Self {
            store,
            config,
            closed: Mutex::new(HashSet::new()),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // Key lifecycle

    /// Creates `sub_key` under `root`, or opens it if it already exists.
    ///
    /// # Arguments
    ///
    /// * `root` - An open key or predefined root.
    /// * `sub_key` - Path of the key relative to `root`.
    /// * `access` - Requested access rights for the returned handle.
    /// * `options` - Creation options.
    #[instrument(skip(self))]
    pub fn create_key(
        &self,
        root: Hkey,
        sub_key: &str,
        access: Access,
        options: CreateKeyOptions,
    ) -> Result<Hkey> {
        self.check_handle(root)?;
        check_text("sub_key", sub_key)?;
        let hkey = self
            .store
            .create_key(root, sub_key, options, access)
            .map_err(|status| RegistryError::from_status("create_key", status))?;
        Ok(self.track_opened(hkey))
    }

    /// Opens `sub_key` under `root`.
    ///
    /// Returns `Ok(None)` if the key does not exist. Every other failure,
    /// including missing permission for `access`, is an error.
    #[instrument(skip(self))]
    pub fn open_key(
        &self,
        root: Hkey,
        sub_key: &str,
        access: Access,
        options: OpenKeyOptions,
    ) -> Result<Option<Hkey>> {
        self.check_handle(root)?;
        check_text("sub_key", sub_key)?;
        let opened = absent_if_not_found(
            "open_key",
            self.store.open_key(root, sub_key, options, access),
        )?;
        Ok(opened.map(|hkey| self.track_opened(hkey)))
    }

    /// Opens the root key of the user the calling thread is acting as.
    #[instrument(skip(self))]
    pub fn open_current_user(&self, access: Access) -> Result<Hkey> {
        let hkey = self
            .store
            .open_current_user(access)
            .map_err(|status| RegistryError::from_status("open_current_user", status))?;
        Ok(self.track_opened(hkey))
    }

    /// Loads a hive file as a private application key.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_app_key<P: AsRef<Path>>(&self, path: P, access: Access) -> Result<Option<Hkey>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(RegistryError::contract("hive file path is empty"));
        }
        let loaded = absent_if_not_found("load_app_key", self.store.load_app_key(path, access))?;
        Ok(loaded.map(|hkey| self.track_opened(hkey)))
    }

    /// Closes a handle.
    ///
    /// Closing `None` does nothing, so an optional handle from
    /// [`open_key`](Registry::open_key) can be passed straight through.
    ///
    /// # Errors
    ///
    /// - `RegistryError::ContractViolation` for a predefined root, which is
    ///   never owned by the caller.
    /// - `RegistryError::HandleClosed` if the handle was already closed.
    #[instrument(skip(self))]
    pub fn close_key(&self, hkey: Option<Hkey>) -> Result<()> {
        let Some(hkey) = hkey else {
            return Ok(());
        };
        if hkey.is_predefined() {
            return Err(RegistryError::contract(format!(
                "{} is a predefined root and cannot be closed",
                hkey
            )));
        }
        self.check_handle(hkey)?;
        self.store
            .close_key(hkey)
            .map_err(|status| RegistryError::from_status("close_key", status))?;
        self.closed_set().insert(hkey);
        debug!(%hkey, "Closed key");
        Ok(())
    }

    /// Takes ownership of an open handle so that it is closed on drop.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ContractViolation` for predefined roots and
    /// `RegistryError::HandleClosed` for closed handles.
    pub fn own(&self, hkey: Hkey) -> Result<OwnedKey<'_, S>> {
        if hkey.is_predefined() {
            return Err(RegistryError::contract(format!(
                "{} is a predefined root and cannot be owned",
                hkey
            )));
        }
        self.check_handle(hkey)?;
        Ok(OwnedKey {
            registry: self,
            hkey,
        })
    }

    /// [`create_key`](Registry::create_key) returning an [`OwnedKey`].
    pub fn create_key_owned(
        &self,
        root: Hkey,
        sub_key: &str,
        access: Access,
        options: CreateKeyOptions,
    ) -> Result<OwnedKey<'_, S>> {
        let hkey = self.create_key(root, sub_key, access, options)?;
        Ok(OwnedKey {
            registry: self,
            hkey,
        })
    }

    /// [`open_key`](Registry::open_key) returning an [`OwnedKey`].
    pub fn open_key_owned(
        &self,
        root: Hkey,
        sub_key: &str,
        access: Access,
        options: OpenKeyOptions,
    ) -> Result<Option<OwnedKey<'_, S>>> {
        let opened = self.open_key(root, sub_key, access, options)?;
        Ok(opened.map(|hkey| OwnedKey {
            registry: self,
            hkey,
        }))
    }

    // Enumeration

    /// Returns subkey and value counts for a key.
    #[instrument(skip(self))]
    pub fn key_info(&self, hkey: Hkey) -> Result<KeyInfo> {
        self.check_handle(hkey)?;
        self.store
            .query_info_key(hkey)
            .map_err(|status| RegistryError::from_status("query_info_key", status))
    }

    /// Returns the names of all subkeys of a key, in store order.
    #[instrument(skip(self))]
    pub fn enum_key_names(&self, hkey: Hkey) -> Result<Vec<String>> {
        let info = self.key_info(hkey)?;
        collect_names("enum_key", info.subkey_count, |index| {
            self.store.enum_key(hkey, index)
        })
    }

    /// Returns the names of all named values of a key, in store order.
    ///
    /// The unnamed default value is not listed; read it with
    /// `query_value(hkey, None)`.
    #[instrument(skip(self))]
    pub fn enum_value_names(&self, hkey: Hkey) -> Result<Vec<String>> {
        let info = self.key_info(hkey)?;
        collect_names("enum_value", info.value_count, |index| {
            self.store.enum_value(hkey, index)
        })
    }

    // Reads

    /// Reads a value of `hkey` without interpreting it.
    ///
    /// `None` as the name reads the key's unnamed default value. Returns
    /// `Ok(None)` if the value does not exist.
    #[instrument(skip(self))]
    pub fn query_value_raw(&self, hkey: Hkey, name: Option<&str>) -> Result<Option<RawValue>> {
        self.check_handle(hkey)?;
        let name = name.unwrap_or("");
        check_text("value name", name)?;
        absent_if_not_found("query_value", self.store.query_value(hkey, name))
    }

    /// Reads and parses a value of `hkey`.
    pub fn query_value(&self, hkey: Hkey, name: Option<&str>) -> Result<Option<ParsedValue>> {
        parse_value(self.query_value_raw(hkey, name)?)
    }

    /// Reads a value of `root\sub_key` without interpreting it.
    ///
    /// If `flags` restricts no value type, every type is accepted. Pass
    /// `GetValueFlags::NO_EXPAND` to read `REG_EXPAND_SZ` data as stored.
    #[instrument(skip(self))]
    pub fn get_value_raw(
        &self,
        root: Hkey,
        sub_key: Option<&str>,
        name: Option<&str>,
        flags: GetValueFlags,
    ) -> Result<Option<RawValue>> {
        self.check_handle(root)?;
        let sub_key = sub_key.unwrap_or("");
        let name = name.unwrap_or("");
        check_text("sub_key", sub_key)?;
        check_text("value name", name)?;
        let flags = if flags.intersects(GetValueFlags::RT_ANY) {
            flags
        } else {
            (flags | self.config.default_get_flags).or_any_type()
        };
        absent_if_not_found(
            "get_value",
            self.store.get_value(root, sub_key, name, flags),
        )
    }

    /// Reads and parses a value of `root\sub_key`.
    pub fn get_value(
        &self,
        root: Hkey,
        sub_key: Option<&str>,
        name: Option<&str>,
        flags: GetValueFlags,
    ) -> Result<Option<ParsedValue>> {
        parse_value(self.get_value_raw(root, sub_key, name, flags)?)
    }

    // Writes

    /// Writes raw value data with an explicit type tag.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn set_value(
        &self,
        hkey: Hkey,
        name: Option<&str>,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<()> {
        self.check_handle(hkey)?;
        let name = name.unwrap_or("");
        check_text("value name", name)?;
        self.store
            .set_value(hkey, name, value_type, data)
            .map_err(|status| RegistryError::from_status("set_value", status))
    }

    /// Writes a parsed value in its natural stored form.
    pub fn set_parsed(&self, hkey: Hkey, name: Option<&str>, value: &ParsedValue) -> Result<()> {
        let raw = value.to_raw()?;
        self.set_value(hkey, name, raw.value_type(), raw.data())
    }

    /// Writes a `REG_SZ` value.
    pub fn set_string(&self, hkey: Hkey, name: Option<&str>, value: &str) -> Result<()> {
        self.set_value(hkey, name, ValueType::String, &encode_string(value))
    }

    /// Writes a `REG_EXPAND_SZ` value.
    pub fn set_expand_string(&self, hkey: Hkey, name: Option<&str>, value: &str) -> Result<()> {
        self.set_value(hkey, name, ValueType::ExpandString, &encode_string(value))
    }

    /// Writes a `REG_MULTI_SZ` value.
    pub fn set_multi_string<V: AsRef<str>>(
        &self,
        hkey: Hkey,
        name: Option<&str>,
        values: &[V],
    ) -> Result<()> {
        let data = encode_multi_string(values)?;
        self.set_value(hkey, name, ValueType::MultiString, &data)
    }

    /// Writes a `REG_DWORD` value.
    pub fn set_dword(&self, hkey: Hkey, name: Option<&str>, value: u32) -> Result<()> {
        self.set_value(hkey, name, ValueType::Dword, &encode_u32_le(value))
    }

    /// Writes a `REG_QWORD` value.
    pub fn set_qword(&self, hkey: Hkey, name: Option<&str>, value: u64) -> Result<()> {
        self.set_value(hkey, name, ValueType::Qword, &encode_u64_le(value))
    }

    /// Writes a `REG_BINARY` value.
    pub fn set_binary(&self, hkey: Hkey, name: Option<&str>, value: &[u8]) -> Result<()> {
        self.set_value(hkey, name, ValueType::Binary, value)
    }

    /// Renames `hkey\sub_key` (or `hkey` itself for `None`) to `new_name`.
    #[instrument(skip(self))]
    pub fn rename_key(&self, hkey: Hkey, sub_key: Option<&str>, new_name: &str) -> Result<()> {
        self.check_handle(hkey)?;
        let sub_key = sub_key.unwrap_or("");
        check_text("sub_key", sub_key)?;
        check_text("new_name", new_name)?;
        if new_name.is_empty() {
            return Err(RegistryError::contract("new key name is empty"));
        }
        self.store
            .rename_key(hkey, sub_key, new_name)
            .map_err(|status| RegistryError::from_status("rename_key", status))
    }

    /// Copies `src\sub_key` (or `src` itself for `None`) into `dest`.
    #[instrument(skip(self))]
    pub fn copy_tree(&self, src: Hkey, sub_key: Option<&str>, dest: Hkey) -> Result<()> {
        self.check_handle(src)?;
        self.check_handle(dest)?;
        let sub_key = sub_key.unwrap_or("");
        check_text("sub_key", sub_key)?;
        self.store
            .copy_tree(src, sub_key, dest)
            .map_err(|status| RegistryError::from_status("copy_tree", status))
    }

    // Deletes

    /// Deletes an empty subkey. Returns `false` if it did not exist.
    #[instrument(skip(self))]
    pub fn delete_key(&self, hkey: Hkey, sub_key: &str) -> Result<bool> {
        self.check_handle(hkey)?;
        check_text("sub_key", sub_key)?;
        existed("delete_key", self.store.delete_key(hkey, sub_key))
    }

    /// Deletes a subkey (or all of `hkey`'s contents for `None`) recursively.
    /// Returns `false` if it did not exist.
    #[instrument(skip(self))]
    pub fn delete_tree(&self, hkey: Hkey, sub_key: Option<&str>) -> Result<bool> {
        self.check_handle(hkey)?;
        let sub_key = sub_key.unwrap_or("");
        check_text("sub_key", sub_key)?;
        existed("delete_tree", self.store.delete_tree(hkey, sub_key))
    }

    /// Deletes a value of `hkey`. Returns `false` if it did not exist.
    #[instrument(skip(self))]
    pub fn delete_value(&self, hkey: Hkey, name: Option<&str>) -> Result<bool> {
        self.check_handle(hkey)?;
        let name = name.unwrap_or("");
        check_text("value name", name)?;
        existed("delete_value", self.store.delete_value(hkey, name))
    }

    /// Deletes a value of `hkey\sub_key`. Returns `false` if the key or
    /// value did not exist.
    #[instrument(skip(self))]
    pub fn delete_key_value(&self, hkey: Hkey, sub_key: &str, name: &str) -> Result<bool> {
        self.check_handle(hkey)?;
        check_text("sub_key", sub_key)?;
        check_text("value name", name)?;
        existed(
            "delete_key_value",
            self.store.delete_key_value(hkey, sub_key, name),
        )
    }

    // Short forms

    /// Opens `sub_key` with the configured default access.
    pub fn open(&self, root: Hkey, sub_key: &str) -> Result<Option<Hkey>> {
        self.open_key(root, sub_key, self.config.default_access, OpenKeyOptions::NONE)
    }

    /// Creates `sub_key` with the configured default access.
    pub fn create(&self, root: Hkey, sub_key: &str) -> Result<Hkey> {
        self.create_key(
            root,
            sub_key,
            self.config.default_access,
            CreateKeyOptions::NON_VOLATILE,
        )
    }

    /// Reads and parses a named value; an empty name reads the default value.
    pub fn query(&self, hkey: Hkey, name: &str) -> Result<Option<ParsedValue>> {
        self.query_value(hkey, Some(name))
    }

    /// Same as [`close_key`](Registry::close_key).
    pub fn close(&self, hkey: Option<Hkey>) -> Result<()> {
        self.close_key(hkey)
    }

    // Helpers

    fn closed_set(&self) -> MutexGuard<'_, HashSet<Hkey>> {
        self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_handle(&self, hkey: Hkey) -> Result<()> {
        if self.closed_set().contains(&hkey) {
            return Err(RegistryError::HandleClosed(hkey));
        }
        Ok(())
    }

    /// Records a handle freshly returned by the store.
    fn track_opened(&self, hkey: Hkey) -> Hkey {
        if self.closed_set().remove(&hkey) {
            trace!(%hkey, "Store reissued a previously closed handle");
        }
        debug!(%hkey, "Opened key");
        hkey
    }
}

/// A handle that is closed when dropped.
///
/// Errors from the implicit close are logged; call
/// [`close`](OwnedKey::close) to observe them.
pub struct OwnedKey<'r, S: RawStore> {
    registry: &'r Registry<S>,
    hkey: Hkey,
}

impl<'r, S: RawStore> OwnedKey<'r, S> {
    /// Returns the handle.
    pub fn hkey(&self) -> Hkey {
        self.hkey
    }

    /// Closes the handle, reporting any failure.
    pub fn close(self) -> Result<()> {
        let (registry, hkey) = (self.registry, self.hkey);
        std::mem::forget(self);
        registry.close_key(Some(hkey))
    }

    /// Releases ownership without closing the handle.
    pub fn into_raw(self) -> Hkey {
        let hkey = self.hkey;
        std::mem::forget(self);
        hkey
    }
}

impl<S: RawStore> Drop for OwnedKey<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.registry.close_key(Some(self.hkey)) {
            warn!(hkey = %self.hkey, error = %err, "Failed to close owned key");
        }
    }
}

impl<S: RawStore> std::fmt::Debug for OwnedKey<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OwnedKey").field(&self.hkey).finish()
    }
}

/// Rejects strings the native layer would silently truncate.
fn check_text(what: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(RegistryError::contract(format!(
            "{} contains an embedded null",
            what
        )));
    }
    Ok(())
}

fn absent_if_not_found<T>(operation: &'static str, result: StoreResult<T>) -> Result<Option<T>> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(Status::FILE_NOT_FOUND) => {
            debug!(operation, "Target not found");
            Ok(None)
        }
        Err(status) => Err(RegistryError::from_status(operation, status)),
    }
}

fn existed(operation: &'static str, result: StoreResult<()>) -> Result<bool> {
    absent_if_not_found(operation, result).map(|deleted| deleted.is_some())
}

/// Upper bound on the names preallocated from a store-reported count.
const MAX_PREALLOCATED_NAMES: u32 = 1024;

/// Enumerates names by index until the store reports `NO_MORE_ITEMS`.
///
/// `expected` is only a capacity hint; the store's count is not trusted.
fn collect_names<F>(operation: &'static str, expected: u32, mut next: F) -> Result<Vec<String>>
where
    F: FnMut(u32) -> StoreResult<String>,
{
    let mut names = Vec::with_capacity(expected.min(MAX_PREALLOCATED_NAMES) as usize);
    for index in 0..=u32::MAX {
        match next(index) {
            Ok(name) if name.is_empty() => trace!(index, "Skipping unnamed entry"),
            Ok(name) => names.push(name),
            Err(Status::NO_MORE_ITEMS) => break,
            Err(status) => return Err(RegistryError::from_status(operation, status)),
        }
    }
    trace!(operation, expected, found = names.len(), "Enumeration complete");
    Ok(names)
}
