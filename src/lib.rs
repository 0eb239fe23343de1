//! # Typed Windows Registry Access
//!
//! A typed access layer over the Windows registry: value marshaling and
//! handle lifecycle management on top of a pluggable raw store.
//!
//! ## Features
//!
//! - **Typed values**: `REG_SZ`, `REG_EXPAND_SZ`, `REG_MULTI_SZ`, `REG_DWORD`
//!   (both byte orders), `REG_QWORD` and `REG_BINARY` decoded into [`ParsedValue`]
//! - **Absence is not an error**: missing keys and values come back as `None`,
//!   deletes of missing targets as `false`
//! - **Checked handles**: use after close and double close are detected
//!   deterministically; [`OwnedKey`] closes on drop
//! - **Pass-through flags**: access rights, value type tags and read flags keep
//!   their native bit positions
//!
//! ## Architecture
//!
//! 1. **Codec** ([`codec`]): UTF-16LE strings, multi-strings and fixed-width integers
//! 2. **Handles** ([`handle`]): [`Hkey`] and the predefined roots
//! 3. **Dispatcher** ([`value`]): [`RawValue`] to [`ParsedValue`] by type tag
//! 4. **Facade** ([`registry`]): [`Registry`], the only caller of the [`RawStore`]
//!
//! ```text
//! caller -> Registry -> (handle checks) -> RawStore -> RawValue -> ParsedValue
//! ```
//!
//! ## Value Encoding
//!
//! ```text
//! REG_SZ        "AB"          41 00 42 00 00 00
//! REG_MULTI_SZ  ["a", "bc"]   61 00 00 00 62 00 63 00 00 00 00 00
//! REG_DWORD     0x010203      03 02 01 00
//! REG_QWORD     0x0102        02 01 00 00 00 00 00 00
//! ```
//!
//! ## Examples
//!
//! ### Registering an autorun entry
//!
//! ```no_run
//! use native_reg::{Access, Hkey, OpenKeyOptions, RawStore, Registry, RegistryError};
//!
//! const RUN_KEY: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Run";
//!
//! fn register<S: RawStore>(registry: &Registry<S>, command: &str) -> Result<(), RegistryError> {
//!     let run = registry
//!         .open_key_owned(Hkey::HKCU, RUN_KEY, Access::ALL_ACCESS, OpenKeyOptions::NONE)?
//!         .ok_or_else(|| RegistryError::contract("autorun key missing"))?;
//!     registry.set_string(run.hkey(), Some("my-app"), command)?;
//!     run.close()
//! }
//! ```
//!
//! ### Reading a value by path
//!
//! ```no_run
//! use native_reg::{GetValueFlags, Hkey, ParsedValue, RawStore, Registry, Result};
//!
//! fn temp<S: RawStore>(registry: &Registry<S>) -> Result<()> {
//!     match registry.get_value(Hkey::HKCU, Some("Environment"), Some("TEMP"), GetValueFlags::NO_EXPAND)? {
//!         Some(ParsedValue::ExpandString(s)) => println!("TEMP (unexpanded): {}", s),
//!         Some(other) => println!("TEMP: {}", other),
//!         None => println!("TEMP is not set"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod error;
pub mod flags;
pub mod handle;
pub mod registry;
pub mod store;
pub mod value;
pub mod value_type;

// Re-export main types for convenience
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use flags::{Access, CreateKeyOptions, GetValueFlags, OpenKeyOptions};
pub use handle::{is_valid_handle, Hkey, PredefinedKey};
pub use registry::{OwnedKey, Registry};
pub use store::{KeyInfo, RawStore, Status, StoreResult};
pub use value::{parse_value, ParsedValue, RawValue};
pub use value_type::ValueType;

/// `HKEY_CLASSES_ROOT`.
pub const HKCR: Hkey = Hkey::HKCR;

/// `HKEY_CURRENT_USER`.
pub const HKCU: Hkey = Hkey::HKCU;

/// `HKEY_LOCAL_MACHINE`.
pub const HKLM: Hkey = Hkey::HKLM;

/// `HKEY_USERS`.
pub const HKU: Hkey = Hkey::HKU;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
