//! Registry key handles and the predefined root keys.

use crate::error::RegistryError;
use std::fmt;
use std::num::NonZeroUsize;

/// Opaque reference to an open registry key.
///
/// A handle is either one of the [`PredefinedKey`] roots or a value handed
/// out by the store when a key is created or opened. Two handles are equal
/// when they refer to the same underlying identifier.
///
/// Numeric identifiers must lie strictly between zero and `0xFFFFFFFF`;
/// neither bound is ever a valid handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hkey(NonZeroUsize);

impl Hkey {
    /// `HKEY_CLASSES_ROOT`.
    pub const HKCR: Hkey = PredefinedKey::ClassesRoot.hkey();

    /// `HKEY_CURRENT_USER`.
    pub const HKCU: Hkey = PredefinedKey::CurrentUser.hkey();

    /// `HKEY_LOCAL_MACHINE`.
    pub const HKLM: Hkey = PredefinedKey::LocalMachine.hkey();

    /// `HKEY_USERS`.
    pub const HKU: Hkey = PredefinedKey::Users.hkey();

    /// Creates a handle from a 32-bit numeric identifier.
    ///
    /// Returns `None` for zero and for the all-ones sentinel.
    pub const fn from_raw(id: u32) -> Option<Self> {
        if id == u32::MAX {
            return None;
        }
        match NonZeroUsize::new(id as usize) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Wraps a platform-native handle value produced by a store bridge.
    ///
    /// Returns `None` for null and for `usize::MAX` (`INVALID_HANDLE_VALUE`).
    pub fn from_native(raw: usize) -> Option<Self> {
        if raw == usize::MAX {
            return None;
        }
        NonZeroUsize::new(raw).map(Self)
    }

    /// Returns the underlying identifier.
    pub fn as_raw(&self) -> usize {
        self.0.get()
    }

    /// Returns the predefined root this handle names, if any.
    pub fn predefined(&self) -> Option<PredefinedKey> {
        u32::try_from(self.as_raw())
            .ok()
            .and_then(PredefinedKey::from_u32)
    }

    /// Returns true if this handle is one of the predefined roots.
    pub fn is_predefined(&self) -> bool {
        self.predefined().is_some()
    }
}

impl fmt::Debug for Hkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predefined() {
            Some(root) => write!(f, "Hkey({})", root.name()),
            None => write!(f, "Hkey({:#x})", self.as_raw()),
        }
    }
}

impl fmt::Display for Hkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predefined() {
            Some(root) => f.write_str(root.name()),
            None => write!(f, "{:#x}", self.as_raw()),
        }
    }
}

impl From<PredefinedKey> for Hkey {
    fn from(root: PredefinedKey) -> Self {
        root.hkey()
    }
}

impl TryFrom<u32> for Hkey {
    type Error = RegistryError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::from_raw(id)
            .ok_or_else(|| RegistryError::contract(format!("{:#x} is not a valid HKEY", id)))
    }
}

impl TryFrom<u64> for Hkey {
    type Error = RegistryError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        u32::try_from(id)
            .map_err(|_| RegistryError::contract(format!("{:#x} is not a valid HKEY", id)))
            .and_then(Self::try_from)
    }
}

impl TryFrom<f64> for Hkey {
    type Error = RegistryError;

    /// Accepts only finite integral numbers in the 32-bit handle range, as
    /// produced by dynamic callers that carry handles as plain numbers.
    fn try_from(id: f64) -> Result<Self, Self::Error> {
        if id.fract() != 0.0 || !(1.0..u32::MAX as f64).contains(&id) {
            return Err(RegistryError::contract(format!("{} is not a valid HKEY", id)));
        }
        Self::try_from(id as u32)
    }
}

/// Returns true if `candidate` has the shape of a valid handle.
///
/// # Examples
///
/// ```rust
/// use native_reg::handle::{is_valid_handle, Hkey};
///
/// assert!(is_valid_handle(1u32));
/// assert!(is_valid_handle(Hkey::HKCU));
/// assert!(!is_valid_handle(0u32));
/// assert!(!is_valid_handle(0xFFFF_FFFFu32));
/// assert!(!is_valid_handle(0.1f64));
/// ```
pub fn is_valid_handle<T: TryInto<Hkey>>(candidate: T) -> bool {
    candidate.try_into().is_ok()
}

/// Well-known root keys. These are always open, process-wide, and never
/// closed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PredefinedKey {
    /// `HKEY_CLASSES_ROOT`
    ClassesRoot,
    /// `HKEY_CURRENT_USER`
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`
    LocalMachine,
    /// `HKEY_USERS`
    Users,
    /// `HKEY_PERFORMANCE_DATA`
    PerformanceData,
    /// `HKEY_CURRENT_CONFIG`
    CurrentConfig,
    /// `HKEY_DYN_DATA`
    DynData,
    /// `HKEY_CURRENT_USER_LOCAL_SETTINGS`
    CurrentUserLocalSettings,
    /// `HKEY_PERFORMANCE_TEXT`
    PerformanceText,
    /// `HKEY_PERFORMANCE_NLSTEXT`
    PerformanceNlsText,
}

impl PredefinedKey {
    /// Every predefined root.
    pub const ALL: [PredefinedKey; 10] = [
        PredefinedKey::ClassesRoot,
        PredefinedKey::CurrentUser,
        PredefinedKey::LocalMachine,
        PredefinedKey::Users,
        PredefinedKey::PerformanceData,
        PredefinedKey::CurrentConfig,
        PredefinedKey::DynData,
        PredefinedKey::CurrentUserLocalSettings,
        PredefinedKey::PerformanceText,
        PredefinedKey::PerformanceNlsText,
    ];

    /// Returns the numeric identifier from `winreg.h`.
    pub const fn as_u32(&self) -> u32 {
        match self {
            PredefinedKey::ClassesRoot => 0x8000_0000,
            PredefinedKey::CurrentUser => 0x8000_0001,
            PredefinedKey::LocalMachine => 0x8000_0002,
            PredefinedKey::Users => 0x8000_0003,
            PredefinedKey::PerformanceData => 0x8000_0004,
            PredefinedKey::CurrentConfig => 0x8000_0005,
            PredefinedKey::DynData => 0x8000_0006,
            PredefinedKey::CurrentUserLocalSettings => 0x8000_0007,
            PredefinedKey::PerformanceText => 0x8000_0050,
            PredefinedKey::PerformanceNlsText => 0x8000_0060,
        }
    }

    /// Looks up a predefined root by its numeric identifier.
    pub fn from_u32(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|root| root.as_u32() == id)
    }

    /// Returns the handle for this root.
    pub const fn hkey(&self) -> Hkey {
        match NonZeroUsize::new(self.as_u32() as usize) {
            Some(raw) => Hkey(raw),
            None => panic!("predefined key identifiers are non-zero"),
        }
    }

    /// Returns the `HKEY_*` name.
    pub const fn name(&self) -> &'static str {
        match self {
            PredefinedKey::ClassesRoot => "HKEY_CLASSES_ROOT",
            PredefinedKey::CurrentUser => "HKEY_CURRENT_USER",
            PredefinedKey::LocalMachine => "HKEY_LOCAL_MACHINE",
            PredefinedKey::Users => "HKEY_USERS",
            PredefinedKey::PerformanceData => "HKEY_PERFORMANCE_DATA",
            PredefinedKey::CurrentConfig => "HKEY_CURRENT_CONFIG",
            PredefinedKey::DynData => "HKEY_DYN_DATA",
            PredefinedKey::CurrentUserLocalSettings => "HKEY_CURRENT_USER_LOCAL_SETTINGS",
            PredefinedKey::PerformanceText => "HKEY_PERFORMANCE_TEXT",
            PredefinedKey::PerformanceNlsText => "HKEY_PERFORMANCE_NLSTEXT",
        }
    }
}
