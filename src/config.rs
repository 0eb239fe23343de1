//! Registry facade configuration.

use crate::flags::{Access, GetValueFlags};

/// Settings for a [`Registry`](crate::registry::Registry).
///
/// Platform support is decided once, when the configuration is built, and
/// checked once, when the facade is constructed. Nothing is consulted from
/// global state afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Whether a registry is available on this platform.
    pub platform_supported: bool,

    /// Access used by the short-form `open`/`create` calls.
    pub default_access: Access,

    /// Flags added by `get_value_raw` when the caller restricts no value
    /// type. Falls back to `RT_ANY` if these restrict none either.
    pub default_get_flags: GetValueFlags,
}

impl RegistryConfig {
    /// Detects platform support for the host this code was built for.
    pub fn detect() -> Self {
        Self {
            platform_supported: cfg!(windows),
            default_access: Access::ALL_ACCESS,
            default_get_flags: GetValueFlags::RT_ANY,
        }
    }

    /// Overrides platform detection, e.g. for a store that does not need the
    /// native registry.
    pub fn with_platform_supported(mut self, supported: bool) -> Self {
        self.platform_supported = supported;
        self
    }

    /// Sets the default access.
    pub fn with_default_access(mut self, access: Access) -> Self {
        self.default_access = access;
        self
    }

    /// Sets the default flags for path-based reads.
    pub fn with_default_get_flags(mut self, flags: GetValueFlags) -> Self {
        self.default_get_flags = flags;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::detect()
    }
}
