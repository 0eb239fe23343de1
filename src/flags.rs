//! Bit flag sets passed through to the native registry API.
//!
//! Bit positions match `winnt.h`/`winreg.h`; the registry layer never
//! reinterprets them, it only forwards `bits()` to the store.

use std::ops::{BitAnd, BitOr, BitOrAssign};

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            /// Creates a flag set from raw bits.
            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            /// Returns the raw bits.
            pub const fn bits(&self) -> u32 {
                self.0
            }

            /// Returns true if every bit of `other` is set.
            pub const fn contains(&self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }

            /// Returns true if any bit of `other` is set.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.0 & other.0) != 0
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }
    };
}

flag_set! {
    /// Key security and access rights.
    Access
}

impl Access {
    /// Query the values of a key.
    pub const QUERY_VALUE: Access = Access(0x0001);

    /// Create, delete or set a value.
    pub const SET_VALUE: Access = Access(0x0002);

    /// Create a subkey.
    pub const CREATE_SUB_KEY: Access = Access(0x0004);

    /// Enumerate the subkeys of a key.
    pub const ENUMERATE_SUB_KEYS: Access = Access(0x0008);

    /// Request change notifications.
    pub const NOTIFY: Access = Access(0x0010);

    /// Reserved for system use.
    pub const CREATE_LINK: Access = Access(0x0020);

    /// Access the 64-bit registry view from a 32-bit process.
    pub const WOW64_64KEY: Access = Access(0x0100);

    /// Access the 32-bit registry view from a 64-bit process.
    pub const WOW64_32KEY: Access = Access(0x0200);

    /// Delete the key.
    pub const DELETE: Access = Access(0x0001_0000);

    /// Generic read.
    pub const READ: Access = Access(0x0002_0019);

    /// Generic write.
    pub const WRITE: Access = Access(0x0002_0006);

    /// Same as `READ`.
    pub const EXECUTE: Access = Access::READ;

    /// Every specific and standard right.
    pub const ALL_ACCESS: Access = Access(0x000F_003F);
}

flag_set! {
    /// Options for creating a key.
    CreateKeyOptions
}

impl CreateKeyOptions {
    /// The key is persisted (default).
    pub const NON_VOLATILE: CreateKeyOptions = CreateKeyOptions(0);

    /// The key lives in memory only and is lost on restart.
    pub const VOLATILE: CreateKeyOptions = CreateKeyOptions(1);

    /// The key is a symbolic link.
    pub const CREATE_LINK: CreateKeyOptions = CreateKeyOptions(2);

    /// Open with backup/restore privileges.
    pub const BACKUP_RESTORE: CreateKeyOptions = CreateKeyOptions(4);
}

flag_set! {
    /// Options for opening a key.
    OpenKeyOptions
}

impl OpenKeyOptions {
    /// No options.
    pub const NONE: OpenKeyOptions = OpenKeyOptions(0);

    /// Open the link itself rather than its target.
    pub const OPEN_LINK: OpenKeyOptions = OpenKeyOptions(8);
}

flag_set! {
    /// Type restriction and behavior flags for path-based value reads.
    GetValueFlags
}

impl GetValueFlags {
    /// Accept any value type.
    pub const RT_ANY: GetValueFlags = GetValueFlags(0xFFFF);

    /// Accept `REG_NONE`.
    pub const RT_REG_NONE: GetValueFlags = GetValueFlags(0x0001);

    /// Accept `REG_SZ`.
    pub const RT_REG_SZ: GetValueFlags = GetValueFlags(0x0002);

    /// Accept `REG_EXPAND_SZ`.
    pub const RT_REG_EXPAND_SZ: GetValueFlags = GetValueFlags(0x0004);

    /// Accept `REG_BINARY`.
    pub const RT_REG_BINARY: GetValueFlags = GetValueFlags(0x0008);

    /// Accept `REG_DWORD`.
    pub const RT_REG_DWORD: GetValueFlags = GetValueFlags(0x0010);

    /// Accept `REG_MULTI_SZ`.
    pub const RT_REG_MULTI_SZ: GetValueFlags = GetValueFlags(0x0020);

    /// Accept `REG_QWORD`.
    pub const RT_REG_QWORD: GetValueFlags = GetValueFlags(0x0040);

    /// Accept `REG_DWORD` or 4-byte `REG_BINARY`.
    pub const RT_DWORD: GetValueFlags = GetValueFlags(0x0010 | 0x0008);

    /// Accept `REG_QWORD` or 8-byte `REG_BINARY`.
    pub const RT_QWORD: GetValueFlags = GetValueFlags(0x0040 | 0x0008);

    /// Do not expand `REG_EXPAND_SZ` values.
    pub const NO_EXPAND: GetValueFlags = GetValueFlags(0x1000_0000);

    /// Resolve the subkey in the 64-bit view.
    pub const SUBKEY_WOW6464KEY: GetValueFlags = GetValueFlags(0x0001_0000);

    /// Resolve the subkey in the 32-bit view.
    pub const SUBKEY_WOW6432KEY: GetValueFlags = GetValueFlags(0x0002_0000);

    /// Returns a copy that accepts any type if no type restriction is set.
    ///
    /// The native call fails every read when no `RT_*` bit is present, so an
    /// unconstrained caller gets `RT_ANY` instead.
    pub fn or_any_type(self) -> Self {
        if self.intersects(Self::RT_ANY) {
            self
        } else {
            self | Self::RT_ANY
        }
    }
}
