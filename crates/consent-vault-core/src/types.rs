//! Strong type definitions for the Consent Vault.
//!
//! All identifiers are newtypes so a patient id can never be passed where a
//! provider id is expected.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Domain-separation context for deriving blob handles from record ids.
const BLOB_HANDLE_CONTEXT: &str = "consent-vault-v1 blob-handle";

macro_rules! party_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create from a caller-supplied string.
            ///
            /// Surrounding whitespace is trimmed; an empty result is rejected.
            pub fn new(id: impl AsRef<str>) -> Result<Self> {
                let id = id.as_ref().trim();
                if id.is_empty() {
                    return Err(CoreError::InvalidArgument(concat!($label, " is required").into()));
                }
                Ok(Self(id.to_string()))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(s: String) -> Result<Self> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

party_id!(
    /// Identifier of a patient. Asserted by the caller, never authenticated.
    PatientId,
    "patient id"
);

party_id!(
    /// Identifier of a provider. Asserted by the caller, never authenticated.
    ProviderId,
    "provider id"
);

macro_rules! random_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub [u8; 16]);

        impl $name {
            /// Draw a fresh identifier from the thread-local CSPRNG.
            ///
            /// 128 random bits: collisions are negligible over a process lifetime.
            pub fn generate() -> Self {
                let mut bytes = [0u8; 16];
                rand::thread_rng().fill_bytes(&mut bytes);
                Self(bytes)
            }

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self> {
                let bytes = hex::decode(s.trim())
                    .map_err(|e| CoreError::MalformedId(format!("{}: {}", stringify!($name), e)))?;
                let arr: [u8; 16] = bytes.try_into().map_err(|_| {
                    CoreError::MalformedId(format!("{}: expected 16 bytes", stringify!($name)))
                })?;
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }
    };
}

random_id!(
    /// Identifier of an encrypted record, assigned at upload.
    RecordId
);

random_id!(
    /// Opaque token generated once per operation.
    ///
    /// The audit entry and the ledger entry produced by one operation carry
    /// the same transaction id; it is the join key across the two logs.
    /// Uniqueness is the only guarantee; ids are not ordered.
    TransactionId
);

/// Storage key for a record's encrypted blob.
///
/// Derived from the record id with a keyed BLAKE3 derivation so the on-disk
/// name does not expose the record id directly.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobHandle(String);

impl BlobHandle {
    /// Derive the handle for a record.
    pub fn for_record(record_id: &RecordId) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(BLOB_HANDLE_CONTEXT);
        hasher.update(record_id.as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    /// The handle as a string (lowercase hex, 64 characters).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobHandle({})", self.0.get(..16).unwrap_or(&self.0))
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
