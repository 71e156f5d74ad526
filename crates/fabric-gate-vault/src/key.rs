// crates/fabric-gate-vault/src/key.rs
// ============================================================================
// Module: Credential Keys
// Description: Master key handling and key-version fingerprints.
// Purpose: Identify the active key without exposing key material.
// Dependencies: base64, sha2, zeroize
// ============================================================================

//! ## Overview
//! A [`CredentialKey`] is the 32-byte AES-256-GCM master key. Its
//! [`KeyVersion`] is a short SHA-256 fingerprint embedded in every sealed
//! credential, letting the vault detect a key-rotation mismatch from the
//! ciphertext alone. Key bytes are zeroized on drop and never appear in any
//! error or display form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::Digest;
use sha2::Sha256;
use zeroize::Zeroizing;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Master key length in bytes (AES-256).
pub const KEY_BYTES: usize = 32;

/// Fingerprint prefix length taken from the key digest.
const VERSION_BYTES: usize = 8;

// ============================================================================
// SECTION: Key Version
// ============================================================================

/// Short fingerprint identifying which master key sealed a credential.
///
/// # Invariants
/// - Derived from the key digest only; carries no recoverable key material.
/// - Stable hex wire form embedded in sealed credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyVersion(String);

impl KeyVersion {
    /// Wraps an already-encoded version tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the hex wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Credential Key
// ============================================================================

/// Active master key for credential sealing.
///
/// # Invariants
/// - Exactly [`KEY_BYTES`] long.
/// - Zeroized on drop; never printed or serialized.
pub struct CredentialKey {
    /// Raw key bytes.
    bytes: Zeroizing<[u8; KEY_BYTES]>,
}

impl CredentialKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_BYTES]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Decodes a key from its base64 configuration form.
    ///
    /// Returns `None` when the input is not valid base64 or decodes to the
    /// wrong length.
    #[must_use]
    pub fn from_base64(encoded: &str) -> Option<Self> {
        let decoded = BASE64.decode(encoded.trim()).ok()?;
        let bytes: [u8; KEY_BYTES] = decoded.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }

    /// Returns the key-version fingerprint for this key.
    #[must_use]
    pub fn version(&self) -> KeyVersion {
        let digest = Sha256::digest(self.bytes.as_slice());
        let mut tag = String::with_capacity(VERSION_BYTES * 2);
        for byte in &digest[..VERSION_BYTES] {
            tag.push_str(&format!("{byte:02x}"));
        }
        KeyVersion(tag)
    }

    /// Borrows the raw key bytes for cipher construction.
    pub(crate) fn material(&self) -> &[u8; KEY_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for CredentialKey {
    /// Prints the version tag only; key material is never formatted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialKey").field("version", &self.version().as_str()).finish()
    }
}
