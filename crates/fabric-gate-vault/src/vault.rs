// crates/fabric-gate-vault/src/vault.rs
// ============================================================================
// Module: Credential Vault
// Description: AES-256-GCM sealing and scoped decryption of credentials.
// Purpose: Guarantee plaintext credentials never outlive a dispatch scope.
// Dependencies: aes-gcm, base64, rand, zeroize, fabric-gate-core
// ============================================================================

//! ## Overview
//! Sealed credentials use the wire form
//! `fgv1:<key_version>:<nonce_b64>:<ciphertext_b64>`. Sealing draws a fresh
//! random nonce per call. Unsealing happens only inside
//! [`Vault::with_decrypted`]: the plaintext lives in a zeroized buffer that
//! is dropped before the scope's result is returned, so no reference to it
//! can escape by construction. A key-version mismatch is a fatal
//! configuration fault for that cluster and is reported without attempting
//! decryption; it is never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aes_gcm::Aes256Gcm;
use aes_gcm::Key;
use aes_gcm::Nonce;
use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use fabric_gate_core::ClusterId;
use fabric_gate_core::SealedCredential;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::key::CredentialKey;
use crate::key::KeyVersion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sealed credential format tag (algorithm identifier).
const FORMAT_TAG: &str = "fgv1";

/// AES-GCM nonce length in bytes.
const NONCE_BYTES: usize = 12;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Credential vault errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - No variant carries plaintext, ciphertext, or key material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    /// The sealed credential does not match the expected wire form.
    #[error("sealed credential for cluster {cluster_id} is malformed")]
    Malformed {
        /// Cluster whose credential failed to parse.
        cluster_id: ClusterId,
    },
    /// The sealed credential was produced under a different master key.
    #[error(
        "sealed credential for cluster {cluster_id} uses key version {found}, active key is \
         {expected}"
    )]
    KeyMismatch {
        /// Cluster whose credential is unreadable.
        cluster_id: ClusterId,
        /// Version tag of the active key.
        expected: KeyVersion,
        /// Version tag found in the sealed credential.
        found: KeyVersion,
    },
    /// Authenticated decryption failed (tampered or corrupted ciphertext).
    #[error("sealed credential for cluster {cluster_id} failed authenticated decryption")]
    Decrypt {
        /// Cluster whose credential failed to decrypt.
        cluster_id: ClusterId,
    },
    /// Encryption failed.
    #[error("credential sealing failed")]
    Encrypt,
}

// ============================================================================
// SECTION: Vault
// ============================================================================

/// Credential vault bound to one active master key.
///
/// # Invariants
/// - Decrypted plaintext is only lent to [`Vault::with_decrypted`] scopes
///   and is zeroized when the scope returns.
/// - Each concurrent dispatch opens its own scope; scopes share no state.
pub struct Vault {
    /// Active master key.
    key: CredentialKey,
    /// Cached version tag of the active key.
    version: KeyVersion,
}

impl Vault {
    /// Creates a vault around the active master key.
    #[must_use]
    pub fn new(key: CredentialKey) -> Self {
        let version = key.version();
        Self {
            key,
            version,
        }
    }

    /// Returns the active key-version tag.
    #[must_use]
    pub const fn key_version(&self) -> &KeyVersion {
        &self.version
    }

    /// Seals a plaintext credential under the active key.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Encrypt`] when the cipher rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<SealedCredential, VaultError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.material()));
        let mut nonce_bytes = [0_u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext =
            cipher.encrypt(nonce, plaintext.as_bytes()).map_err(|_| VaultError::Encrypt)?;
        Ok(SealedCredential::new(format!(
            "{FORMAT_TAG}:{}:{}:{}",
            self.version,
            BASE64.encode(nonce_bytes),
            BASE64.encode(ciphertext),
        )))
    }

    /// Reads the key-version tag from a sealed credential without decrypting.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] when the wire form does not parse.
    pub fn sealed_version(
        &self,
        cluster_id: ClusterId,
        sealed: &SealedCredential,
    ) -> Result<KeyVersion, VaultError> {
        let parts = Self::split(cluster_id, sealed)?;
        Ok(KeyVersion::new(parts.0))
    }

    /// Decrypts a sealed credential and lends the plaintext to `scope`.
    ///
    /// The plaintext is zeroized before this function returns; only the
    /// scope's own result value leaves the call.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] on wire-form violations,
    /// [`VaultError::KeyMismatch`] when the credential was sealed under a
    /// different key (detected before any decryption), and
    /// [`VaultError::Decrypt`] when authenticated decryption fails. All are
    /// fatal configuration faults for the cluster and must not be retried.
    pub fn with_decrypted<T>(
        &self,
        cluster_id: ClusterId,
        sealed: &SealedCredential,
        scope: impl FnOnce(&str) -> T,
    ) -> Result<T, VaultError> {
        let (version, nonce_b64, ciphertext_b64) = Self::split(cluster_id, sealed)?;
        if version != self.version.as_str() {
            return Err(VaultError::KeyMismatch {
                cluster_id,
                expected: self.version.clone(),
                found: KeyVersion::new(version),
            });
        }
        let nonce_bytes = BASE64.decode(nonce_b64).map_err(|_| VaultError::Malformed {
            cluster_id,
        })?;
        if nonce_bytes.len() != NONCE_BYTES {
            return Err(VaultError::Malformed {
                cluster_id,
            });
        }
        let ciphertext = BASE64.decode(ciphertext_b64).map_err(|_| VaultError::Malformed {
            cluster_id,
        })?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.material()));
        let plaintext_bytes = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
                .map_err(|_| VaultError::Decrypt {
                    cluster_id,
                })?,
        );
        let plaintext = Zeroizing::new(
            String::from_utf8(plaintext_bytes.to_vec()).map_err(|_| VaultError::Malformed {
                cluster_id,
            })?,
        );
        Ok(scope(&plaintext))
    }

    /// Splits a sealed credential into its wire components.
    fn split(
        cluster_id: ClusterId,
        sealed: &SealedCredential,
    ) -> Result<(&str, &str, &str), VaultError> {
        let mut parts = sealed.as_str().splitn(4, ':');
        let tag = parts.next().unwrap_or_default();
        let (Some(version), Some(nonce), Some(ciphertext)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(VaultError::Malformed {
                cluster_id,
            });
        };
        if tag != FORMAT_TAG || version.is_empty() || nonce.is_empty() || ciphertext.is_empty() {
            return Err(VaultError::Malformed {
                cluster_id,
            });
        }
        Ok((version, nonce, ciphertext))
    }
}
