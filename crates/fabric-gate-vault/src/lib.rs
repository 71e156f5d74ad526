// crates/fabric-gate-vault/src/lib.rs
// ============================================================================
// Module: Fabric Gate Vault
// Description: Credential encryption at rest and scoped decryption.
// Purpose: Keep cluster credentials sealed outside a single dispatch scope.
// Dependencies: aes-gcm, base64, rand, sha2, zeroize, fabric-gate-core
// ============================================================================

//! ## Overview
//! The vault seals cluster credentials with AES-256-GCM under one active
//! master key. The sealed wire form carries an algorithm and key-version tag
//! so a key-rotation mismatch is detectable without attempting decryption.
//! Decryption is only reachable through [`Vault::with_decrypted`], which
//! lends the plaintext to a caller-supplied scope and zeroizes it when the
//! scope returns; the plaintext value itself is never returned from the
//! vault.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod key;
pub mod vault;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use key::CredentialKey;
pub use key::KeyVersion;
pub use vault::Vault;
pub use vault::VaultError;
