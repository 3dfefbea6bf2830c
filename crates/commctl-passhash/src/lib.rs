//! Credential hashing for Commissaire administrator accounts.
//!
//! Produces salted bcrypt hashes in the self-describing modular-crypt
//! encoding (`$2b$<cost>$<salt><digest>`), so later verification needs no
//! side-channel state. A fresh random salt is generated per call; apart
//! from that randomness, hashing is a pure function of its inputs, which
//! is why tests validate structure (decode and check fields) rather than
//! exact output equality.

#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

/// Default bcrypt work factor, matching the service's passhash tooling.
pub const DEFAULT_COST: u32 = 12;

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Length of the base64-encoded salt segment in a bcrypt hash.
const SALT_LEN: usize = 22;

/// Errors raised while hashing a credential. Terminal, never retried.
#[derive(Debug, Error)]
pub enum HashError {
    /// The plaintext was empty.
    #[error("cannot hash an empty password")]
    EmptyInput,

    /// The requested work factor is outside bcrypt's supported bounds.
    #[error("cost factor {cost} out of range ({MIN_COST}..={MAX_COST})")]
    CostOutOfRange {
        /// The rejected cost factor.
        cost: u32,
    },

    /// The underlying bcrypt implementation failed.
    #[error("hashing failed: {reason}")]
    Hashing {
        /// What went wrong.
        reason: String,
    },
}

/// A salted, adaptively-hashed credential.
///
/// Wraps the encoded bcrypt string and exposes its decoded fields for
/// structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passhash {
    encoded: String,
    cost: u32,
    salt: String,
    digest: String,
}

impl Passhash {
    /// The full encoded hash, suitable for the service's user store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The work factor encoded in the hash.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// The encoded salt segment.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The encoded digest segment.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Checks a plaintext against this hash.
    ///
    /// Returns `false` on mismatch or if the encoding is unreadable.
    #[must_use]
    pub fn verify(&self, plaintext: &str) -> bool {
        bcrypt::verify(plaintext, &self.encoded).unwrap_or(false)
    }
}

impl fmt::Display for Passhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Hashes `plaintext` with a fresh random salt at the given work factor.
///
/// # Errors
///
/// Returns [`HashError::EmptyInput`] for an empty plaintext and
/// [`HashError::CostOutOfRange`] when `cost` is outside
/// [`MIN_COST`]`..=`[`MAX_COST`]. Bounds are checked before any work is
/// done.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<Passhash, HashError> {
    if plaintext.is_empty() {
        return Err(HashError::EmptyInput);
    }
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(HashError::CostOutOfRange { cost });
    }
    let encoded = bcrypt::hash(plaintext, cost).map_err(|e| HashError::Hashing {
        reason: e.to_string(),
    })?;
    decode(encoded)
}

/// Splits an encoded bcrypt string into its fields.
fn decode(encoded: String) -> Result<Passhash, HashError> {
    let mut segments = encoded.split('$');
    let malformed = || HashError::Hashing {
        reason: "unexpected hash encoding".to_string(),
    };
    // Leading empty segment before the first '$'
    if segments.next() != Some("") {
        return Err(malformed());
    }
    let algorithm = segments.next().ok_or_else(malformed)?;
    if !algorithm.starts_with('2') {
        return Err(malformed());
    }
    let cost = segments
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(malformed)?;
    let payload = segments.next().ok_or_else(malformed)?;
    if payload.len() <= SALT_LEN {
        return Err(malformed());
    }
    let (salt, digest) = payload.split_at(SALT_LEN);
    Ok(Passhash {
        cost,
        salt: salt.to_string(),
        digest: digest.to_string(),
        encoded,
    })
}
