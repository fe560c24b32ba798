// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated encryption of session records.
//!
//! ## Format
//!
//! ```text
//! base64url( version(1) | nonce(12) | AES-256-GCM(ciphertext | tag) )
//! ```
//!
//! The plaintext is a JSON envelope holding the record and a seal expiry
//! (`exp`, unix ms). The seal expiry is the transport-level TTL; the
//! authoritative business expiry is computed from the record's `createdAt`
//! by the session read path.
//!
//! The AEAD key is derived from the configured password with
//! HMAC-SHA256 over a fixed label, so rotating the password invalidates every
//! outstanding cookie.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::SessionRecord;
use crate::config::SessionConfig;

const SEAL_VERSION: u8 = 1;
const KEY_LABEL: &[u8] = b"encoteki/session-seal/v1";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SealError {
    #[error("session key derivation failed")]
    KeyDerivation,

    #[error("session cookie is not valid base64")]
    Encoding,

    #[error("session cookie has unsupported version {0}")]
    UnsupportedVersion(u8),

    #[error("session cookie is truncated")]
    Truncated,

    #[error("session cookie failed authentication")]
    Tampered,

    #[error("session seal expired")]
    Expired,

    #[error("session payload is malformed: {0}")]
    Payload(String),

    #[error("random number generator failure")]
    Random,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    exp: i64,
    data: SessionRecord,
}

/// Seals and unseals [`SessionRecord`]s.
pub struct SessionSealer {
    key: LessSafeKey,
    rng: SystemRandom,
    ttl_millis: i64,
}

impl SessionSealer {
    pub fn new(config: &SessionConfig) -> Result<Self, SealError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(config.password.as_bytes())
            .map_err(|_| SealError::KeyDerivation)?;
        mac.update(KEY_LABEL);
        let key_bytes = mac.finalize().into_bytes();

        let unbound =
            UnboundKey::new(&AES_256_GCM, key_bytes.as_slice()).map_err(|_| SealError::KeyDerivation)?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
            ttl_millis: config.ttl.as_millis() as i64,
        })
    }

    /// Seal a record; the seal stays valid for one TTL from `now_millis`.
    pub fn seal(&self, record: &SessionRecord, now_millis: i64) -> Result<String, SealError> {
        let envelope = Envelope {
            exp: now_millis + self.ttl_millis,
            data: record.clone(),
        };
        let mut in_out =
            serde_json::to_vec(&envelope).map_err(|e| SealError::Payload(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| SealError::Random)?;

        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from([SEAL_VERSION]),
                &mut in_out,
            )
            .map_err(|_| SealError::Tampered)?;

        let mut out = Vec::with_capacity(1 + NONCE_LEN + in_out.len());
        out.push(SEAL_VERSION);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        Ok(Base64UrlUnpadded::encode_string(&out))
    }

    /// Unseal a cookie value, rejecting tampered or expired seals.
    pub fn unseal(&self, sealed: &str, now_millis: i64) -> Result<SessionRecord, SealError> {
        let raw = Base64UrlUnpadded::decode_vec(sealed).map_err(|_| SealError::Encoding)?;

        let (&version, rest) = raw.split_first().ok_or(SealError::Truncated)?;
        if version != SEAL_VERSION {
            return Err(SealError::UnsupportedVersion(version));
        }
        if rest.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(SealError::Truncated);
        }

        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| SealError::Truncated)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from([SEAL_VERSION]), &mut in_out)
            .map_err(|_| SealError::Tampered)?;

        let envelope: Envelope =
            serde_json::from_slice(plaintext).map_err(|e| SealError::Payload(e.to_string()))?;

        if now_millis >= envelope.exp {
            return Err(SealError::Expired);
        }
        Ok(envelope.data)
    }
}
