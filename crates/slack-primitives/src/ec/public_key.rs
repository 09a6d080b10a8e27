//! secp256k1 public point.
//!
//! Wraps a k256 verifying key: the point is always on the curve and never
//! the point at infinity.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::group::Group;
use k256::{ProjectivePoint, Scalar};

use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public point.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Decode a SEC1 point, compressed (33 bytes) or uncompressed (65 bytes).
    ///
    /// # Returns
    /// `InvalidPoint` if the encoding is malformed or the point is not on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPoint("empty encoding".to_string()));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| PrimitivesError::InvalidPoint(hex::encode(bytes)))?;
        Ok(PublicKey { inner })
    }

    /// Decode a hex-encoded SEC1 point.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize in compressed SEC1 format: `0x02|0x03 || x`.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 format: `0x04 || x || y`.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize with the requested width.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }

    /// Hash160 of the serialized point.
    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        hash160(&self.to_bytes(compressed))
    }

    /// Verify a 64-byte `r || s` signature over a 32-byte prehash.
    ///
    /// Any malformed input yields `false`.
    pub fn verify_prehash(&self, hash: &[u8], rs: &[u8; 64]) -> bool {
        let sig = match k256::ecdsa::Signature::from_slice(rs) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        self.inner.verify_prehash(hash, &sig).is_ok()
    }

    /// Compute `G·tweak + self`, or `None` if the sum is the point at infinity.
    pub(crate) fn tweak_add(&self, tweak: &Scalar) -> Option<PublicKey> {
        let point = ProjectivePoint::GENERATOR * tweak + ProjectivePoint::from(*self.inner.as_affine());
        if bool::from(point.is_identity()) {
            return None;
        }
        VerifyingKey::from_affine(point.to_affine())
            .ok()
            .map(|inner| PublicKey { inner })
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}
