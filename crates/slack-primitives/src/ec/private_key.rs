//! secp256k1 private scalar.
//!
//! Wraps a k256 signing key, so any value of this type satisfies
//! `0 < d < n`.

use k256::ecdsa::{RecoveryId, SigningKey};
use k256::elliptic_curve::PrimeField;
use k256::Scalar;

use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private scalar.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if `0 < d < n`, otherwise `InvalidPrivateKey`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let scalar: Option<Scalar> =
            Scalar::from_repr(k256::FieldBytes::clone_from_slice(bytes)).into();
        match scalar {
            Some(scalar) => Self::from_scalar(scalar),
            None => Err(PrimitivesError::InvalidPrivateKey(
                "private key must be less than the curve order".to_string(),
            )),
        }
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Wrap an already reduced scalar, rejecting zero.
    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Self, PrimitivesError> {
        if scalar == Scalar::ZERO {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key must be greater than 0".to_string(),
            ));
        }
        let inner = SigningKey::from_bytes(&scalar.to_repr())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Serialize the scalar as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES_LEN] {
        self.inner.to_bytes().into()
    }

    /// Compute the public point `G·d`.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Compute `(d + tweak) mod n`, or `None` if the sum is zero.
    pub(crate) fn tweak_add(&self, tweak: &Scalar) -> Option<PrivateKey> {
        Self::from_scalar(self.to_scalar() + tweak).ok()
    }

    /// Sign a 32-byte prehashed message with an RFC6979 nonce.
    ///
    /// Returns the 64-byte `r || s` (low-S) and the recovery id.
    pub(crate) fn sign_prehash(
        &self,
        hash: &[u8],
    ) -> Result<([u8; 64], RecoveryId), PrimitivesError> {
        let (sig, recovery_id) = self
            .inner
            .sign_prehash_recoverable(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let mut rs = [0u8; 64];
        rs.copy_from_slice(&sig.to_bytes());
        Ok((rs, recovery_id))
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([redacted])")
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}
