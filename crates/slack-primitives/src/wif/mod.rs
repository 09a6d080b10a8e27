//! Wallet Import Format (WIF) codec.
//!
//! A WIF string is Base58Check over `version || scalar(32) || [0x01]`, where
//! the trailing `0x01` marks a key whose public point is encoded compressed.
//! The version byte is returned as-is; matching it against a network is the
//! caller's job.

use zeroize::Zeroizing;

use crate::base58;
use crate::PrimitivesError;

/// Length of a raw private key scalar in bytes.
const PRIVATE_KEY_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A decoded WIF payload.
#[derive(Clone)]
pub struct Wif {
    /// Network WIF version byte.
    pub version: u8,
    /// Raw 32-byte big-endian private scalar (not range-checked).
    pub private_key: Zeroizing<[u8; PRIVATE_KEY_LEN]>,
    /// Whether the key's public point is serialized compressed.
    pub compressed: bool,
}

impl std::fmt::Debug for Wif {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wif")
            .field("version", &self.version)
            .field("private_key", &"[redacted]")
            .field("compressed", &self.compressed)
            .finish()
    }
}

/// Decode a WIF string.
///
/// # Returns
/// The decoded payload, or `InvalidWif` if the payload has the wrong length
/// or a bad compression flag. Base58 and checksum failures are propagated.
pub fn decode(text: &str) -> Result<Wif, PrimitivesError> {
    let payload = Zeroizing::new(base58::check_decode(text)?);

    let compressed = match payload.len() {
        34 => {
            if payload[33] != COMPRESS_MAGIC {
                return Err(PrimitivesError::InvalidWif(
                    "invalid compression flag".to_string(),
                ));
            }
            true
        }
        33 => false,
        n => {
            return Err(PrimitivesError::InvalidWif(format!("invalid length {}", n)));
        }
    };

    let mut private_key = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
    private_key.copy_from_slice(&payload[1..1 + PRIVATE_KEY_LEN]);

    Ok(Wif {
        version: payload[0],
        private_key,
        compressed,
    })
}

/// Encode a private scalar as WIF.
pub fn encode(version: u8, private_key: &[u8; PRIVATE_KEY_LEN], compressed: bool) -> String {
    let mut payload = Zeroizing::new(Vec::with_capacity(1 + PRIVATE_KEY_LEN + 1));
    payload.push(version);
    payload.extend_from_slice(private_key);
    if compressed {
        payload.push(COMPRESS_MAGIC);
    }
    base58::check_encode(&payload)
}
