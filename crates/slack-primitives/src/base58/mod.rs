//! Base58 encoding and Base58Check (double-SHA-256 checksum) encoding.
//!
//! Base58Check wraps addresses, WIF private keys and BIP32 extended keys.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum suffix.
const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string using the Bitcoin alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or `InvalidBase58` for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `payload || sha256d(payload)[..4]` as Base58.
pub fn check_encode(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&data)
}

/// Decode a Base58Check string, verifying and stripping the 4-byte checksum.
///
/// # Returns
/// The payload without checksum, `ChecksumMismatch` if the checksum does not
/// match, or `InvalidBase58` if the text is malformed or too short.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let payload_len = decoded.len() - CHECKSUM_LEN;
    let expected = sha256d(&decoded[..payload_len]);
    if decoded[payload_len..] != expected[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    decoded.truncate(payload_len);
    Ok(decoded)
}
