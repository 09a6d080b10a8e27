//! Hash function primitives used by key and address handling.
//!
//! SHA-256 (seed hashing, base58check checksums), RIPEMD-160 and hash160
//! (addresses, BIP32 fingerprints) and HMAC-SHA512 (BIP32 derivation).

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Compute SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256 (SHA-256d), the base58check checksum function.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// Used for address generation and BIP32 key identifiers.
///
/// # Arguments
/// * `data` - Byte slice to hash, typically a serialized public key.
///
/// # Returns
/// A 20-byte Hash160 digest.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Compute HMAC-SHA512 of the input data with the given key.
///
/// # Arguments
/// * `key` - The HMAC key bytes (a chain code, or `"Bitcoin seed"` for masters).
/// * `data` - The message bytes to authenticate.
///
/// # Returns
/// A 64-byte HMAC-SHA512 tag.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    type HmacSha512 = Hmac<Sha512>;
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_TEXT: &[u8] = b"slack";

    #[test]
    fn test_sha256_empty_string() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_seed_text() {
        assert_eq!(
            hex::encode(sha256(SEED_TEXT)),
            "877c3aec832cd41012590679bdb84ebe25e5ebbd71b6b81722b48b129feb76ae"
        );
    }

    #[test]
    fn test_sha256d_seed_text() {
        assert_eq!(
            hex::encode(sha256d(SEED_TEXT)),
            "1fa76f264c106a26bc96ad7227a7202a318ddca7ceb73aaac6aab6d685828989"
        );
    }

    #[test]
    fn test_ripemd160() {
        assert_eq!(
            hex::encode(ripemd160(b"")),
            "9c1185a5c5e9fc54612808977ee8f548b2258d31"
        );
        assert_eq!(
            hex::encode(ripemd160(SEED_TEXT)),
            "bc63be626964d2508d190d7642f79537b47049ee"
        );
    }

    #[test]
    fn test_hash160() {
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
        assert_eq!(
            hex::encode(hash160(SEED_TEXT)),
            "51ea50026e497fafa5c2c0a598dda770bd69d363"
        );
    }

    // RFC 4231 test case 2.
    #[test]
    fn test_sha512_hmac_rfc4231() {
        let key = b"Jefe";
        let msg = b"what do ya want for nothing?";
        assert_eq!(
            hex::encode(sha512_hmac(key, msg)),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    // BIP32 test vector 1 master secret.
    #[test]
    fn test_sha512_hmac_bip32_master() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        assert_eq!(
            hex::encode(sha512_hmac(b"Bitcoin seed", &seed)),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35\
             873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
    }
}
