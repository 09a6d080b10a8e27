//! A secp256k1 identity bound to a network.
//!
//! A [`KeyPair`] holds a private scalar, a public point, or both. When only
//! the scalar is present the point is computed on first use and cached.

use std::sync::OnceLock;

use k256::ecdsa::{RecoveryId, VerifyingKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::trace;
use zeroize::Zeroizing;

use crate::base58;
use crate::ec::network::{Network, NetworkSelector};
use crate::ec::private_key::{PrivateKey, PRIVATE_KEY_BYTES_LEN};
use crate::ec::public_key::{PublicKey, UNCOMPRESSED_LEN};
use crate::ec::signature::{CompactSignature, Signature};
use crate::hash::sha256;
use crate::wif;
use crate::PrimitivesError;

/// Length of a message hash accepted by `sign` and `verify`.
const HASH_LEN: usize = 32;

/// Construction options for a [`KeyPair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPairOptions {
    /// Serialize the public point compressed (33 bytes) rather than 65 bytes.
    pub compressed: bool,
    /// Network the key is used on.
    pub network: Network,
}

impl KeyPairOptions {
    /// Compressed keys on `network`.
    pub fn new(network: Network) -> Self {
        KeyPairOptions {
            compressed: true,
            network,
        }
    }

    /// Override the compression flag.
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }
}

/// Key material held by a [`KeyPair`].
#[derive(Clone, Debug)]
enum KeyMaterial {
    /// A private scalar and its lazily computed public point.
    Private {
        key: PrivateKey,
        point: OnceLock<PublicKey>,
    },
    /// A public point only.
    Public(PublicKey),
}

/// A private/public key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    material: KeyMaterial,
    compressed: bool,
    network: Network,
}

impl KeyPair {
    /// Build a key pair from a private scalar or a public point.
    ///
    /// # Returns
    /// `UnexpectedPublicKey` if both are given, `InvalidPoint` if neither is.
    pub fn new(
        private_key: Option<PrivateKey>,
        public_key: Option<PublicKey>,
        options: KeyPairOptions,
    ) -> Result<Self, PrimitivesError> {
        match (private_key, public_key) {
            (Some(_), Some(_)) => Err(PrimitivesError::UnexpectedPublicKey),
            (Some(private_key), None) => Ok(Self::from_private_key(private_key, options)),
            (None, Some(public_key)) => Ok(Self::from_public_key(public_key, options)),
            (None, None) => Err(PrimitivesError::InvalidPoint(
                "no private or public key supplied".to_string(),
            )),
        }
    }

    /// Key pair owning `private_key`.
    pub fn from_private_key(private_key: PrivateKey, options: KeyPairOptions) -> Self {
        KeyPair {
            material: KeyMaterial::Private {
                key: private_key,
                point: OnceLock::new(),
            },
            compressed: options.compressed,
            network: options.network,
        }
    }

    /// Public-only key pair.
    pub fn from_public_key(public_key: PublicKey, options: KeyPairOptions) -> Self {
        KeyPair {
            material: KeyMaterial::Public(public_key),
            compressed: options.compressed,
            network: options.network,
        }
    }

    /// Derive a key pair from a passphrase: `d = SHA-256(utf8(text))`.
    ///
    /// # Returns
    /// `InvalidPrivateKey` if the digest is zero or not below the curve order.
    pub fn from_seed(text: &str, options: KeyPairOptions) -> Result<Self, PrimitivesError> {
        let private_key = PrivateKey::from_bytes(&sha256(text.as_bytes()))?;
        Ok(Self::from_private_key(private_key, options))
    }

    /// Decode a WIF private key.
    ///
    /// The WIF version byte selects the network among `networks`; the
    /// compression flag is taken from the encoding.
    pub fn from_wif<'a>(
        text: &str,
        networks: impl Into<NetworkSelector<'a>>,
    ) -> Result<Self, PrimitivesError> {
        let decoded = wif::decode(text)?;
        let selector: NetworkSelector<'a> = networks.into();
        let network = selector.resolve_wif(decoded.version)?;
        let private_key = PrivateKey::from_bytes(decoded.private_key.as_ref())?;
        Ok(Self::from_private_key(
            private_key,
            KeyPairOptions::new(network).compressed(decoded.compressed),
        ))
    }

    /// Decode a SEC1 public key; compression follows the encoding width.
    pub fn from_public_key_bytes(bytes: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        let public_key = PublicKey::from_bytes(bytes)?;
        let compressed = bytes.len() != UNCOMPRESSED_LEN;
        Ok(Self::from_public_key(
            public_key,
            KeyPairOptions::new(network).compressed(compressed),
        ))
    }

    /// Generate a key pair from the operating system's secure RNG.
    pub fn make_random(options: KeyPairOptions) -> Self {
        Self::make_random_with(&mut OsRng, options)
    }

    /// Generate a key pair from `rng`, redrawing until `0 < d < n`.
    pub fn make_random_with<R: RngCore + CryptoRng>(rng: &mut R, options: KeyPairOptions) -> Self {
        loop {
            let mut candidate = Zeroizing::new([0u8; PRIVATE_KEY_BYTES_LEN]);
            rng.fill_bytes(candidate.as_mut());
            match PrivateKey::from_bytes(candidate.as_ref()) {
                Ok(private_key) => return Self::from_private_key(private_key, options),
                Err(_) => trace!("random scalar out of range, redrawing"),
            }
        }
    }

    /// Recover the signer of `hash` from a compact signature.
    pub fn recover_from_compact(
        hash: &[u8],
        compact: &CompactSignature,
        network: Network,
    ) -> Result<Self, PrimitivesError> {
        let rs = compact.signature.to_recoverable()?;
        let sig = k256::ecdsa::Signature::from_slice(&rs)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(compact.recovery_id).ok_or_else(|| {
            PrimitivesError::InvalidSignatureParameter(format!(
                "recovery id {}",
                compact.recovery_id
            ))
        })?;
        let verifying_key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Self::from_public_key(
            PublicKey::from_k256_verifying_key(&verifying_key),
            KeyPairOptions::new(network).compressed(compact.compressed),
        ))
    }

    /// The public point, computed from the private scalar on first use.
    pub fn public_key(&self) -> &PublicKey {
        match &self.material {
            KeyMaterial::Private { key, point } => point.get_or_init(|| key.pub_key()),
            KeyMaterial::Public(point) => point,
        }
    }

    /// The private scalar, if held.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match &self.material {
            KeyMaterial::Private { key, .. } => Some(key),
            KeyMaterial::Public(_) => None,
        }
    }

    /// The 32-byte big-endian private scalar, if held.
    pub fn private_key_bytes(&self) -> Option<Zeroizing<[u8; PRIVATE_KEY_BYTES_LEN]>> {
        self.private_key().map(|key| Zeroizing::new(key.to_bytes()))
    }

    /// The serialized public point, honoring the compression flag.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().to_bytes(self.compressed)
    }

    /// Whether the public point is serialized compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// The network this key pair is bound to.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// `base58check(pub_key_hash || hash160(public_key_bytes))`.
    pub fn address(&self) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(self.network.pub_key_hash);
        payload.extend_from_slice(&self.public_key().hash160(self.compressed));
        base58::check_encode(&payload)
    }

    /// Sign a 32-byte hash with a deterministic (RFC6979) nonce.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Ok(self.sign_recoverable(hash)?.signature)
    }

    /// Sign a 32-byte hash, keeping the recovery id and compression flag.
    pub fn sign_recoverable(&self, hash: &[u8]) -> Result<CompactSignature, PrimitivesError> {
        let private_key = self.private_key().ok_or(PrimitivesError::MissingPrivateKey)?;
        check_hash_len(hash)?;

        let (rs, recovery_id) = private_key.sign_prehash(hash)?;
        let mut compact = Signature::from_recoverable(&rs, recovery_id.to_byte())?;
        compact.compressed = self.compressed;
        Ok(compact)
    }

    /// Verify `signature` over a 32-byte hash. Never fails; mismatches are `false`.
    pub fn verify(&self, hash: &[u8], signature: &Signature) -> bool {
        if check_hash_len(hash).is_err() {
            return false;
        }
        match signature.to_recoverable() {
            Ok(rs) => self.public_key().verify_prehash(hash, &rs),
            Err(_) => false,
        }
    }

    /// Encode the private scalar as WIF with the network's version byte.
    pub fn to_wif(&self) -> Result<String, PrimitivesError> {
        let bytes = self
            .private_key_bytes()
            .ok_or(PrimitivesError::MissingPrivateKey)?;
        Ok(wif::encode(self.network.wif, &bytes, self.compressed))
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.private_key() == other.private_key()
            && self.public_key() == other.public_key()
            && self.compressed == other.compressed
            && self.network == other.network
    }
}

impl Eq for KeyPair {}

fn check_hash_len(hash: &[u8]) -> Result<(), PrimitivesError> {
    if hash.len() != HASH_LEN {
        return Err(PrimitivesError::InvalidLength {
            expected: HASH_LEN,
            got: hash.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::network::{BITCOIN, SLACK, SLACK_TESTNET};

    const SLACK_WIF: &str = "SB3iDxYmKgjkhfDZSKgLaBrp3Ynzd3yd3ZZF2ujVBK7vLpv6hWKK";

    fn slack() -> KeyPairOptions {
        KeyPairOptions::new(SLACK)
    }

    #[test]
    fn test_from_seed_golden_scalar() {
        let key_pair = KeyPair::from_seed("slack", slack()).unwrap();
        assert_eq!(
            hex::encode(key_pair.private_key().unwrap().to_bytes()),
            "877c3aec832cd41012590679bdb84ebe25e5ebbd71b6b81722b48b129feb76ae"
        );
        assert_eq!(
            hex::encode(key_pair.public_key_bytes()),
            "0302cf6b3ed45e1cbf9d16fbc80e47de061c740b876df98519628fd7c532605860"
        );
        assert_eq!(key_pair.address(), "AH2hLkmmpWwAXW2Gcr6HZ3W1AoQZrE5amZ");
    }

    #[test]
    fn test_address_respects_compression_and_network() {
        let uncompressed = KeyPair::from_seed("slack", slack().compressed(false)).unwrap();
        assert_eq!(uncompressed.public_key_bytes().len(), 65);
        assert_eq!(uncompressed.address(), "AaYMygvkANPyiopmxUWfKhJPkr6Y9LkaQB");

        let testnet = KeyPair::from_seed("slack", KeyPairOptions::new(SLACK_TESTNET)).unwrap();
        assert_eq!(testnet.address(), "a1yHSAMmiAGrn5FP4bk6ASZRJZcDkyVEdc");
    }

    #[test]
    fn test_from_wif_golden_address() {
        let key_pair = KeyPair::from_wif(SLACK_WIF, &SLACK).unwrap();
        assert!(key_pair.is_compressed());
        assert_eq!(key_pair.network(), &SLACK);
        assert_eq!(
            hex::encode(key_pair.public_key_bytes()),
            "02b80011a883a0fd621ad46dfc405df1e74bf075cbaf700fd4aebef6e96f848340"
        );
        assert_eq!(key_pair.address(), "AcMkJjBJmsEbTpv1kkR29fqveypgDC8Grj");
        assert_eq!(key_pair.to_wif().unwrap(), SLACK_WIF);
        assert_eq!(
            hex::encode(*key_pair.private_key_bytes().unwrap()),
            "2bfe58ab6d9fd575bdc3a624e4825dd2b375d64ac033fbc46ea79dbab4f69a3e"
        );
    }

    #[test]
    fn test_from_wif_network_mismatch() {
        assert_eq!(
            KeyPair::from_wif(SLACK_WIF, &BITCOIN).unwrap_err(),
            PrimitivesError::InvalidNetworkVersion(0xaa)
        );
        assert_eq!(
            KeyPair::from_wif(SLACK_WIF, &[BITCOIN, SLACK_TESTNET]).unwrap_err(),
            PrimitivesError::UnknownNetworkVersion(0xaa)
        );
        let key_pair = KeyPair::from_wif(SLACK_WIF, &[BITCOIN, SLACK]).unwrap();
        assert_eq!(key_pair.network(), &SLACK);
    }

    #[test]
    fn test_wif_round_trip_uncompressed() {
        let key_pair = KeyPair::from_seed("slack", KeyPairOptions::new(BITCOIN).compressed(false))
            .unwrap();
        let text = key_pair.to_wif().unwrap();
        assert_eq!(text, "5JqxNUHPxEzENURFt8Jwh7X4Bwdw55VV1EpLWU8Au1HWP28omKM");
        assert_eq!(KeyPair::from_wif(&text, &BITCOIN).unwrap(), key_pair);
    }

    #[test]
    fn test_new_rejects_both_and_neither() {
        let private_key = PrivateKey::from_bytes(&[0x11; 32]).unwrap();
        let public_key = private_key.pub_key();
        assert_eq!(
            KeyPair::new(Some(private_key.clone()), Some(public_key), slack()).unwrap_err(),
            PrimitivesError::UnexpectedPublicKey
        );
        assert!(matches!(
            KeyPair::new(None, None, slack()),
            Err(PrimitivesError::InvalidPoint(_))
        ));
        let public_only = KeyPair::new(None, Some(public_key), slack()).unwrap();
        let private = KeyPair::new(Some(private_key), None, slack()).unwrap();
        assert_eq!(public_only.public_key(), private.public_key());
    }

    #[test]
    fn test_public_only_key_pair() {
        let bytes =
            hex::decode("0302cf6b3ed45e1cbf9d16fbc80e47de061c740b876df98519628fd7c532605860")
                .unwrap();
        let key_pair = KeyPair::from_public_key_bytes(&bytes, SLACK).unwrap();
        assert!(key_pair.is_compressed());
        assert!(key_pair.private_key().is_none());
        assert_eq!(key_pair.address(), "AH2hLkmmpWwAXW2Gcr6HZ3W1AoQZrE5amZ");
        assert_eq!(key_pair.to_wif(), Err(PrimitivesError::MissingPrivateKey));
        assert!(key_pair.private_key_bytes().is_none());
        assert_eq!(
            key_pair.sign(&[0u8; 32]).unwrap_err(),
            PrimitivesError::MissingPrivateKey
        );

        let uncompressed = KeyPair::from_seed("slack", slack().compressed(false)).unwrap();
        let parsed = KeyPair::from_public_key_bytes(&uncompressed.public_key_bytes(), SLACK).unwrap();
        assert!(!parsed.is_compressed());
        assert_eq!(parsed.address(), uncompressed.address());
    }

    // RFC6979 vectors (Trezor / CoreBitcoin).
    #[test]
    fn test_sign_rfc6979() {
        let vectors = [
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8\
                 02202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c\
                 022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];

        for (key_hex, message, expected_der) in vectors {
            let key_pair =
                KeyPair::from_private_key(PrivateKey::from_hex(key_hex).unwrap(), slack());
            let hash = sha256(message.as_bytes());
            let sig = key_pair.sign(&hash).unwrap();
            assert_eq!(hex::encode(sig.to_der().unwrap()), expected_der, "{}", message);
            assert!(key_pair.verify(&hash, &sig));
        }
    }

    #[test]
    fn test_verify_mismatch_is_false() {
        let key_pair = KeyPair::from_seed("slack", slack()).unwrap();
        let other = KeyPair::from_seed("other", slack()).unwrap();
        let hash = sha256(b"payload");
        let sig = key_pair.sign(&hash).unwrap();

        assert!(!other.verify(&hash, &sig));
        assert!(!key_pair.verify(&sha256(b"tampered"), &sig));
        assert!(!key_pair.verify(&hash[..31], &sig));
        let oversized = Signature::from_be_bytes(&[0x01; 33], &[0x01]);
        assert!(!key_pair.verify(&hash, &oversized));
    }

    #[test]
    fn test_verify_with_uncompressed_key() {
        let key_pair = KeyPair::from_seed("slack", slack().compressed(false)).unwrap();
        let hash = sha256(b"payload");
        let sig = key_pair.sign(&hash).unwrap();
        let public_only =
            KeyPair::from_public_key_bytes(&key_pair.public_key_bytes(), SLACK).unwrap();
        assert!(public_only.verify(&hash, &sig));
    }

    #[test]
    fn test_sign_rejects_short_hash() {
        let key_pair = KeyPair::from_seed("slack", slack()).unwrap();
        assert_eq!(
            key_pair.sign(b"short").unwrap_err(),
            PrimitivesError::InvalidLength {
                expected: 32,
                got: 5
            }
        );
    }

    #[test]
    fn test_compact_recovery() {
        let key_pair = KeyPair::from_seed("slack", slack()).unwrap();
        let hash = sha256(b"recover me");
        let signed = key_pair.sign_recoverable(&hash).unwrap();
        assert!(signed.compressed);

        let bytes = signed.signature.to_compact(signed.recovery_id, signed.compressed).unwrap();
        let parsed = Signature::from_compact(&bytes).unwrap();
        let recovered = KeyPair::recover_from_compact(&hash, &parsed, SLACK).unwrap();
        assert_eq!(recovered.address(), key_pair.address());
    }

    struct CountingRng {
        draws: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        // First draw is the all-0xff scalar (>= n), then a valid one.
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let byte = if self.draws == 0 { 0xff } else { 0x11 };
            self.draws += 1;
            dest.fill(byte);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for CountingRng {}

    #[test]
    fn test_make_random_redraws_out_of_range() {
        let mut rng = CountingRng { draws: 0 };
        let key_pair = KeyPair::make_random_with(&mut rng, slack());
        assert_eq!(rng.draws, 2);
        assert_eq!(key_pair.private_key().unwrap().to_bytes(), [0x11; 32]);
    }

    #[test]
    fn test_make_random_os_rng() {
        let a = KeyPair::make_random(slack());
        let b = KeyPair::make_random(slack());
        assert_ne!(a, b);
        let hash = sha256(b"random");
        assert!(a.verify(&hash, &a.sign(&hash).unwrap()));
    }

    #[test]
    fn test_public_key_is_memoized_across_threads() {
        let key_pair = KeyPair::from_seed("slack", slack()).unwrap();
        let expected = *KeyPair::from_seed("slack", slack()).unwrap().public_key();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| assert_eq!(*key_pair.public_key(), expected));
            }
        });
        assert!(std::ptr::eq(key_pair.public_key(), key_pair.public_key()));
    }
}
