//! BIP32 hierarchical deterministic key nodes.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>.
//! Nodes are immutable: deriving or neutering returns a new node and leaves
//! the parent untouched.

use k256::elliptic_curve::PrimeField;
use k256::Scalar;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::base58;
use crate::ec::key_pair::{KeyPair, KeyPairOptions};
use crate::ec::network::{Network, NetworkSelector};
use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::{PublicKey, COMPRESSED_LEN};
use crate::ec::signature::Signature;
use crate::hash::{hash160, sha512_hmac};
use crate::hd::path::{ChildIndex, DerivationPath};
use crate::PrimitivesError;

/// First hardened child index (`2^31`).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Length of a serialized extended key.
pub const EXTENDED_KEY_LEN: usize = 78;

/// HMAC key for master node generation.
const MASTER_SECRET: &[u8] = b"Bitcoin seed";

/// Accepted master seed lengths in bytes.
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// Cap on the out-of-range retries of a single derivation.
const MAX_DERIVATION_ATTEMPTS: u32 = 16;

/// A BIP32 node: a compressed key pair plus chain code and tree position.
#[derive(Clone, PartialEq, Eq)]
pub struct HdNode {
    key_pair: KeyPair,
    chain_code: [u8; 32],
    depth: u8,
    index: u32,
    parent_fingerprint: u32,
}

impl HdNode {
    /// Wrap a key pair as a master-position node.
    ///
    /// # Returns
    /// `InvalidPoint` if the key pair is not compressed.
    pub fn new(key_pair: KeyPair, chain_code: [u8; 32]) -> Result<Self, PrimitivesError> {
        if !key_pair.is_compressed() {
            return Err(PrimitivesError::InvalidPoint(
                "BIP32 only allows compressed key pairs".to_string(),
            ));
        }
        Ok(HdNode {
            key_pair,
            chain_code,
            depth: 0,
            index: 0,
            parent_fingerprint: 0,
        })
    }

    /// Generate a master node from 16..=64 bytes of seed.
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        if seed.len() < MIN_SEED_LEN || seed.len() > MAX_SEED_LEN {
            return Err(PrimitivesError::InvalidSeedLength(seed.len()));
        }

        let i = Zeroizing::new(sha512_hmac(MASTER_SECRET, seed));
        let private_key = PrivateKey::from_bytes(&i[..32])?;
        Self::new(
            KeyPair::from_private_key(private_key, KeyPairOptions::new(network)),
            split_chain_code(&i),
        )
    }

    /// Generate a master node from a hex-encoded seed.
    pub fn from_seed_hex(seed_hex: &str, network: Network) -> Result<Self, PrimitivesError> {
        let seed = Zeroizing::new(hex::decode(seed_hex)?);
        Self::from_seed(&seed, network)
    }

    /// Parse a Base58Check extended key (`xprv`/`xpub` style).
    ///
    /// The version word selects both the network among `networks` and
    /// whether the key data is private or public.
    pub fn from_extended_key<'a>(
        text: &str,
        networks: impl Into<NetworkSelector<'a>>,
    ) -> Result<Self, PrimitivesError> {
        let buffer = Zeroizing::new(base58::check_decode(text)?);
        if buffer.len() != EXTENDED_KEY_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: EXTENDED_KEY_LEN,
                got: buffer.len(),
            });
        }

        let version = read_u32(&buffer[0..4]);
        let selector: NetworkSelector<'a> = networks.into();
        let network = selector.resolve_bip32(version)?;

        let depth = buffer[4];
        let parent_fingerprint = read_u32(&buffer[5..9]);
        let index = read_u32(&buffer[9..13]);
        if depth == 0 {
            if parent_fingerprint != 0 {
                return Err(PrimitivesError::InvalidMasterNode(format!(
                    "parent fingerprint {:#010x}",
                    parent_fingerprint
                )));
            }
            if index != 0 {
                return Err(PrimitivesError::InvalidMasterNode(format!(
                    "index {:#x}",
                    index
                )));
            }
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&buffer[13..45]);

        let key_data = &buffer[45..EXTENDED_KEY_LEN];
        let options = KeyPairOptions::new(network);
        let key_pair = if version == network.bip32.private {
            if key_data[0] != 0x00 {
                return Err(PrimitivesError::InvalidPrivateKey(
                    "extended private key data must start with 0x00".to_string(),
                ));
            }
            KeyPair::from_private_key(PrivateKey::from_bytes(&key_data[1..])?, options)
        } else {
            if key_data[0] != 0x02 && key_data[0] != 0x03 {
                return Err(PrimitivesError::InvalidPoint(
                    "extended public key must be compressed".to_string(),
                ));
            }
            KeyPair::from_public_key(PublicKey::from_bytes(key_data)?, options)
        };

        Ok(HdNode {
            key_pair,
            chain_code,
            depth,
            index,
            parent_fingerprint,
        })
    }

    /// Serialize as a Base58Check extended key.
    ///
    /// The version word is the network's private version unless the node is
    /// neutered.
    pub fn to_extended_key(&self) -> String {
        let network = self.key_pair.network();
        let mut buffer = Zeroizing::new(Vec::with_capacity(EXTENDED_KEY_LEN));

        match self.key_pair.private_key() {
            Some(private_key) => {
                buffer.extend_from_slice(&network.bip32.private.to_be_bytes());
                self.write_position(&mut buffer);
                buffer.push(0x00);
                buffer.extend_from_slice(&Zeroizing::new(private_key.to_bytes())[..]);
            }
            None => {
                buffer.extend_from_slice(&network.bip32.public.to_be_bytes());
                self.write_position(&mut buffer);
                buffer.extend_from_slice(&self.key_pair.public_key().to_compressed());
            }
        }

        base58::check_encode(&buffer)
    }

    fn write_position(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.depth);
        buffer.extend_from_slice(&self.parent_fingerprint.to_be_bytes());
        buffer.extend_from_slice(&self.index.to_be_bytes());
        buffer.extend_from_slice(&self.chain_code);
    }

    /// hash160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key_bytes())
    }

    /// First four bytes of the identifier.
    pub fn fingerprint(&self) -> [u8; 4] {
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&self.identifier()[..4]);
        fingerprint
    }

    /// The node's key pair.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// The 32-byte chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Distance from the master node.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Child index this node was derived at.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Fingerprint of the parent, 0 for a master node.
    pub fn parent_fingerprint(&self) -> u32 {
        self.parent_fingerprint
    }

    /// The network this node is bound to.
    pub fn network(&self) -> &Network {
        self.key_pair.network()
    }

    /// Compressed SEC1 public key.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.key_pair.public_key_bytes()
    }

    /// Base58Check address of the node's key.
    pub fn address(&self) -> String {
        self.key_pair.address()
    }

    /// Sign a 32-byte hash; fails on a neutered node.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        self.key_pair.sign(hash)
    }

    /// Verify `signature` over a 32-byte hash.
    pub fn verify(&self, hash: &[u8], signature: &Signature) -> bool {
        self.key_pair.verify(hash, signature)
    }

    /// True iff no private scalar is held.
    pub fn is_neutered(&self) -> bool {
        self.key_pair.private_key().is_none()
    }

    /// A public-only copy of this node at the same tree position.
    pub fn neutered(&self) -> HdNode {
        HdNode {
            key_pair: KeyPair::from_public_key(
                *self.key_pair.public_key(),
                KeyPairOptions::new(*self.key_pair.network()),
            ),
            chain_code: self.chain_code,
            depth: self.depth,
            index: self.index,
            parent_fingerprint: self.parent_fingerprint,
        }
    }

    /// Derive child `index`; indexes `>= 2^31` are hardened.
    ///
    /// When the HMAC output is out of range for an index, the next index is
    /// used instead, as BIP32 prescribes. The child's `index()` reports the
    /// index actually used.
    pub fn derive(&self, index: u32) -> Result<HdNode, PrimitivesError> {
        self.derive_with(index, |candidate| self.derive_child_key(candidate))
    }

    /// Run `attempt` from `index` upwards until it yields a child key.
    fn derive_with<F>(&self, index: u32, mut attempt: F) -> Result<HdNode, PrimitivesError>
    where
        F: FnMut(u32) -> Result<Option<(KeyPair, [u8; 32])>, PrimitivesError>,
    {
        let depth = self.depth.checked_add(1).ok_or(PrimitivesError::DepthOverflow)?;
        let parent_fingerprint = u32::from_be_bytes(self.fingerprint());

        let mut candidate = index;
        for _ in 0..MAX_DERIVATION_ATTEMPTS {
            if let Some((key_pair, chain_code)) = attempt(candidate)? {
                debug!(
                    depth,
                    index = candidate,
                    hardened = candidate >= HARDENED_OFFSET,
                    "derived child node"
                );
                return Ok(HdNode {
                    key_pair,
                    chain_code,
                    depth,
                    index: candidate,
                    parent_fingerprint,
                });
            }
            warn!(index = candidate, "invalid child key, skipping to next index");
            candidate = candidate
                .checked_add(1)
                .ok_or(PrimitivesError::InvalidIndex(candidate))?;
        }

        Err(PrimitivesError::DerivationExhausted(index))
    }

    /// Derive hardened child `index + 2^31`; requires `index < 2^31`.
    pub fn derive_hardened(&self, index: u32) -> Result<HdNode, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidIndex(index));
        }
        self.derive(index + HARDENED_OFFSET)
    }

    /// Derive along a path such as `m/0'/1`.
    ///
    /// A leading `m` requires this node to be a master (parent fingerprint 0).
    pub fn derive_path(&self, path: &str) -> Result<HdNode, PrimitivesError> {
        let path: DerivationPath = path.parse()?;
        if path.from_master && self.parent_fingerprint != 0 {
            return Err(PrimitivesError::NotMasterNode);
        }

        path.steps
            .iter()
            .try_fold(self.clone(), |node, step| match *step {
                ChildIndex::Normal(index) => node.derive(index),
                ChildIndex::Hardened(index) => node.derive_hardened(index),
            })
    }

    /// One CKD attempt. `Ok(None)` means `index` yields no valid key.
    fn derive_child_key(
        &self,
        index: u32,
    ) -> Result<Option<(KeyPair, [u8; 32])>, PrimitivesError> {
        let mut data = Zeroizing::new(Vec::with_capacity(COMPRESSED_LEN + 4));
        if index >= HARDENED_OFFSET {
            // 0x00 || ser256(k_par) || ser32(i)
            let private_key = self
                .key_pair
                .private_key()
                .ok_or(PrimitivesError::CannotDeriveHardenedFromPublic)?;
            data.push(0x00);
            data.extend_from_slice(&Zeroizing::new(private_key.to_bytes())[..]);
        } else {
            // serP(K_par) || ser32(i)
            data.extend_from_slice(&self.key_pair.public_key().to_compressed());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = Zeroizing::new(sha512_hmac(&self.chain_code, &data));
        let il: Option<Scalar> =
            Scalar::from_repr(k256::FieldBytes::clone_from_slice(&i[..32])).into();
        let il = match il {
            Some(il) => Zeroizing::new(il),
            None => return Ok(None),
        };

        let options = KeyPairOptions::new(*self.key_pair.network());
        let key_pair = match self.key_pair.private_key() {
            // k_i = parse256(I_L) + k_par (mod n)
            Some(private_key) => private_key
                .tweak_add(&il)
                .map(|child| KeyPair::from_private_key(child, options)),
            // K_i = point(parse256(I_L)) + K_par
            None => self
                .key_pair
                .public_key()
                .tweak_add(&il)
                .map(|child| KeyPair::from_public_key(child, options)),
        };

        Ok(key_pair.map(|key_pair| (key_pair, split_chain_code(&i))))
    }
}

impl std::fmt::Debug for HdNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdNode")
            .field("key_pair", &self.key_pair)
            .field("chain_code", &"[redacted]")
            .field("depth", &self.depth)
            .field("index", &self.index)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .finish()
    }
}

fn split_chain_code(i: &[u8; 64]) -> [u8; 32] {
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&i[32..]);
    chain_code
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_be_bytes(word)
}
