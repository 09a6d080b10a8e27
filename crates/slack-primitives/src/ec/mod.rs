//! Elliptic curve cryptography on secp256k1.
//!
//! Provides private and public keys, network descriptors, key pairs and
//! ECDSA signatures with their wire encodings.

pub mod der;
pub mod key_pair;
pub mod network;
pub mod private_key;
pub mod public_key;
pub mod signature;

pub use key_pair::{KeyPair, KeyPairOptions};
pub use network::{Bip32Versions, Network, NetworkSelector, BITCOIN, SLACK, SLACK_TESTNET};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{CompactSignature, ScriptSignature, Signature};
