//! Slack cryptographic primitives.
//!
//! This crate provides the key handling behind Slack wallets:
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, hash160, HMAC-SHA512)
//! - Base58 and Base58Check encoding, WIF private keys
//! - secp256k1 key pairs bound to a network, with address derivation
//! - ECDSA signatures in compact, recoverable, DER and script-sig form
//! - BIP32 hierarchical deterministic nodes and derivation paths

pub mod hash;
pub mod base58;
pub mod wif;
pub mod ec;
pub mod hd;

mod error;
pub use error::PrimitivesError;
