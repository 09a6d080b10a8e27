#![deny(missing_docs)]

//! Slack SDK - key management core.
//!
//! Re-exports the Slack SDK components for convenient single-crate usage.

pub use slack_primitives as primitives;
pub use slack_primitives::ec::{
    CompactSignature, KeyPair, KeyPairOptions, Network, NetworkSelector, ScriptSignature,
    Signature, BITCOIN, SLACK, SLACK_TESTNET,
};
pub use slack_primitives::hd::{DerivationPath, HdNode};
pub use slack_primitives::PrimitivesError;
