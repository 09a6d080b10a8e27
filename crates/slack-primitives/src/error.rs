/// Unified error type for all primitives operations.
///
/// Covers errors from key construction, signature encodings, network
/// resolution, base58/WIF decoding, and BIP32 derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("unexpected public key: a private key was also supplied")]
    UnexpectedPublicKey,

    #[error("invalid network version: {0:#x}")]
    InvalidNetworkVersion(u32),

    #[error("unknown network version: {0:#x}")]
    UnknownNetworkVersion(u32),

    #[error("invalid seed length: {0} bytes, expected 16..=64")]
    InvalidSeedLength(usize),

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid signature parameter: {0}")]
    InvalidSignatureParameter(String),

    #[error("invalid hash type: {0:#04x}")]
    InvalidHashType(u8),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("missing private key")]
    MissingPrivateKey,

    #[error("cannot derive hardened child from a public-only node")]
    CannotDeriveHardenedFromPublic,

    #[error("not a master node")]
    NotMasterNode,

    #[error("invalid master node: {0}")]
    InvalidMasterNode(String),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("invalid child index: {0:#x}")]
    InvalidIndex(u32),

    #[error("derivation depth exceeds 255")]
    DepthOverflow,

    #[error("no valid child key found starting from index {0:#x}")]
    DerivationExhausted(u32),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
