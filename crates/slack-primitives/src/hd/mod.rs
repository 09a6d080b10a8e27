//! BIP32 hierarchical deterministic keys.

pub mod node;
pub mod path;

pub use node::{HdNode, HARDENED_OFFSET};
pub use path::{ChildIndex, DerivationPath};
