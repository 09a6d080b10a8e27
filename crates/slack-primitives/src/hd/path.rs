//! BIP32 derivation paths such as `m/44'/0'/0/1`.

use std::fmt;
use std::str::FromStr;

use crate::hd::node::HARDENED_OFFSET;
use crate::PrimitivesError;

/// One step of a derivation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildIndex {
    /// Derive with `derive(index)`.
    Normal(u32),
    /// Derive with `derive_hardened(index)`; `index < 2^31`.
    Hardened(u32),
}

/// A parsed derivation path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    /// Path starts at a master node (`m` prefix).
    pub from_master: bool,
    /// Steps, applied left to right.
    pub steps: Vec<ChildIndex>,
}

impl FromStr for DerivationPath {
    type Err = PrimitivesError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut segments = path.split('/').peekable();
        let from_master = segments.peek() == Some(&"m");
        if from_master {
            segments.next();
        }

        let steps = segments
            .map(|segment| parse_segment(segment, path))
            .collect::<Result<Vec<_>, _>>()?;

        if !from_master && steps.is_empty() {
            return Err(PrimitivesError::InvalidPath(path.to_string()));
        }

        Ok(DerivationPath { from_master, steps })
    }
}

fn parse_segment(segment: &str, path: &str) -> Result<ChildIndex, PrimitivesError> {
    let (digits, hardened) = match segment.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (segment, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrimitivesError::InvalidPath(path.to_string()));
    }
    let index: u32 = digits
        .parse()
        .map_err(|_| PrimitivesError::InvalidPath(path.to_string()))?;

    if hardened {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidIndex(index));
        }
        Ok(ChildIndex::Hardened(index))
    } else {
        Ok(ChildIndex::Normal(index))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if self.from_master {
            f.write_str("m")?;
            first = false;
        }
        for step in &self.steps {
            if !first {
                f.write_str("/")?;
            }
            first = false;
            match step {
                ChildIndex::Normal(index) => write!(f, "{}", index)?,
                ChildIndex::Hardened(index) => write!(f, "{}'", index)?,
            }
        }
        Ok(())
    }
}
