//! Strict DER codec for ECDSA signatures (BIP66).
//!
//! Format: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`. Integers are
//! big-endian two's complement, must be non-negative and minimally encoded.
//! This layer moves raw integer bytes only; converting them to numbers is
//! done by [`Signature`](crate::ec::Signature).

use crate::PrimitivesError;

/// Shortest possible encoding: two one-byte integers.
const MIN_DER_LEN: usize = 8;

/// Longest encoding allowed by BIP66.
const MAX_DER_LEN: usize = 72;

/// Longest DER integer produced for a 256-bit value (sign-padding byte included).
const MAX_INT_LEN: usize = 33;

/// Decode a DER signature into its raw `(r, s)` integer bytes.
pub fn decode(bytes: &[u8]) -> Result<(&[u8], &[u8]), PrimitivesError> {
    let len = bytes.len();
    if len < MIN_DER_LEN {
        return Err(malformed("DER sequence length is too short"));
    }
    if len > MAX_DER_LEN {
        return Err(malformed("DER sequence length is too long"));
    }
    if bytes[0] != 0x30 {
        return Err(malformed("expected DER sequence"));
    }
    if bytes[1] as usize != len - 2 {
        return Err(malformed("DER sequence length is invalid"));
    }
    if bytes[2] != 0x02 {
        return Err(malformed("expected DER integer"));
    }

    let r_len = bytes[3] as usize;
    if r_len == 0 {
        return Err(malformed("R length is zero"));
    }
    if 5 + r_len >= len {
        return Err(malformed("R length is too long"));
    }
    if bytes[4 + r_len] != 0x02 {
        return Err(malformed("expected DER integer (2)"));
    }

    let s_len = bytes[5 + r_len] as usize;
    if s_len == 0 {
        return Err(malformed("S length is zero"));
    }
    if 6 + r_len + s_len != len {
        return Err(malformed("S length is invalid"));
    }

    let r = &bytes[4..4 + r_len];
    let s = &bytes[6 + r_len..];
    check_int(r, "R")?;
    check_int(s, "S")?;

    Ok((r, s))
}

/// Encode raw DER integer bytes as a signature sequence.
///
/// Both integers must already be in minimal two's complement form.
pub fn encode(r: &[u8], s: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
    if r.is_empty() {
        return Err(malformed("R length is zero"));
    }
    if s.is_empty() {
        return Err(malformed("S length is zero"));
    }
    if r.len() > MAX_INT_LEN {
        return Err(malformed("R length is too long"));
    }
    if s.len() > MAX_INT_LEN {
        return Err(malformed("S length is too long"));
    }
    check_int(r, "R")?;
    check_int(s, "S")?;

    let mut out = Vec::with_capacity(6 + r.len() + s.len());
    out.push(0x30);
    out.push((4 + r.len() + s.len()) as u8);
    out.push(0x02);
    out.push(r.len() as u8);
    out.extend_from_slice(r);
    out.push(0x02);
    out.push(s.len() as u8);
    out.extend_from_slice(s);
    Ok(out)
}

/// Reject negative and excessively padded integers.
fn check_int(int: &[u8], name: &str) -> Result<(), PrimitivesError> {
    if int[0] & 0x80 != 0 {
        return Err(malformed(&format!("{} value is negative", name)));
    }
    if int.len() > 1 && int[0] == 0x00 && int[1] & 0x80 == 0 {
        return Err(malformed(&format!("{} value excessively padded", name)));
    }
    Ok(())
}

fn malformed(reason: &str) -> PrimitivesError {
    PrimitivesError::InvalidSignature(format!("malformed DER: {}", reason))
}
