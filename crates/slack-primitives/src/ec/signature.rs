//! ECDSA signature as an `(r, s)` pair of unsigned integers.
//!
//! Four wire formats are supported:
//! - compact (65 bytes): `header || r(32) || s(32)`, with
//!   `header = 27 + recovery_id + (4 if compressed)`
//! - recoverable (64 bytes): `r(32) || s(32)`, recovery id carried separately
//! - DER (BIP66 strict)
//! - script signature: `DER || hash_type`

use num_bigint::BigUint;
use num_traits::Zero;

use crate::ec::der;
use crate::PrimitivesError;

/// Length of a compact signature.
pub const COMPACT_LEN: usize = 65;

/// Length of a recoverable signature.
pub const RECOVERABLE_LEN: usize = 64;

/// Offset added to the compact header byte.
const COMPACT_HEADER_BASE: u8 = 27;

/// Header flag marking a compressed public key.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// Largest recovery id.
const MAX_RECOVERY_ID: u8 = 3;

/// "Anyone can pay" bit of a signature hash type.
const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// An ECDSA signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

/// A signature together with the metadata carried by the compact format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactSignature {
    /// The `(r, s)` pair.
    pub signature: Signature,
    /// Public key recovery id, 0..=3.
    pub recovery_id: u8,
    /// Whether the signer's key is serialized compressed.
    pub compressed: bool,
}

/// A signature parsed from a script, with its hash type byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptSignature {
    /// The `(r, s)` pair.
    pub signature: Signature,
    /// The trailing hash type byte.
    pub hash_type: u8,
}

impl Signature {
    /// Create a signature from its two components.
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Signature { r, s }
    }

    /// Create a signature from big-endian component bytes of any length.
    pub fn from_be_bytes(r: &[u8], s: &[u8]) -> Self {
        Signature {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        }
    }

    /// The `r` component.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// The `s` component.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Parse a 65-byte compact signature.
    ///
    /// # Returns
    /// `InvalidLength` unless exactly 65 bytes, `InvalidSignatureParameter`
    /// if the header is outside `27..=34`.
    pub fn from_compact(bytes: &[u8]) -> Result<CompactSignature, PrimitivesError> {
        if bytes.len() != COMPACT_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: COMPACT_LEN,
                got: bytes.len(),
            });
        }

        let flag = bytes[0].wrapping_sub(COMPACT_HEADER_BASE);
        if flag != flag & 7 {
            return Err(PrimitivesError::InvalidSignatureParameter(format!(
                "compact header {}",
                bytes[0]
            )));
        }

        Ok(CompactSignature {
            signature: Signature::from_be_bytes(&bytes[1..33], &bytes[33..65]),
            recovery_id: flag & MAX_RECOVERY_ID,
            compressed: flag & COMPACT_COMPRESSED_FLAG != 0,
        })
    }

    /// Serialize as a 65-byte compact signature.
    ///
    /// Fails with `InvalidSignatureParameter` if `recovery_id > 3` or if
    /// `r` or `s` does not fit in 32 bytes.
    pub fn to_compact(
        &self,
        recovery_id: u8,
        compressed: bool,
    ) -> Result<[u8; COMPACT_LEN], PrimitivesError> {
        check_recovery_id(recovery_id)?;

        let mut header = COMPACT_HEADER_BASE + recovery_id;
        if compressed {
            header += COMPACT_COMPRESSED_FLAG;
        }

        let mut out = [0u8; COMPACT_LEN];
        out[0] = header;
        out[1..].copy_from_slice(&self.to_recoverable()?);
        Ok(out)
    }

    /// Parse a 64-byte `r || s` signature with an out-of-band recovery id.
    pub fn from_recoverable(
        bytes: &[u8],
        recovery_id: u8,
    ) -> Result<CompactSignature, PrimitivesError> {
        if bytes.len() != RECOVERABLE_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: RECOVERABLE_LEN,
                got: bytes.len(),
            });
        }
        check_recovery_id(recovery_id)?;

        Ok(CompactSignature {
            signature: Signature::from_be_bytes(&bytes[..32], &bytes[32..]),
            recovery_id,
            compressed: false,
        })
    }

    /// Serialize as 64 bytes `r || s`, each left-padded to 32 bytes.
    ///
    /// Fails with `InvalidSignatureParameter` if either component is wider
    /// than 32 bytes.
    pub fn to_recoverable(&self) -> Result<[u8; RECOVERABLE_LEN], PrimitivesError> {
        let mut out = [0u8; RECOVERABLE_LEN];
        write_padded(&self.r, "r", &mut out[..32])?;
        write_padded(&self.s, "s", &mut out[32..])?;
        Ok(out)
    }

    /// Parse a strict (BIP66) DER signature.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let (r, s) = der::decode(bytes)?;
        Ok(Signature::from_be_bytes(r, s))
    }

    /// Serialize as a strict (BIP66) DER signature.
    pub fn to_der(&self) -> Result<Vec<u8>, PrimitivesError> {
        der::encode(&der_integer(&self.r), &der_integer(&self.s))
    }

    /// Parse `DER || hash_type` as found in a script.
    ///
    /// The hash type with the anyone-can-pay bit cleared must be 1, 2 or 3.
    pub fn from_script_signature(bytes: &[u8]) -> Result<ScriptSignature, PrimitivesError> {
        let (&hash_type, der_bytes) = bytes.split_last().ok_or(PrimitivesError::InvalidLength {
            expected: 9,
            got: 0,
        })?;
        check_hash_type(hash_type)?;

        Ok(ScriptSignature {
            signature: Signature::from_der(der_bytes)?,
            hash_type,
        })
    }

    /// Serialize as `DER || hash_type`.
    pub fn to_script_signature(&self, hash_type: u8) -> Result<Vec<u8>, PrimitivesError> {
        check_hash_type(hash_type)?;
        let mut out = self.to_der()?;
        out.push(hash_type);
        Ok(out)
    }
}

fn check_recovery_id(recovery_id: u8) -> Result<(), PrimitivesError> {
    if recovery_id > MAX_RECOVERY_ID {
        return Err(PrimitivesError::InvalidSignatureParameter(format!(
            "recovery id {}",
            recovery_id
        )));
    }
    Ok(())
}

fn check_hash_type(hash_type: u8) -> Result<(), PrimitivesError> {
    let base = hash_type & !SIGHASH_ANYONECANPAY;
    if base == 0 || base > 3 {
        return Err(PrimitivesError::InvalidHashType(hash_type));
    }
    Ok(())
}

/// Write `value` big-endian into `out`, left-padded with zeros.
fn write_padded(value: &BigUint, name: &str, out: &mut [u8]) -> Result<(), PrimitivesError> {
    if value.is_zero() {
        out.fill(0);
        return Ok(());
    }
    let bytes = value.to_bytes_be();
    if bytes.len() > out.len() {
        return Err(PrimitivesError::InvalidSignatureParameter(format!(
            "{} is {} bytes, expected at most {}",
            name,
            bytes.len(),
            out.len()
        )));
    }
    let offset = out.len() - bytes.len();
    out[..offset].fill(0);
    out[offset..].copy_from_slice(&bytes);
    Ok(())
}

/// Minimal two's complement encoding of a non-negative integer.
fn der_integer(value: &BigUint) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(bytes.len() + 1);
        padded.push(0x00);
        padded.extend_from_slice(&bytes);
        padded
    } else {
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R_HEX: &str = "4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41";
    const S_HEX: &str = "181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09";
    const HIGH_R_HEX: &str = "a196ed0e7ebcbe7b63fe1d8eecbdbde03a67ceba4fc8f6482bdcb9606a911404";

    fn fixture() -> Signature {
        Signature::from_be_bytes(&hex::decode(R_HEX).unwrap(), &hex::decode(S_HEX).unwrap())
    }

    #[test]
    fn test_compact_round_trip() {
        let sig = fixture();
        for recovery_id in 0..=3u8 {
            for compressed in [false, true] {
                let compact = sig.to_compact(recovery_id, compressed).unwrap();
                let expected_header = 27 + recovery_id + if compressed { 4 } else { 0 };
                assert_eq!(compact[0], expected_header);

                let parsed = Signature::from_compact(&compact).unwrap();
                assert_eq!(parsed.signature, sig);
                assert_eq!(parsed.recovery_id, recovery_id);
                assert_eq!(parsed.compressed, compressed);
            }
        }
    }

    #[test]
    fn test_compact_wrong_length() {
        for len in [0usize, 64, 66] {
            assert_eq!(
                Signature::from_compact(&vec![31u8; len]),
                Err(PrimitivesError::InvalidLength {
                    expected: 65,
                    got: len
                })
            );
        }
    }

    #[test]
    fn test_compact_header_out_of_range() {
        let mut bytes = [0u8; 65];
        for header in [35u8, 26, 0, 255] {
            bytes[0] = header;
            assert!(matches!(
                Signature::from_compact(&bytes),
                Err(PrimitivesError::InvalidSignatureParameter(_))
            ));
        }
        bytes[0] = 34;
        let parsed = Signature::from_compact(&bytes).unwrap();
        assert_eq!(parsed.recovery_id, 3);
        assert!(parsed.compressed);
    }

    #[test]
    fn test_compact_rejects_bad_recovery_id() {
        assert!(matches!(
            fixture().to_compact(4, true),
            Err(PrimitivesError::InvalidSignatureParameter(_))
        ));
    }

    #[test]
    fn test_recoverable_left_pads() {
        let sig = Signature::new(BigUint::from(1u8), BigUint::zero());
        let bytes = sig.to_recoverable().unwrap();
        assert_eq!(bytes[31], 1);
        assert!(bytes[..31].iter().all(|&b| b == 0));
        assert!(bytes[32..].iter().all(|&b| b == 0));

        let parsed = Signature::from_recoverable(&bytes, 1).unwrap();
        assert_eq!(parsed.signature, sig);
        assert_eq!(parsed.recovery_id, 1);
        assert!(!parsed.compressed);
    }

    #[test]
    fn test_recoverable_rejects_oversized_component() {
        let too_wide = BigUint::from_bytes_be(&[0x01; 33]);
        let sig = Signature::new(too_wide, BigUint::from(1u8));
        assert!(matches!(
            sig.to_recoverable(),
            Err(PrimitivesError::InvalidSignatureParameter(_))
        ));
        assert!(sig.to_compact(0, true).is_err());
    }

    #[test]
    fn test_recoverable_wrong_length() {
        assert_eq!(
            Signature::from_recoverable(&[0u8; 65], 0),
            Err(PrimitivesError::InvalidLength {
                expected: 64,
                got: 65
            })
        );
    }

    #[test]
    fn test_der_serialize() {
        let expected = format!("30440220{}0220{}", R_HEX, S_HEX);
        assert_eq!(hex::encode(fixture().to_der().unwrap()), expected);
        assert_eq!(
            Signature::from_der(&hex::decode(&expected).unwrap()).unwrap(),
            fixture()
        );
    }

    #[test]
    fn test_der_pads_high_bit() {
        let sig = Signature::from_be_bytes(
            &hex::decode(HIGH_R_HEX).unwrap(),
            &hex::decode(S_HEX).unwrap(),
        );
        let der = sig.to_der().unwrap();
        assert_eq!(hex::encode(&der[..6]), "3045022100a1");
        assert_eq!(Signature::from_der(&der).unwrap(), sig);
    }

    #[test]
    fn test_der_zero_signature() {
        let sig = Signature::new(BigUint::zero(), BigUint::zero());
        assert_eq!(
            sig.to_der().unwrap(),
            vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]
        );
    }

    #[test]
    fn test_script_signature_round_trip() {
        let sig = fixture();
        for hash_type in [0x01u8, 0x02, 0x03, 0x81, 0x82, 0x83] {
            let script_sig = sig.to_script_signature(hash_type).unwrap();
            assert_eq!(*script_sig.last().unwrap(), hash_type);
            let parsed = Signature::from_script_signature(&script_sig).unwrap();
            assert_eq!(parsed.signature, sig);
            assert_eq!(parsed.hash_type, hash_type);
        }
    }

    #[test]
    fn test_script_signature_bad_hash_type() {
        let sig = fixture();
        for hash_type in [0x00u8, 0x04, 0x80, 0x84, 0x41] {
            assert_eq!(
                sig.to_script_signature(hash_type),
                Err(PrimitivesError::InvalidHashType(hash_type))
            );
            let mut bytes = sig.to_der().unwrap();
            bytes.push(hash_type);
            assert_eq!(
                Signature::from_script_signature(&bytes),
                Err(PrimitivesError::InvalidHashType(hash_type))
            );
        }
        assert!(Signature::from_script_signature(&[]).is_err());
    }
}
