use crate::{
    Result,
    constants::{MAX_FRAME_BITS, MAX_UID_BYTES},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single Wiegand bit, signalled by a pulse on D0 (zero) or D1 (one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    Zero = 0,
    One = 1,
}

impl Bit {
    /// Create a bit from a u8 value.
    ///
    /// # Errors
    /// Returns `Error::InvalidBit` if the value is not 0 or 1.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            _ => Err(Error::InvalidBit(value)),
        }
    }

    /// Convert the bit to a u8 value.
    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` if the bit is set.
    #[inline]
    #[must_use]
    pub fn is_one(self) -> bool {
        matches!(self, Bit::One)
    }

    /// Parse a textual bit sequence such as `"1011 0100"`.
    ///
    /// Whitespace and `_` separators are ignored.
    ///
    /// # Errors
    /// Returns `Error::InvalidBit` for any character other than `0`, `1`,
    /// whitespace or `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegate_core::Bit;
    ///
    /// let bits = Bit::parse_sequence("1011_0100").unwrap();
    /// assert_eq!(bits.len(), 8);
    /// assert_eq!(bits[0], Bit::One);
    /// ```
    pub fn parse_sequence(s: &str) -> Result<Vec<Bit>> {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .map(|c| match c {
                '0' => Ok(Bit::Zero),
                '1' => Ok(Bit::One),
                other => Err(Error::InvalidBit(u8::try_from(other).unwrap_or(u8::MAX))),
            })
            .collect()
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_u8())
    }
}

/// Canonical card identifier derived from a Wiegand frame.
///
/// Frame bits are packed MSB-first and left-aligned, 8 bits per byte; a
/// trailing partial byte is padded with zero bits on the right. The UID is a
/// fixed-size value so it can be produced and passed around without
/// allocating.
///
/// Two UIDs are equal when their byte sequences are equal, regardless of the
/// bit count they were packed from.
///
/// # Examples
///
/// ```
/// use wiegate_core::{Bit, Uid};
///
/// let uid = Uid::from_bits(&[Bit::One, Bit::Zero, Bit::One, Bit::One]).unwrap();
/// assert_eq!(uid.as_bytes(), &[0xB0]);
/// assert_eq!(uid.to_hex(), "B0");
/// assert_eq!(uid.bit_count(), 4);
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Uid {
    bytes: [u8; MAX_UID_BYTES],
    len: u8,
    bits: u8,
}

impl Uid {
    /// Pack a frame held right-aligned in `value` (last received bit in the
    /// least significant position).
    ///
    /// # Errors
    /// Returns `Error::EmptyFrame` for a zero bit count and
    /// `Error::FrameTooLong` above [`MAX_FRAME_BITS`].
    pub fn from_frame(value: u64, bit_count: usize) -> Result<Self> {
        if bit_count == 0 {
            return Err(Error::EmptyFrame);
        }
        if bit_count > MAX_FRAME_BITS {
            return Err(Error::FrameTooLong {
                bits: bit_count,
                max: MAX_FRAME_BITS,
            });
        }

        // Left-align so the first received bit lands in the MSB of byte 0
        let aligned = if bit_count == MAX_FRAME_BITS {
            value
        } else {
            (value & ((1u64 << bit_count) - 1)) << (MAX_FRAME_BITS - bit_count)
        };

        let len = bit_count.div_ceil(8);
        let mut bytes = [0u8; MAX_UID_BYTES];
        bytes[..len].copy_from_slice(&aligned.to_be_bytes()[..len]);

        Ok(Self {
            bytes,
            len: len as u8,
            bits: bit_count as u8,
        })
    }

    /// Pack an ordered bit sequence.
    ///
    /// # Errors
    /// Same conditions as [`Uid::from_frame`].
    pub fn from_bits(bits: &[Bit]) -> Result<Self> {
        if bits.len() > MAX_FRAME_BITS {
            return Err(Error::FrameTooLong {
                bits: bits.len(),
                max: MAX_FRAME_BITS,
            });
        }
        let value = bits
            .iter()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit.to_u8()));
        Self::from_frame(value, bits.len())
    }

    /// Build a UID from raw bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if `bytes` is empty or longer than
    /// [`MAX_UID_BYTES`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > MAX_UID_BYTES {
            return Err(Error::InvalidUid(format!(
                "UID must be 1-{MAX_UID_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; MAX_UID_BYTES];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len() as u8,
            bits: (bytes.len() * 8) as u8,
        })
    }

    /// Get the packed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Number of packed bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Always `false`: a UID holds at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of frame bits the UID was packed from.
    #[must_use]
    pub fn bit_count(&self) -> usize {
        usize::from(self.bits)
    }

    /// Uppercase hexadecimal form, the registry representation of a card.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl PartialEq for Uid {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Uid {}

impl Hash for Uid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.as_bytes() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Uid({self}, {} bits)", self.bits)
    }
}

impl std::str::FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim();
        if hex.is_empty() || hex.len() % 2 != 0 {
            return Err(Error::InvalidUid(format!(
                "Hex UID must have an even, non-zero number of digits: '{s}'"
            )));
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| {
                hex.get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| Error::InvalidUid(format!("Invalid hex digits in '{s}'")))
            })
            .collect::<Result<Vec<u8>>>()?;
        Uid::from_bytes(&bytes)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.to_hex()
    }
}

impl TryFrom<String> for Uid {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bits(s: &str) -> Vec<Bit> {
        Bit::parse_sequence(s).unwrap()
    }

    #[rstest]
    #[case("1011", &[0xB0])]
    #[case("10110100", &[0xB4])]
    #[case("1", &[0x80])]
    #[case("0", &[0x00])]
    #[case("101101001", &[0xB4, 0x80])]
    #[case("11111111_00000001", &[0xFF, 0x01])]
    fn test_uid_packing(#[case] input: &str, #[case] expected: &[u8]) {
        let uid = Uid::from_bits(&bits(input)).unwrap();
        assert_eq!(uid.as_bytes(), expected);
        assert_eq!(uid.len(), expected.len());
    }

    #[test]
    fn test_uid_packing_26_bit_frame() {
        // Typical H10301 frame: 26 bits -> 4 bytes, last byte holds 2 bits
        let frame = bits("1_00000001_0000000000000001_1");
        assert_eq!(frame.len(), 26);

        let uid = Uid::from_bits(&frame).unwrap();
        assert_eq!(uid.len(), 4);
        assert_eq!(uid.bit_count(), 26);
        assert_eq!(uid.as_bytes(), &[0x80, 0x80, 0x00, 0xC0]);
    }

    #[test]
    fn test_uid_packing_full_frame() {
        let frame = vec![Bit::One; MAX_FRAME_BITS];
        let uid = Uid::from_bits(&frame).unwrap();
        assert_eq!(uid.as_bytes(), &[0xFF; 8]);
        assert_eq!(uid.bit_count(), 64);
    }

    #[test]
    fn test_uid_from_frame_masks_stale_high_bits() {
        // Only the low 4 bits belong to the frame
        let uid = Uid::from_frame(0xF0 | 0b1011, 4).unwrap();
        assert_eq!(uid.as_bytes(), &[0xB0]);
    }

    #[test]
    fn test_uid_empty_frame_rejected() {
        assert_eq!(Uid::from_bits(&[]), Err(Error::EmptyFrame));
        assert_eq!(Uid::from_frame(0, 0), Err(Error::EmptyFrame));
    }

    #[test]
    fn test_uid_oversized_frame_rejected() {
        let frame = vec![Bit::Zero; MAX_FRAME_BITS + 1];
        assert!(matches!(
            Uid::from_bits(&frame),
            Err(Error::FrameTooLong { bits: 65, max: 64 })
        ));
    }

    #[rstest]
    #[case("B4", &[0xB4])]
    #[case("b4", &[0xB4])]
    #[case(" 04ABCDEF ", &[0x04, 0xAB, 0xCD, 0xEF])]
    fn test_uid_from_hex(#[case] input: &str, #[case] expected: &[u8]) {
        let uid: Uid = input.parse().unwrap();
        assert_eq!(uid.as_bytes(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ABC")]
    #[case("ZZ")]
    #[case("000102030405060708090A0B0C0D0E0F10")] // 17 bytes
    fn test_uid_from_hex_invalid(#[case] input: &str) {
        assert!(input.parse::<Uid>().is_err());
    }

    #[test]
    fn test_uid_equality_ignores_bit_count() {
        let from_bits = Uid::from_bits(&bits("10110100")).unwrap();
        let from_nibble = Uid::from_bits(&bits("101101")).unwrap();
        let from_hex: Uid = "B4".parse().unwrap();

        assert_eq!(from_bits, from_nibble);
        assert_eq!(from_bits, from_hex);
        assert_ne!(from_bits.bit_count(), from_nibble.bit_count());
    }

    #[test]
    fn test_uid_display_and_debug() {
        let uid: Uid = "04abcdef".parse().unwrap();
        assert_eq!(uid.to_string(), "04ABCDEF");
        assert_eq!(uid.to_hex(), "04ABCDEF");
        assert_eq!(format!("{uid:?}"), "Uid(04ABCDEF, 32 bits)");
    }

    #[test]
    fn test_uid_serializes_as_hex_string() {
        let uid: Uid = "B4".parse().unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"B4\"");

        let back: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }

    #[test]
    fn test_bit_conversions() {
        assert_eq!(Bit::from_u8(0).unwrap(), Bit::Zero);
        assert_eq!(Bit::from_u8(1).unwrap(), Bit::One);
        assert_eq!(Bit::from_u8(2), Err(Error::InvalidBit(2)));
        assert_eq!(Bit::from(true), Bit::One);
        assert!(Bit::One.is_one());
        assert_eq!(Bit::Zero.to_string(), "0");
    }

    #[test]
    fn test_bit_parse_sequence_rejects_garbage() {
        assert!(Bit::parse_sequence("10x1").is_err());
        assert!(Bit::parse_sequence("").unwrap().is_empty());
    }
}
