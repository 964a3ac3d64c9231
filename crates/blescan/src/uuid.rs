use rand::RngCore;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An opaque 128-bit application identifier.
///
/// Callers pick one per scanner registration and get it back, unchanged, in the
/// registration callback. The value is stored in little-endian byte order, which
/// is also the layout the controller interface uses (see [`HalUuid`]).
///
/// [`HalUuid`]: crate::scanner::HalUuid
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Uuid {
    bytes: [u8; 16],
}

impl Uuid {
    /// Creates a UUID directly from 16 bytes (little-endian).
    pub const fn from_bytes_le(bytes: [u8; 16]) -> Self {
        Uuid { bytes }
    }

    /// Creates a UUID directly from 16 bytes (big-endian).
    pub fn from_bytes_be(mut bytes: [u8; 16]) -> Self {
        bytes.reverse();
        Uuid { bytes }
    }

    /// Generates a random (Version 4) UUID.
    pub fn new_random_v4() -> Self {
        let mut bytes_be = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes_be);

        // xxxxxxxx-xxxx-4xxx-[89ab]xxx-xxxxxxxxxxxx
        bytes_be[6] = (bytes_be[6] & 0x0F) | 0x40;
        bytes_be[8] = (bytes_be[8] & 0x3F) | 0x80;

        Uuid::from_bytes_be(bytes_be)
    }

    /// Returns the underlying 16 bytes in little-endian order.
    pub const fn as_bytes_le(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Returns the underlying 16 bytes in big-endian order.
    pub fn as_bytes_be(&self) -> [u8; 16] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }

    /// Returns the RFC 4122 version nibble.
    pub fn version(&self) -> u8 {
        self.as_bytes_be()[6] >> 4
    }
}

impl From<[u8; 16]> for Uuid {
    /// Assumes bytes are in little-endian order.
    fn from(bytes: [u8; 16]) -> Self {
        Uuid::from_bytes_le(bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.as_bytes_be();
        write!(
            f,
            "{}-{}-{}-{}-{}",
            hex::encode(&b[0..4]),
            hex::encode(&b[4..6]),
            hex::encode(&b[6..8]),
            hex::encode(&b[8..10]),
            hex::encode(&b[10..16])
        )
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({})", self)
    }
}

/// Errors from parsing a UUID string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UuidParseError {
    #[error("expected 32 hex digits, found {0}")]
    InvalidLength(usize),

    #[error("invalid hex: {0}")]
    HexError(#[from] hex::FromHexError),
}

impl FromStr for Uuid {
    type Err = UuidParseError;

    /// Parses the hyphenated or plain 32-digit hex form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| *c != '-').collect();
        if cleaned.len() != 32 {
            return Err(UuidParseError::InvalidLength(cleaned.len()));
        }

        let mut bytes_be = [0u8; 16];
        hex::decode_to_slice(&cleaned, &mut bytes_be)?;
        Ok(Uuid::from_bytes_be(bytes_be))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let uuid: Uuid = "0000180a-0000-1000-8000-00805f9b34fb".parse().unwrap();
        assert_eq!(uuid.to_string(), "0000180a-0000-1000-8000-00805f9b34fb");
        assert_eq!(uuid.as_bytes_le()[0], 0xFB);
        assert_eq!(uuid.as_bytes_be()[0], 0x00);

        let plain: Uuid = "0000180a00001000800000805f9b34fb".parse().unwrap();
        assert_eq!(plain, uuid);

        assert_eq!(
            "1234".parse::<Uuid>(),
            Err(UuidParseError::InvalidLength(4))
        );
        assert_eq!(
            UuidParseError::InvalidLength(4).to_string(),
            "expected 32 hex digits, found 4"
        );
        assert!(matches!(
            "zz00180a-0000-1000-8000-00805f9b34fb".parse::<Uuid>(),
            Err(UuidParseError::HexError(_))
        ));
    }

    #[test]
    fn test_random_v4() {
        let a = Uuid::new_random_v4();
        let b = Uuid::new_random_v4();

        assert_ne!(a, b);
        assert_eq!(a.version(), 4);
        assert_eq!(a.as_bytes_be()[8] & 0xC0, 0x80);
    }
}
