use std::fmt;
use std::str::FromStr;

use crate::prelude::*;

/// A four character code, used both as RIFF chunk identifier and as
/// LIST/INFO field key. The bytes are kept in file order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Marker([u8; 4]);

impl Marker {
    // Chunk identifiers
    pub const RIFF: Marker = Marker(*b"RIFF");
    pub const WAVE: Marker = Marker(*b"WAVE");
    pub const FMT: Marker = Marker(*b"fmt ");
    pub const DATA: Marker = Marker(*b"data");
    pub const LIST: Marker = Marker(*b"LIST");
    pub const INFO: Marker = Marker(*b"INFO");

    // INFO field keys
    /// Archival location
    pub const IARL: Marker = Marker(*b"IARL");
    /// Artist
    pub const IART: Marker = Marker(*b"IART");
    /// Comments
    pub const ICMT: Marker = Marker(*b"ICMT");
    /// Copyright
    pub const ICOP: Marker = Marker(*b"ICOP");
    /// Creation date
    pub const ICRD: Marker = Marker(*b"ICRD");
    /// Engineer
    pub const IENG: Marker = Marker(*b"IENG");
    /// Genre
    pub const IGNR: Marker = Marker(*b"IGNR");
    /// Keywords
    pub const IKEY: Marker = Marker(*b"IKEY");
    /// Medium
    pub const IMED: Marker = Marker(*b"IMED");
    /// Title
    pub const INAM: Marker = Marker(*b"INAM");
    /// Product (album)
    pub const IPRD: Marker = Marker(*b"IPRD");
    /// Subject
    pub const ISBJ: Marker = Marker(*b"ISBJ");
    /// Software
    pub const ISFT: Marker = Marker(*b"ISFT");
    /// Source
    pub const ISRC: Marker = Marker(*b"ISRC");
    /// Technician
    pub const ITCH: Marker = Marker(*b"ITCH");
    /// Track number
    pub const ITRK: Marker = Marker(*b"ITRK");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Marker(bytes)
    }

    /// Parses a marker from text. Only the byte length is checked.
    pub fn parse(text: &str) -> Result<Self> {
        let bytes: [u8; 4] = text
            .as_bytes()
            .try_into()
            .map_err(|_| WaveError::InvalidMarkerLength {
                text: text.to_string(),
            })?;
        Ok(Marker(bytes))
    }

    pub const fn from_u32(value: u32) -> Self {
        Marker(value.to_be_bytes())
    }

    /// Big-endian reading of the four bytes, `"RIFF"` is `0x52494646`.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub(crate) fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        Ok(Marker(bytes))
    }
}

impl From<[u8; 4]> for Marker {
    fn from(bytes: [u8; 4]) -> Self {
        Marker(bytes)
    }
}

impl FromStr for Marker {
    type Err = WaveError;

    fn from_str(s: &str) -> Result<Self> {
        Marker::parse(s)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marker({:?})", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_exactly_four_bytes() {
        assert_eq!(Marker::parse("INAM").unwrap(), Marker::INAM);
        assert_eq!(Marker::parse("ICRD").unwrap(), Marker::ICRD);
        assert_eq!("fmt ".parse::<Marker>().unwrap(), Marker::FMT);
    }

    #[test]
    fn parse_rejects_other_lengths() {
        for text in ["I", "INVALID", "", "ÄÄÄ"] {
            let err = Marker::parse(text).unwrap_err();
            assert!(
                matches!(err, WaveError::InvalidMarkerLength { .. }),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn multibyte_text_of_four_bytes_is_accepted() {
        // "Äx" is 3 bytes, "Äxy" is 4
        let m = Marker::parse("Äxy").unwrap();
        assert_eq!(m.as_bytes(), &[0xC3, 0x84, b'x', b'y']);
    }

    #[test]
    fn integer_conversion_is_big_endian() {
        assert_eq!(Marker::INAM.to_u32(), 0x494E414D);
        assert_eq!(Marker::ICRD.to_u32(), 0x49435244);
        assert_eq!(Marker::RIFF.to_u32(), 0x52494646);
        assert_eq!(Marker::from_u32(0x494E414D), Marker::INAM);
        assert_eq!(Marker::from_u32(0x666d7420), Marker::FMT);
    }

    #[test]
    fn display_renders_the_code() {
        assert_eq!(Marker::parse("INAM").unwrap().to_string(), "INAM");
        assert_eq!(Marker::ICRD.to_string(), "ICRD");
        assert_eq!(format!("{:?}", Marker::DATA), "Marker(\"data\")");
    }
}
