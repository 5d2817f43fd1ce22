//! LIST/INFO metadata: an ordered list of (marker, text) pairs.
//!
//! Payload layout, as carried inside a `LIST` chunk:
//!
//! ```text
//! "INFO"
//! repeated: marker (4) | len (u32 LE, value bytes + 1) | value | 0x00
//! ```

use std::ops::Deref;

use crate::prelude::*;

/// End of value.
const EOV: u8 = 0x00;
const ENTRY_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub marker: Marker,
    pub value: String,
}

impl Info {
    pub fn new(marker: Marker, value: impl Into<String>) -> Self {
        Info {
            marker,
            value: value.into(),
        }
    }
}

/// Insertion ordered, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoList(Vec<Info>);

impl InfoList {
    pub fn new() -> Self {
        InfoList(Vec::new())
    }

    pub fn push(&mut self, info: Info) {
        self.0.push(info);
    }

    pub fn contains(&self, marker: Marker) -> bool {
        self.0.iter().any(|i| i.marker == marker)
    }

    /// First value stored under `marker`.
    pub fn get(&self, marker: Marker) -> Option<&str> {
        self.0
            .iter()
            .find(|i| i.marker == marker)
            .map(|i| i.value.as_str())
    }

    /// Serializes the list into an INFO payload. An empty list encodes to no
    /// bytes at all, not to a bare `INFO` tag.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.0.is_empty() {
            return Ok(Vec::new());
        }

        let size = 4 + self
            .0
            .iter()
            .map(|i| ENTRY_HEADER_SIZE + i.value.len() + 1)
            .sum::<usize>();
        let mut out = Vec::with_capacity(size);
        out.write_all(Marker::INFO.as_bytes())?;

        for info in &self.0 {
            let value = info.value.as_bytes();
            if value.contains(&EOV) {
                return Err(WaveError::EmbeddedTerminator {
                    marker: info.marker,
                });
            }
            let len = u32::try_from(value.len() + 1).map_err(|_| WaveError::ValueTooLong {
                marker: info.marker,
                len: value.len(),
            })?;

            out.write_all(info.marker.as_bytes())?;
            out.write_u32::<LittleEndian>(len)?;
            out.write_all(value)?;
            out.write_u8(EOV)?;
        }

        Ok(out)
    }

    /// Parses an INFO payload. Any structural violation fails the whole
    /// decode. Fewer than 8 trailing bytes are ignored.
    pub fn decode(data: &[u8]) -> Result<InfoList> {
        if data.len() < 4 {
            return Err(WaveError::InsufficientData { len: data.len() });
        }
        let mut cursor = Cursor::new(data);
        let tag = Marker::read_from(&mut cursor)?;
        if tag != Marker::INFO {
            return Err(WaveError::UnexpectedTag {
                expected: Marker::INFO,
                found: tag,
            });
        }

        let mut list = InfoList::new();
        let mut left = data.len() - 4;
        while left >= ENTRY_HEADER_SIZE {
            let marker = Marker::read_from(&mut cursor)?;
            let len = cursor.read_u32::<LittleEndian>()?;
            left -= ENTRY_HEADER_SIZE;

            if len as usize > left {
                return Err(WaveError::ValueOverrun {
                    marker,
                    len,
                    remaining: left,
                });
            }

            let mut value = String::new();
            if len > 0 {
                let mut raw = vec![0u8; len as usize];
                cursor.read_exact(&mut raw)?;
                if raw.pop() != Some(EOV) {
                    return Err(WaveError::MissingTerminator { marker });
                }
                value = String::from_utf8(raw)
                    .map_err(|_| WaveError::InvalidText { marker })?;
                left -= len as usize;
            }
            list.push(Info { marker, value });
        }

        Ok(list)
    }
}

impl Deref for InfoList {
    type Target = [Info];

    fn deref(&self) -> &[Info] {
        &self.0
    }
}

impl Extend<Info> for InfoList {
    fn extend<T: IntoIterator<Item = Info>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<Info> for InfoList {
    fn from_iter<T: IntoIterator<Item = Info>>(iter: T) -> Self {
        InfoList(iter.into_iter().collect())
    }
}

impl From<Vec<Info>> for InfoList {
    fn from(entries: Vec<Info>) -> Self {
        InfoList(entries)
    }
}

impl IntoIterator for InfoList {
    type Item = Info;
    type IntoIter = std::vec::IntoIter<Info>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a InfoList {
    type Item = &'a Info;
    type IntoIter = std::slice::Iter<'a, Info>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
