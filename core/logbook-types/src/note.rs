//! Encoded note text.
//!
//! Notes are stored remotely as a "byte string": every byte of the UTF-8
//! encoding of the text is carried as one code point in U+0000..=U+00FF.
//! Plain ASCII is unchanged by the encoding.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A note in its at-rest encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedNote(String);

impl EncodedNote {
    /// Encodes display text for storage.
    #[must_use]
    pub fn encode(text: &str) -> Self {
        Self(text.bytes().map(char::from).collect())
    }

    /// Wraps a value exactly as it was read from the remote service.
    #[must_use]
    pub fn from_wire(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the at-rest representation.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        &self.0
    }

    /// Returns true if the note is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the note for display.
    ///
    /// Fails if a code point lies outside the byte range or the bytes are
    /// not valid UTF-8.
    pub fn decode(&self) -> Result<String> {
        let bytes = self
            .0
            .chars()
            .map(|c| {
                u8::try_from(c).map_err(|_| {
                    Error::InvalidNoteEncoding(format!(
                        "code point U+{:04X} is outside the byte range",
                        u32::from(c)
                    ))
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        String::from_utf8(bytes).map_err(|e| Error::InvalidNoteEncoding(e.to_string()))
    }
}
