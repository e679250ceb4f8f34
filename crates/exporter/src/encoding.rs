use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Text encoding used to decode source files and to encode bundle blocks.
///
/// Decoding is strict: a byte sequence that is not valid in the encoding is a
/// [`DecodeError`]. Encoding never fails; characters the encoding cannot
/// represent are written as `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{encoding}' codec can't decode byte 0x{byte:02x} in position {position}")]
pub struct DecodeError {
    pub encoding: TextEncoding,
    pub byte: u8,
    pub position: usize,
}

const REPLACEMENT: u8 = b'?';

impl TextEncoding {
    /// Parse a user-facing encoding label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "ascii" | "us-ascii" => Some(Self::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            Self::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.to_string()),
                Err(err) => {
                    let position = err.valid_up_to();
                    Err(DecodeError {
                        encoding: self,
                        byte: bytes[position],
                        position,
                    })
                }
            },
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(position) => Err(DecodeError {
                    encoding: self,
                    byte: bytes[position],
                    position,
                }),
                // All bytes are ASCII, hence valid UTF-8.
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        if self == Self::Utf8 || text.is_ascii() {
            return Cow::Borrowed(text.as_bytes());
        }
        let limit = match self {
            Self::Ascii => 0x80,
            _ => 0x100,
        };
        Cow::Owned(
            text.chars()
                .map(|ch| {
                    let code = u32::from(ch);
                    if code < limit {
                        code as u8
                    } else {
                        REPLACEMENT
                    }
                })
                .collect(),
        )
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unsupported encoding `{value}`"))
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(TextEncoding::from_label("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("utf8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("ISO-8859-1"), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::from_label("US-ASCII"), Some(TextEncoding::Ascii));
        assert_eq!(TextEncoding::from_label("cp1252"), None);
    }

    #[test]
    fn utf8_decode_reports_first_invalid_byte() {
        let err = TextEncoding::Utf8
            .decode(b"ok\xffrest")
            .expect_err("invalid utf-8");
        assert_eq!(err.byte, 0xff);
        assert_eq!(err.position, 2);
        assert_eq!(
            err.to_string(),
            "'utf-8' codec can't decode byte 0xff in position 2"
        );
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        let err = TextEncoding::Ascii.decode("héllo".as_bytes()).unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn latin1_round_trips_high_bytes() {
        let text = TextEncoding::Latin1.decode(&[0x63, 0x61, 0x66, 0xe9]).unwrap();
        assert_eq!(text, "café");
        assert_eq!(TextEncoding::Latin1.encode(&text).as_ref(), &[0x63, 0x61, 0x66, 0xe9]);
    }

    #[test]
    fn unrepresentable_chars_are_replaced() {
        assert_eq!(TextEncoding::Ascii.encode("a→b").as_ref(), b"a?b");
        assert_eq!(TextEncoding::Latin1.encode("é→").as_ref(), &[0xe9, b'?']);
        assert_eq!(TextEncoding::Utf8.encode("é").len(), 2);
    }
}
