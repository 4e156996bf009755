//! Ordered character-encoding fallback for plain text files

use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};

/// Candidate encodings for plain text, tried in [`TextEncoding::FALLBACK_ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// BOM-aware, little-endian when no BOM is present
    Utf16,
    Latin1,
    Windows1252,
    Iso8859_1,
}

impl TextEncoding {
    pub const FALLBACK_ORDER: [TextEncoding; 5] = [
        TextEncoding::Utf8,
        TextEncoding::Utf16,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
        TextEncoding::Iso8859_1,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "cp1252",
            Self::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decode strictly, `None` on any malformed sequence
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            Self::Utf16 => {
                let (encoding, body) = match bytes {
                    [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
                    [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
                    _ => (UTF_16LE, bytes),
                };
                encoding
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            Self::Latin1 | Self::Iso8859_1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

/// Text together with the encoding that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Try each candidate encoding in order and keep the first clean decode.
///
/// Returns `None` only when every candidate rejects the input.
pub fn decode_text(bytes: &[u8]) -> Option<Decoded> {
    TextEncoding::FALLBACK_ORDER.iter().find_map(|encoding| {
        let decoded = encoding.decode(bytes);
        if decoded.is_none() {
            tracing::debug!("Decoding with {} failed, trying next encoding", encoding.label());
        }
        decoded.map(|text| Decoded {
            text,
            encoding: *encoding,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let decoded = decode_text("Hello wörld".as_bytes()).unwrap();
        assert_eq!(decoded.text, "Hello wörld");
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let decoded = decode_text(b"\xEF\xBB\xBFHello").unwrap();
        assert_eq!(decoded.text, "Hello");
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Hi é".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let decoded = decode_text(&bytes).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf16);
        assert_eq!(decoded.text, "Hi é");
    }

    #[test]
    fn test_latin1_fallback() {
        // Odd length rules out UTF-16, invalid UTF-8 rules out UTF-8
        let decoded = decode_text(b"caf\xe9 au lait").unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Latin1);
        assert_eq!(decoded.text, "café au lait");
    }

    #[test]
    fn test_utf16_rejects_odd_length() {
        assert!(TextEncoding::Utf16.decode(b"abc").is_none());
    }

    #[test]
    fn test_windows_1252_smart_quotes() {
        let text = TextEncoding::Windows1252.decode(b"\x93quoted\x94").unwrap();
        assert_eq!(text, "\u{201C}quoted\u{201D}");
    }
}
