//! Single-byte text handling for plaintext chunks.
//!
//! Sources are read one byte per character (Latin-1) and written back the
//! same way, so bytes no transform touches survive unchanged, whatever
//! encoding the source file actually used.

/// Decode bytes as Latin-1 (every byte maps to the char with the same value).
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text produced by [`decode`] back to bytes.
///
/// Characters above U+00FF can only come from transforms (substitutions or
/// mangles); they are written as UTF-8.
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(byte) => out.push(byte),
            Err(_) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_source_survives_byte_for_byte() {
        let source = "<p>Helligkeit: 50 % – Grün</p>".as_bytes();
        let text = decode(source);
        assert_eq!(text.chars().count(), source.len());
        assert_eq!(encode(&text), source);
    }

    #[test]
    fn test_encode_wide_chars_as_utf8() {
        assert_eq!(encode("a→b"), "a→b".as_bytes());
    }
}
