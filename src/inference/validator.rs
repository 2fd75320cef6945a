use std::borrow::Cow;

/// Leading bytes of every DOS/PE image.
pub const PE_MAGIC: &[u8; 2] = b"MZ";

pub const UNSUPPORTED_NOTE: &str =
    "This model only analyzes Windows executables (.exe, .dll, .sys).";

/// Why a payload was turned away before any feature work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub note: String,
}

/// Accept only buffers that start with the `MZ` marker.
/// The rest of the buffer is not inspected.
pub fn validate_binary(bytes: &[u8]) -> Result<(), Rejection> {
    if bytes.starts_with(PE_MAGIC) {
        Ok(())
    } else {
        Err(Rejection {
            note: UNSUPPORTED_NOTE.to_string(),
        })
    }
}

/// Decode uploaded email bytes. Invalid UTF-8 sequences become U+FFFD;
/// decoding never fails.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pe_magic_accepted() {
        assert!(validate_binary(b"MZ\x90\x00").is_ok());
        assert!(validate_binary(b"MZ").is_ok());
    }

    #[test]
    fn test_non_pe_rejected() {
        for input in [
            &b"PK\x03\x04rest-of-zip"[..],
            b"\x7fELF\x02\x01\x01",
            b"M",
            b"",
            b"mz lowercase",
        ] {
            let rejection = validate_binary(input).unwrap_err();
            assert_eq!(rejection.note, UNSUPPORTED_NOTE);
        }
    }

    #[test]
    fn test_decode_text_is_lossy() {
        assert_eq!(decode_text(b"hello"), "hello");
        let decoded = decode_text(b"bad \xff\xfe bytes");
        assert!(decoded.starts_with("bad "));
        assert!(decoded.ends_with(" bytes"));
        assert!(decoded.contains('\u{FFFD}'));
    }
}
