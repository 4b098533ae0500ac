//! AR wire-format constants and the fixed 60-byte file entry header.
//!
//! Defines the System-V-style archive layout used as the fat-binary envelope:
//! 8-byte signature, repeating 60-byte headers with ASCII-decimal fields,
//! 2-byte payload alignment. Purely structural; no knowledge of products or
//! devices lives here.

/// Archive signature at the start of every fat binary: `"!<arch>\n"`.
pub const AR_MAGIC: [u8; 8] = *b"!<arch>\n";

/// Trailing magic closing every file entry header: 0x60 0x0A.
pub const HEADER_TRAILING_MAGIC: [u8; 2] = [0x60, 0x0A];

/// Identifier prefix of the special long-name table entry.
pub const SPECIAL_LONG_NAMES: &[u8; 2] = b"//";

/// Reserved name prefix for alignment placeholder entries inserted by the
/// encoder; the concatenator drops these so they never accumulate.
pub const PAD_ENTRY_PREFIX: &str = "pad_";

/// Widths of the header fields, in wire order.
pub const IDENTIFIER_LEN: usize = 16;
pub const MOD_TIMESTAMP_LEN: usize = 12;
pub const OWNER_ID_LEN: usize = 6;
pub const GROUP_ID_LEN: usize = 6;
pub const FILE_MODE_LEN: usize = 8;
pub const FILE_SIZE_LEN: usize = 10;

/// Total size of one file entry header.
pub const HEADER_SIZE: usize = IDENTIFIER_LEN
    + MOD_TIMESTAMP_LEN
    + OWNER_ID_LEN
    + GROUP_ID_LEN
    + FILE_MODE_LEN
    + FILE_SIZE_LEN
    + HEADER_TRAILING_MAGIC.len();

/// Byte offset of the size field inside a header.
pub const FILE_SIZE_OFFSET: usize =
    IDENTIFIER_LEN + MOD_TIMESTAMP_LEN + OWNER_ID_LEN + GROUP_ID_LEN + FILE_MODE_LEN;

/// Longest name that still fits inline in the identifier field together with
/// its `/` terminator; anything longer goes through the long-name table.
pub const MAX_INLINE_NAME_LEN: usize = IDENTIFIER_LEN - 1;

/// True if `bytes` starts with the archive signature.
#[must_use]
pub fn is_ar(bytes: &[u8]) -> bool {
    bytes.len() >= AR_MAGIC.len() && bytes[..AR_MAGIC.len()] == AR_MAGIC
}

/// One parsed 60-byte file entry header. All numeric fields on the wire are
/// ASCII decimal, space padded; only the identifier and size carry meaning
/// for fat binaries (timestamp/ownership/mode are written as fixed defaults).
#[derive(Debug, Clone, Copy)]
pub struct ArFileEntryHeader<'a> {
    /// Raw 16-byte identifier, padding included; name resolution (padding
    /// strip, `//` table, `/<offset>` indirection) happens in the decoder.
    pub identifier: &'a [u8],
    /// Declared payload size decoded from the ASCII field. Excludes the
    /// implicit alignment byte after odd-sized payloads.
    pub file_size: usize,
    /// Whether the 2-byte trailing magic matched (mismatch is non-fatal).
    pub trailing_magic_ok: bool,
}

impl<'a> ArFileEntryHeader<'a> {
    /// Parse one header from the first [`HEADER_SIZE`] bytes of `bytes`.
    /// Returns `None` when fewer than [`HEADER_SIZE`] bytes remain, which is
    /// the clean end-of-archive condition for the decoder.
    #[must_use]
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let identifier = &bytes[..IDENTIFIER_LEN];
        let file_size = read_decimal(&bytes[FILE_SIZE_OFFSET..FILE_SIZE_OFFSET + FILE_SIZE_LEN]);
        let trailing = &bytes[HEADER_SIZE - 2..HEADER_SIZE];
        Some(Self {
            identifier,
            file_size,
            trailing_magic_ok: trailing == HEADER_TRAILING_MAGIC,
        })
    }

    /// Raw identifier as a lossy string, padding included. Diagnostics quote
    /// corrupt headers exactly as found.
    #[must_use]
    pub fn identifier_lossy(&self) -> String {
        String::from_utf8_lossy(self.identifier).into_owned()
    }
}

/// Read a left-aligned ASCII decimal, stopping at the first byte that is not
/// a digit (space/NUL padding included) and never past the field width.
/// Saturates on overflow; a saturated size or table offset fails the
/// decoder's bounds checks like any other out-of-range value.
#[must_use]
pub fn read_decimal(field: &[u8]) -> usize {
    let mut value = 0usize;
    for &b in field {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add((b - b'0') as usize);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_sixty_bytes() {
        assert_eq!(HEADER_SIZE, 60);
        assert_eq!(FILE_SIZE_OFFSET, 48);
    }

    #[test]
    fn read_decimal_stops_at_padding() {
        assert_eq!(read_decimal(b"8         "), 8);
        assert_eq!(read_decimal(b"123 456   "), 123);
        assert_eq!(read_decimal(b"          "), 0);
        assert_eq!(read_decimal(b"42\0\0\0\0\0\0\0\0"), 42);
    }

    #[test]
    fn read_decimal_saturates_instead_of_overflowing() {
        // 15 digits: the widest indirection offset an identifier can carry.
        let expected = 999_999_999_999_999_u64.min(usize::MAX as u64) as usize;
        assert_eq!(read_decimal(b"999999999999999"), expected);
        let huge = [b'9'; 40];
        assert_eq!(read_decimal(&huge), usize::MAX);
    }

    #[test]
    fn parse_rejects_short_buffer() {
        assert!(ArFileEntryHeader::parse(&[0u8; 59]).is_none());
    }
}
