//! AR encoder: build a fat binary archive from (name, payload) pairs.
//!
//! The builder owns copies of every appended payload (unlike the decoder,
//! which borrows) and produces the full byte stream in one `encode` call:
//! signature, optional `//` long-name table, then the entries with their
//! 2-byte payload alignment. An optional mode additionally inserts `pad_<n>`
//! placeholder entries so every payload starts on an 8-byte boundary, for
//! payloads that are themselves alignment-sensitive binary formats.

use thiserror::Error;

use crate::format::{
    AR_MAGIC, FILE_MODE_LEN, FILE_SIZE_LEN, GROUP_ID_LEN, HEADER_SIZE, HEADER_TRAILING_MAGIC,
    IDENTIFIER_LEN, MAX_INLINE_NAME_LEN, MOD_TIMESTAMP_LEN, OWNER_ID_LEN, PAD_ENTRY_PREFIX,
};

/// Errors produced while building an archive.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("AR entry must have a non-empty name")]
    EmptyEntryName,
    #[error("AR entry name '{name}' would not survive a decode round trip")]
    UnrepresentableName { name: String },
}

struct OwnedEntry {
    name: String,
    data: Vec<u8>,
}

/// Accumulates entries for one archive; consumed by [`ArBuilder::encode`].
#[derive(Default)]
pub struct ArBuilder {
    entries: Vec<OwnedEntry>,
    align_data: bool,
}

impl ArBuilder {
    /// Builder without payload alignment beyond the format's 2-byte rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that 8-byte aligns every payload by inserting `pad_<n>`
    /// placeholder entries where needed.
    #[must_use]
    pub fn with_data_alignment() -> Self {
        Self {
            entries: Vec::new(),
            align_data: true,
        }
    }

    /// Append one entry. The payload is copied; names must be non-empty
    /// (the format cannot represent an unnamed entry).
    ///
    /// Names ending in space or NUL are stored through the long-name table,
    /// which preserves them exactly; inline identifiers would lose them to
    /// padding stripping. Names ending in `/`, and table-bound names
    /// containing `/` (the table's delimiter), cannot be represented and are
    /// rejected.
    pub fn append(&mut self, name: &str, data: &[u8]) -> Result<(), EncodeError> {
        if name.is_empty() {
            return Err(EncodeError::EmptyEntryName);
        }
        if name.ends_with('/') || (needs_long_name(name) && name.contains('/')) {
            return Err(EncodeError::UnrepresentableName {
                name: name.to_owned(),
            });
        }
        self.entries.push(OwnedEntry {
            name: name.to_owned(),
            data: data.to_vec(),
        });
        Ok(())
    }

    /// Encode the accumulated entries into archive bytes.
    ///
    /// The `//` long-name table, when needed, is emitted before any entry
    /// that references it, so `decode(encode(X))` reproduces names and
    /// payloads exactly.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        // Names too long for the identifier field go through the `//` table;
        // offsets are assigned in entry order so re-encoding is deterministic.
        let mut long_names = Vec::new();
        let mut long_name_offsets = vec![None; self.entries.len()];
        for (i, entry) in self.entries.iter().enumerate() {
            if needs_long_name(&entry.name) {
                long_name_offsets[i] = Some(long_names.len());
                long_names.extend_from_slice(entry.name.as_bytes());
                long_names.extend_from_slice(b"/\n");
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(&AR_MAGIC);

        if !long_names.is_empty() {
            push_header(&mut out, "//", long_names.len());
            push_payload(&mut out, &long_names);
        }

        let mut pad_counter = 0usize;
        for (i, entry) in self.entries.iter().enumerate() {
            if self.align_data {
                align_next_payload(&mut out, &mut pad_counter);
            }
            let identifier = match long_name_offsets[i] {
                Some(offset) => format!("/{offset}"),
                None => format!("{}/", entry.name),
            };
            push_header(&mut out, &identifier, entry.data.len());
            push_payload(&mut out, &entry.data);
        }
        out
    }
}

/// True when `name` must go through the `//` table: too long for the
/// identifier field, or ending in a byte the inline padding strip would eat.
fn needs_long_name(name: &str) -> bool {
    name.len() > MAX_INLINE_NAME_LEN || matches!(name.as_bytes().last(), Some(b' ' | b'\0'))
}

/// Encode `entries` in one shot; convenience over [`ArBuilder`].
pub fn encode(entries: &[(&str, &[u8])]) -> Result<Vec<u8>, EncodeError> {
    let mut builder = ArBuilder::new();
    for (name, data) in entries {
        builder.append(name, data)?;
    }
    Ok(builder.encode())
}

/// Emit one 60-byte header. Timestamp/owner/group/mode carry the fixed
/// defaults; only the identifier and size vary.
fn push_header(out: &mut Vec<u8>, identifier: &str, size: usize) {
    push_field(out, identifier, IDENTIFIER_LEN);
    push_field(out, "0", MOD_TIMESTAMP_LEN);
    push_field(out, "0", OWNER_ID_LEN);
    push_field(out, "0", GROUP_ID_LEN);
    push_field(out, "644", FILE_MODE_LEN);
    push_field(out, &size.to_string(), FILE_SIZE_LEN);
    out.extend_from_slice(&HEADER_TRAILING_MAGIC);
}

/// Left-justified, space-padded fixed-width ASCII field.
fn push_field(out: &mut Vec<u8>, value: &str, width: usize) {
    debug_assert!(value.len() <= width, "field value wider than {width}: {value}");
    out.extend_from_slice(value.as_bytes());
    out.resize(out.len() + (width - value.len()), b' ');
}

/// Payload plus the implicit alignment byte after odd sizes.
fn push_payload(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

/// Insert a `pad_<n>` placeholder entry so the payload of the next emitted
/// entry starts on an 8-byte boundary.
fn align_next_payload(out: &mut Vec<u8>, pad_counter: &mut usize) {
    if (out.len() + HEADER_SIZE) % 8 == 0 {
        return;
    }
    // Smallest pad payload whose entry shifts the following payload start
    // onto an 8-byte boundary (the pad payload itself is 2-byte aligned).
    let mut pad_size = 0;
    while (out.len() + HEADER_SIZE + pad_size + pad_size % 2 + HEADER_SIZE) % 8 != 0 {
        pad_size += 1;
    }
    push_header(out, &format!("{PAD_ENTRY_PREFIX}{pad_counter}/"), pad_size);
    push_payload(out, &vec![0u8; pad_size]);
    *pad_counter += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_padding_is_left_justified() {
        let mut out = Vec::new();
        push_field(&mut out, "644", 8);
        assert_eq!(&out, b"644     ");
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut builder = ArBuilder::new();
        assert!(matches!(
            builder.append("", b"data"),
            Err(EncodeError::EmptyEntryName)
        ));
    }

    #[test]
    fn aligned_builder_starts_payloads_on_eight_byte_boundary() {
        let mut builder = ArBuilder::with_data_alignment();
        builder.append("64.test", &[1, 2, 3]).unwrap();
        builder.append("64.other", &[4, 5, 6, 7, 8]).unwrap();
        let bytes = builder.encode();

        let decoded = crate::decoder::decode(&bytes).unwrap();
        let real: Vec<_> = decoded
            .archive
            .files
            .iter()
            .filter(|f| !f.file_name.starts_with(PAD_ENTRY_PREFIX))
            .collect();
        assert_eq!(real.len(), 2);
        for entry in real {
            let payload_offset = entry.header_offset + HEADER_SIZE;
            assert_eq!(payload_offset % 8, 0, "entry {}", entry.file_name);
        }
    }
}
