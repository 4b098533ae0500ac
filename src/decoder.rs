//! AR decoder: walk the archive bytes, resolve entry names, expose payloads
//! as borrowed views into the input buffer.
//!
//! Decoding is all-or-nothing: any corrupt condition discards every entry
//! parsed so far and returns an error. Trailing-magic mismatches are the one
//! non-fatal condition; they are reported as warnings alongside the result.

use thiserror::Error;

use crate::format::{
    is_ar, read_decimal, ArFileEntryHeader, AR_MAGIC, HEADER_SIZE, IDENTIFIER_LEN,
    SPECIAL_LONG_NAMES,
};

/// Hard decode failures. Each message quotes the raw 16-byte identifier of
/// the offending header, padding included.
#[derive(Debug, Error)]
pub enum ArError {
    #[error("not an AR archive - mismatched file signature")]
    NotAnArchive,
    #[error("corrupt AR archive - out of bounds data of file entry with identifier '{identifier}'")]
    OutOfBounds { identifier: String },
    #[error("corrupt AR archive - file entry does not have identifier : '{identifier}'")]
    MissingIdentifier { identifier: String },
    #[error("corrupt AR archive - long file name entry has broken identifier : '{identifier}'")]
    BrokenLongName { identifier: String },
}

/// Non-fatal conditions observed while decoding; the archive is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArWarning {
    #[error("file entry header with identifier '{identifier}' has invalid header trailing string")]
    TrailingMagicMismatch { identifier: String },
}

/// Hard decode failure together with the warnings recorded before it, so
/// diagnostics for entries parsed ahead of a corrupt tail are not lost.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct DecodeFailure {
    pub reason: ArError,
    pub warnings: Vec<ArWarning>,
}

/// One named payload inside the archive. `file_data` borrows from the buffer
/// passed to [`decode`]; the buffer must outlive the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry<'a> {
    /// Resolved name: padding stripped and long-name indirection already
    /// dereferenced. Never empty for entries in [`Archive::files`].
    pub file_name: String,
    /// Payload bytes, bounds-checked at decode time.
    pub file_data: &'a [u8],
    /// Byte offset of this entry's header in the source buffer, for
    /// diagnostics and re-encoding validation.
    pub header_offset: usize,
}

/// Decoded archive. `files` preserves archive order; order matters for
/// resolution tie-breaks and round-trip fidelity. The special `//` long-name
/// table entry is captured separately and never appears in `files`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Archive<'a> {
    pub files: Vec<FileEntry<'a>>,
    pub long_names: Option<&'a [u8]>,
}

/// Successful decode result: the archive plus any non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub archive: Archive<'a>,
    pub warnings: Vec<ArWarning>,
}

/// Decode a fat binary archive from `bytes`.
///
/// Walks entries after the 8-byte signature; fewer than 60 remaining bytes is
/// the clean end of the archive. Returns all parsed entries or the first hard
/// error, never a partial archive. Warnings accumulated before a hard error
/// ride along on the failure.
pub fn decode(bytes: &[u8]) -> Result<Decoded<'_>, DecodeFailure> {
    let mut warnings = Vec::new();
    match walk_entries(bytes, &mut warnings) {
        Ok(archive) => Ok(Decoded { archive, warnings }),
        Err(reason) => Err(DecodeFailure { reason, warnings }),
    }
}

fn walk_entries<'a>(
    bytes: &'a [u8],
    warnings: &mut Vec<ArWarning>,
) -> Result<Archive<'a>, ArError> {
    if !is_ar(bytes) {
        return Err(ArError::NotAnArchive);
    }

    let mut archive = Archive::default();
    let mut pos = AR_MAGIC.len();

    while let Some(header) = ArFileEntryHeader::parse(&bytes[pos..]) {
        let data_start = pos + HEADER_SIZE;
        let data_end = match data_start.checked_add(header.file_size) {
            Some(end) if end <= bytes.len() => end,
            _ => {
                return Err(ArError::OutOfBounds {
                    identifier: header.identifier_lossy(),
                });
            }
        };
        if !header.trailing_magic_ok {
            warnings.push(ArWarning::TrailingMagicMismatch {
                identifier: header.identifier_lossy(),
            });
        }

        let file_data = &bytes[data_start..data_end];
        let name = strip_identifier_padding(header.identifier);

        if name.is_empty() {
            if header.identifier.starts_with(SPECIAL_LONG_NAMES) {
                archive.long_names = Some(file_data);
            } else {
                return Err(ArError::MissingIdentifier {
                    identifier: header.identifier_lossy(),
                });
            }
        } else if name[0] == b'/' {
            // Long-name indirection: decimal byte offset into the `//` table,
            // which always precedes the entries that reference it.
            let offset = read_decimal(&header.identifier[1..IDENTIFIER_LEN]);
            let resolved = archive.long_names.and_then(|table| long_name_at(table, offset));
            match resolved {
                Some(long_name) if !long_name.is_empty() => {
                    archive.files.push(FileEntry {
                        file_name: String::from_utf8_lossy(long_name).into_owned(),
                        file_data,
                        header_offset: pos,
                    });
                }
                _ => {
                    return Err(ArError::BrokenLongName {
                        identifier: header.identifier_lossy(),
                    });
                }
            }
        } else {
            archive.files.push(FileEntry {
                file_name: String::from_utf8_lossy(name).into_owned(),
                file_data,
                header_offset: pos,
            });
        }

        // Payloads are 2-byte aligned; the alignment byte is not part of the
        // declared size. A final odd payload may end flush with the buffer.
        pos = (data_end + (header.file_size & 1)).min(bytes.len());
    }

    Ok(archive)
}

/// Strip trailing padding (space, NUL, `/`) from a raw identifier, scanning
/// from the right. An identifier of all padding yields an empty slice.
fn strip_identifier_padding(identifier: &[u8]) -> &[u8] {
    let mut end = identifier.len();
    while end > 0 {
        match identifier[end - 1] {
            b' ' | b'\0' | b'/' => end -= 1,
            _ => break,
        }
    }
    &identifier[..end]
}

/// Look up the long name starting at `offset` in the `//` table payload.
/// Names end at the next `/` delimiter (or the table end).
fn long_name_at(table: &[u8], offset: usize) -> Option<&[u8]> {
    if offset >= table.len() {
        return None;
    }
    let rest = &table[offset..];
    let end = rest.iter().position(|&b| b == b'/').unwrap_or(rest.len());
    Some(&rest[..end])
}
