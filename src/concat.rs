//! Fat-binary concatenation: merge single-target archives and raw device
//! binaries into one fat archive.
//!
//! Archive inputs contribute their entries as-is, minus the `pad_<n>`
//! alignment placeholders a previous pass may have inserted. Raw inputs are
//! named by the product configuration embedded in their container metadata,
//! read through the [`ProductConfigReader`] seam (the container format itself
//! is not decoded here). The merged archive is built with 8-byte payload
//! alignment since the payloads are alignment-sensitive device binaries.

use std::fmt;

use thiserror::Error;

use crate::decoder::{decode, DecodeFailure};
use crate::encoder::{ArBuilder, EncodeError};
use crate::format::{is_ar, PAD_ENTRY_PREFIX};

/// Failures reading the product-configuration note of a raw device binary.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("not a zebin and not a supported container format")]
    NotZebinOrUnsupportedContainer,
    #[error("missing product configuration note")]
    MissingProductConfigNote,
}

/// What went wrong with one concatenation input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Archive(#[from] DecodeFailure),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Concatenation failure, naming the offending input file.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("failed to process input file '{file}': {source}")]
    Input {
        file: String,
        #[source]
        source: InputError,
    },
}

/// Product configuration extracted from a device binary's metadata note;
/// rendered canonically as `major.minor.revision` for entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProductConfig {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl fmt::Display for ProductConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Seam to the external container-metadata capability: reads the embedded
/// product-configuration note of a raw (non-archive) device binary.
pub trait ProductConfigReader {
    fn read_product_config(&self, binary: &[u8]) -> Result<ProductConfig, NoteError>;
}

/// Reader for consumers without container-metadata support (e.g. the CLI):
/// every raw input is rejected, so only archive inputs concatenate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveOnlyInputs;

impl ProductConfigReader for ArchiveOnlyInputs {
    fn read_product_config(&self, _binary: &[u8]) -> Result<ProductConfig, NoteError> {
        Err(NoteError::NotZebinOrUnsupportedContainer)
    }
}

/// Merge `inputs` (as `(file name, bytes)` pairs) into one fat archive.
///
/// Any decode or note-extraction failure aborts the whole operation with an
/// error naming the input file; nothing partial is produced.
pub fn concatenate<R: ProductConfigReader>(
    inputs: &[(&str, &[u8])],
    notes: &R,
) -> Result<Vec<u8>, ConcatError> {
    let mut builder = ArBuilder::with_data_alignment();

    for &(file, bytes) in inputs {
        append_input(&mut builder, bytes, notes)
            .map_err(|source| ConcatError::Input {
                file: file.to_owned(),
                source,
            })?;
    }

    Ok(builder.encode())
}

fn append_input<R: ProductConfigReader>(
    builder: &mut ArBuilder,
    bytes: &[u8],
    notes: &R,
) -> Result<(), InputError> {
    if is_ar(bytes) {
        let decoded = decode(bytes)?;
        for entry in &decoded.archive.files {
            // Alignment placeholders from a previous concat pass; the
            // aligned builder re-inserts its own where needed.
            if entry.file_name.starts_with(PAD_ENTRY_PREFIX) {
                continue;
            }
            builder.append(&entry.file_name, entry.file_data)?;
        }
    } else {
        let config = notes.read_product_config(bytes)?;
        builder.append(&config.to_string(), bytes)?;
    }
    Ok(())
}
