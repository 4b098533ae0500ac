//! FAR (Fat ARchive) — decoder, packer and target resolver for multi-device GPU binary archives.
//!
//! A fat archive is a System-V-style AR container holding one compiled device
//! binary per GPU target (pointer width / product / stepping). This crate provides:
//! - **Format types** (`format`): wire constants and the fixed 60-byte entry header.
//! - **Decoder** (`decoder`): `decode(bytes)` into borrowed [`Archive`]/[`FileEntry`] views.
//! - **Encoder** (`encoder`): [`ArBuilder`] with long-name table support and optional
//!   8-byte payload alignment via `pad_<n>` placeholder entries.
//! - **Resolver** (`resolver`): two-tier best-match selection of the entry for a
//!   requested [`TargetDevice`], with graceful stepping fallback.
//! - **Concat** (`concat`, binary `far`): merge archives and raw target binaries
//!   into one fat archive, dropping stale alignment placeholders.

pub mod concat;
pub mod decoder;
pub mod encoder;
pub mod format;
pub mod resolver;

pub use concat::{
    concatenate, ArchiveOnlyInputs, ConcatError, InputError, NoteError, ProductConfig,
    ProductConfigReader,
};
pub use decoder::{decode, ArError, ArWarning, Archive, DecodeFailure, Decoded, FileEntry};
pub use encoder::{encode, ArBuilder, EncodeError};
pub use format::{is_ar, ArFileEntryHeader, AR_MAGIC, HEADER_SIZE, PAD_ENTRY_PREFIX};
pub use resolver::{resolve, resolve_usable, Resolution, ResolveError, TargetDevice};
