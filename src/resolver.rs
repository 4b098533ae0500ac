//! Target resolution: pick the best matching entry of a decoded fat binary
//! for a (pointer width, product, stepping) triple.
//!
//! Entries are named `<bits>.<product>.<stepping>`; resolution is two-tier.
//! An entry matching pointer width, product and stepping is a perfect match;
//! an entry matching only pointer width and product is the best usable
//! fallback. Later entries win ties in both tiers. The fallback deliberately
//! accepts a different stepping without further checks; existing fat binaries
//! rely on that degradation, so it must not be tightened.

use thiserror::Error;

use crate::decoder::{Archive, FileEntry};

/// Errors produced by resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("couldn't find matching binary in fat binary archive")]
    NoMatchingBinary,
    #[error("matched entry '{file_name}' does not contain a usable device binary")]
    UnpackFailed { file_name: String },
}

/// Requested target, constructed per resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDevice<'a> {
    /// 32 or 64.
    pub pointer_size_bits: u32,
    /// Product abbreviation as it appears in entry names.
    pub product_abbreviation: &'a str,
    /// Hardware stepping, matched as a decimal suffix.
    pub stepping: u32,
}

impl TargetDevice<'_> {
    fn product_filter(&self) -> String {
        format!("{}.{}", self.pointer_size_bits, self.product_abbreviation)
    }

    fn stepping_filter(&self) -> String {
        format!(
            "{}.{}.{}",
            self.pointer_size_bits, self.product_abbreviation, self.stepping
        )
    }
}

/// A resolved entry plus whether the stepping matched exactly. When
/// `exact_stepping` is false the caller should surface a non-fatal "best
/// usable, not perfectly matched" warning.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a, 'buf> {
    pub entry: &'a FileEntry<'buf>,
    pub exact_stepping: bool,
}

/// Find the best structural match for `target` in `archive`.
///
/// Single scan over `files` keeping the last-seen candidate of each tier;
/// the perfect-stepping tier is preferred.
#[must_use]
pub fn resolve<'a, 'buf>(
    archive: &'a Archive<'buf>,
    target: &TargetDevice<'_>,
) -> Option<Resolution<'a, 'buf>> {
    let (best, fallback) = scan(archive, target);
    best.map(|i| Resolution {
        entry: &archive.files[i],
        exact_stepping: true,
    })
    .or_else(|| {
        fallback.map(|i| Resolution {
            entry: &archive.files[i],
            exact_stepping: false,
        })
    })
}

/// Resolve and validate: like [`resolve`], but a structurally matching entry
/// is only accepted when `is_usable` confirms its payload decodes as a device
/// binary. When the preferred tier's entry fails that probe, the other tier
/// is tried before giving up.
pub fn resolve_usable<'a, 'buf, F>(
    archive: &'a Archive<'buf>,
    target: &TargetDevice<'_>,
    mut is_usable: F,
) -> Result<Resolution<'a, 'buf>, ResolveError>
where
    F: FnMut(&FileEntry<'buf>) -> bool,
{
    let (best, fallback) = scan(archive, target);
    if best.is_none() && fallback.is_none() {
        return Err(ResolveError::NoMatchingBinary);
    }

    let candidates = [
        best.map(|i| Resolution {
            entry: &archive.files[i],
            exact_stepping: true,
        }),
        fallback.map(|i| Resolution {
            entry: &archive.files[i],
            exact_stepping: false,
        }),
    ];

    let mut last_tried = None;
    for candidate in candidates.into_iter().flatten() {
        if is_usable(candidate.entry) {
            return Ok(candidate);
        }
        last_tried = Some(candidate.entry.file_name.clone());
    }
    Err(ResolveError::UnpackFailed {
        file_name: last_tried.unwrap_or_default(),
    })
}

/// One pass over the archive, returning (perfect-tier, fallback-tier)
/// indices. Two index slots instead of entry references so the scan never
/// aliases the file list it is iterating.
fn scan(archive: &Archive<'_>, target: &TargetDevice<'_>) -> (Option<usize>, Option<usize>) {
    let stepping_filter = target.stepping_filter();
    let product_filter = target.product_filter();

    let mut best = None;
    let mut fallback = None;
    for (i, entry) in archive.files.iter().enumerate() {
        if entry.file_name.starts_with(&stepping_filter) {
            best = Some(i);
        } else if entry.file_name.starts_with(&product_filter) {
            fallback = Some(i);
        }
    }
    (best, fallback)
}
