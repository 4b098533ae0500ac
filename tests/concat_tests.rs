//! Concat tests: merging archives, dropping stale pad entries, raw inputs
//! through the product-config note seam.

use far::{
    concatenate, decode, encode, ArchiveOnlyInputs, ConcatError, NoteError, ProductConfig,
    ProductConfigReader, HEADER_SIZE, PAD_ENTRY_PREFIX,
};

/// Note reader for tests: fixed product config for every raw input.
struct FixedNotes(ProductConfig);

impl ProductConfigReader for FixedNotes {
    fn read_product_config(&self, _binary: &[u8]) -> Result<ProductConfig, NoteError> {
        Ok(self.0)
    }
}

fn non_pad_names(bytes: &[u8]) -> Vec<String> {
    decode(bytes)
        .unwrap()
        .archive
        .files
        .iter()
        .filter(|f| !f.file_name.starts_with(PAD_ENTRY_PREFIX))
        .map(|f| f.file_name.clone())
        .collect()
}

/// Stale `pad_` placeholders from a previous pass are dropped; every other
/// entry survives in its original relative order.
#[test]
fn concat_drops_stale_pad_entries() {
    let first = encode(&[("64.prodX.3", b"one"), ("pad_0", b"STALEPAD"), ("64.prodX.5", b"two")]).unwrap();
    let second = encode(&[("64.prodY.1", b"three")]).unwrap();

    let merged = concatenate(
        &[("first.ar", first.as_slice()), ("second.ar", second.as_slice())],
        &ArchiveOnlyInputs,
    )
    .unwrap();

    assert_eq!(
        non_pad_names(&merged),
        vec!["64.prodX.3", "64.prodX.5", "64.prodY.1"]
    );
    // The stale placeholder payload is gone even though the aligned output
    // contains fresh pad entries of its own.
    let decoded = decode(&merged).unwrap();
    assert!(decoded.archive.files.iter().all(|f| f.file_data != b"STALEPAD"));
}

/// Merged payloads are 8-byte aligned for downstream binary formats.
#[test]
fn concat_output_is_data_aligned() {
    let first = encode(&[("64.prodX.3", b"odd_payload")]).unwrap();
    let second = encode(&[("64.prodY.1", b"another")]).unwrap();

    let merged = concatenate(
        &[("a.ar", first.as_slice()), ("b.ar", second.as_slice())],
        &ArchiveOnlyInputs,
    )
    .unwrap();

    let decoded = decode(&merged).unwrap();
    for entry in decoded
        .archive
        .files
        .iter()
        .filter(|f| !f.file_name.starts_with(PAD_ENTRY_PREFIX))
    {
        assert_eq!((entry.header_offset + HEADER_SIZE) % 8, 0, "{}", entry.file_name);
    }
}

/// A raw (non-archive) input is named by its product-config note.
#[test]
fn concat_names_raw_input_from_note() {
    let archive = encode(&[("64.prodX.3", b"packed")]).unwrap();
    let raw = b"raw device binary, definitely not an AR archive";

    let notes = FixedNotes(ProductConfig {
        major: 12,
        minor: 55,
        revision: 8,
    });
    let merged = concatenate(
        &[("input.ar", archive.as_slice()), ("kernel.bin", raw.as_slice())],
        &notes,
    )
    .unwrap();

    let decoded = decode(&merged).unwrap();
    let raw_entry = decoded
        .archive
        .files
        .iter()
        .find(|f| f.file_name == "12.55.8")
        .expect("note-derived entry");
    assert_eq!(raw_entry.file_data, raw);
}

/// A raw input without note support aborts the whole concatenation, naming
/// the offending file.
#[test]
fn concat_raw_input_without_notes_fails() {
    let archive = encode(&[("64.prodX.3", b"packed")]).unwrap();
    let err = concatenate(
        &[("good.ar", archive.as_slice()), ("kernel.bin", b"raw".as_slice())],
        &ArchiveOnlyInputs,
    )
    .unwrap_err();

    let ConcatError::Input { file, .. } = &err;
    assert_eq!(file, "kernel.bin");
    assert!(err.to_string().contains("kernel.bin"));
    assert!(err
        .to_string()
        .contains("not a zebin and not a supported container format"));
}

/// A corrupt archive input aborts with the decode failure, not a partial merge.
#[test]
fn concat_corrupt_archive_input_fails() {
    let mut corrupt = encode(&[("64.prodX.3", b"packed")]).unwrap();
    corrupt.truncate(corrupt.len() - 2); // declared size now runs out of bounds

    let err = concatenate(&[("bad.ar", corrupt.as_slice())], &ArchiveOnlyInputs).unwrap_err();
    let ConcatError::Input { file, .. } = &err;
    assert_eq!(file, "bad.ar");
    assert!(err.to_string().contains("out of bounds"));
}

/// Concat of a concat (via files on disk, as the CLI does it): no pad
/// accumulation, same non-pad entries.
#[test]
fn concat_twice_does_not_accumulate_pads() {
    use std::io::Write;

    let first = encode(&[("64.prodX.3", b"one"), ("64.prodY.1", b"two")]).unwrap();
    let merged = concatenate(&[("first.ar", first.as_slice())], &ArchiveOnlyInputs).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&merged).unwrap();
    file.flush().unwrap();
    let reread = std::fs::read(file.path()).unwrap();

    let remerged = concatenate(&[("merged.ar", reread.as_slice())], &ArchiveOnlyInputs).unwrap();
    assert_eq!(non_pad_names(&remerged), non_pad_names(&merged));

    let pads = |bytes: &[u8]| {
        decode(bytes)
            .unwrap()
            .archive
            .files
            .iter()
            .filter(|f| f.file_name.starts_with(PAD_ENTRY_PREFIX))
            .count()
    };
    assert_eq!(pads(&remerged), pads(&merged));
}
