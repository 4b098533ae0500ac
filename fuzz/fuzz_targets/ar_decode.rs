//! Fuzz the AR decoder with arbitrary bytes: must never panic, and anything
//! that decodes must re-encode and decode again to the same entries.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(decoded) = far::decode(data) else {
        return;
    };

    let entries: Vec<(&str, &[u8])> = decoded
        .archive
        .files
        .iter()
        .map(|f| (f.file_name.as_str(), f.file_data))
        .collect();
    if let Ok(reencoded) = far::encode(&entries) {
        let again = far::decode(&reencoded).expect("re-encoded archive must decode");
        assert_eq!(again.archive.files.len(), decoded.archive.files.len());
        for (a, b) in again.archive.files.iter().zip(&decoded.archive.files) {
            assert_eq!(a.file_name, b.file_name);
            assert_eq!(a.file_data, b.file_data);
        }
    }
});
