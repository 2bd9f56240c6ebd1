//! Push package verifier
//!
//! Re-opens a built archive and checks what the consuming notification
//! agent will check: the entry set, every content digest, and the
//! detached signature over the manifest bytes.

use crate::exceptions::{PushPackError, Result};
use crate::pkg::manifest::{Manifest, sha1_hex};
use crate::pkg::signature::verify_detached;
use crate::pkg::{MANIFEST_FILE_NAME, SIGNATURE_FILE_NAME, TemplateSet};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Result of package verification
#[derive(Debug)]
pub struct VerifyResult {
    /// Archive entry names are exactly template set + manifest + signature
    pub entries_valid: bool,
    /// Every entry's SHA-1 matches its manifest digest, and the manifest
    /// keys are exactly the template set
    pub digests_valid: bool,
    /// Detached signature verifies against the manifest bytes
    pub signature_valid: bool,
    /// Number of entries found in the archive
    pub entry_count: usize,
}

impl VerifyResult {
    /// All checks passed
    pub fn is_valid(&self) -> bool {
        self.entries_valid && self.digests_valid && self.signature_valid
    }
}

/// Verify a built push package archive against the template set it was
/// built from.
pub fn verify(archive_path: &Path, set: &TemplateSet) -> Result<VerifyResult> {
    info!("Verifying push package: {archive_path:?}");

    if !archive_path.is_file() {
        return Err(PushPackError::MissingInput(archive_path.to_path_buf()));
    }

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| PushPackError::VerificationFailed(format!("Unreadable archive: {e}")))?;

    let names: BTreeSet<String> = archive.file_names().map(str::to_string).collect();
    let expected: BTreeSet<String> = set.archive_entries().into_iter().collect();
    let entries_valid = names == expected;
    debug!(
        "Entry set: {}",
        if entries_valid { "valid" } else { "mismatch" }
    );

    let manifest_bytes = read_entry(&mut archive, MANIFEST_FILE_NAME)?;
    let manifest = Manifest::from_json_bytes(&manifest_bytes)?;

    let manifest_keys: BTreeSet<&str> = manifest.digests().keys().map(String::as_str).collect();
    let template_entries: BTreeSet<&str> = set.entries().iter().map(String::as_str).collect();
    let mut digests_valid = manifest_keys == template_entries;

    if digests_valid {
        for entry in set.entries() {
            let data = read_entry(&mut archive, entry)?;
            let recorded = manifest.digest_for(entry);
            let computed = sha1_hex(&data);
            if recorded != Some(computed.as_str()) {
                debug!("Digest mismatch for {entry}");
                digests_valid = false;
                break;
            }
        }
    }
    debug!(
        "Digests: {}",
        if digests_valid { "valid" } else { "mismatch" }
    );

    let signature_der = read_entry(&mut archive, SIGNATURE_FILE_NAME)?;
    let signature_valid = verify_detached(&signature_der, &manifest_bytes)?;
    debug!(
        "Signature: {}",
        if signature_valid { "valid" } else { "invalid" }
    );

    Ok(VerifyResult {
        entries_valid,
        digests_valid,
        signature_valid,
        entry_count: names.len(),
    })
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| PushPackError::VerificationFailed(format!("Missing entry '{name}': {e}")))?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::verify;
    use crate::exceptions::PushPackError;
    use crate::pkg::TemplateSet;
    use std::path::Path;

    // Positive-path verification runs against real builds in api.rs tests;
    // here we cover the failure edges.

    #[test]
    fn test_nonexistent_archive_is_missing_input() {
        let result = verify(Path::new("/nonexistent/pkg.zip"), &TemplateSet::safari_default());
        assert!(matches!(result, Err(PushPackError::MissingInput(_))));
    }

    #[test]
    fn test_non_zip_file_is_a_verification_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pkg.zip");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        let result = verify(&path, &TemplateSet::safari_default());
        assert!(matches!(result, Err(PushPackError::VerificationFailed(_))));
    }
}
