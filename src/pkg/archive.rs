//! Archive assembly
//!
//! The zip is the commit point of the pipeline. Nothing is written to
//! the archive path until every required file exists in the working
//! directory, and a failure part-way through removes the partial file so
//! callers never see something that looks complete.

use crate::exceptions::{PushPackError, Result};
use crate::pkg::{Package, TemplateSet};
use log::{debug, info};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// What the archive stage wrote: the zip location and its entry names,
/// in the order they were added
#[derive(Debug)]
pub struct ArchiveArtifact {
    pub path: PathBuf,
    pub entries: Vec<String>,
}

/// Capability: assemble the materialized files, manifest and signature
/// into the final archive
pub trait Archives {
    fn archive(&self, set: &TemplateSet, package: &Package) -> Result<ArchiveArtifact>;
}

/// Default archiver: flat zip entries at the template set's relative
/// paths plus `manifest.json` and `signature` at the root.
#[derive(Debug, Clone, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    fn add_entries(
        &self,
        zip: &mut ZipWriter<File>,
        entries: &[String],
        package: &Package,
    ) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            let path = package.working_dir().join(entry);
            zip.start_file(entry.as_str(), options)
                .map_err(|e| PushPackError::ArchiveError(format!("{entry}: {e}")))?;
            let mut file = File::open(&path)?;
            io::copy(&mut file, zip)?;
            debug!("Added {entry}");
        }
        Ok(())
    }
}

impl Archives for ZipArchiver {
    fn archive(&self, set: &TemplateSet, package: &Package) -> Result<ArchiveArtifact> {
        let archive_path = package.archive_path().to_path_buf();
        let entries = set.archive_entries();

        // All inputs must exist before the archive path is touched
        for entry in &entries {
            let path = package.working_dir().join(entry);
            if !path.is_file() {
                return Err(PushPackError::MissingInput(path));
            }
        }

        info!("Writing archive {:?} ({} entries)", archive_path, entries.len());

        let file = File::create(&archive_path)?;
        let mut zip = ZipWriter::new(file);

        if let Err(err) = self.add_entries(&mut zip, &entries, package) {
            drop(zip);
            let _ = fs::remove_file(&archive_path);
            return Err(err);
        }

        if let Err(err) = zip.finish() {
            let _ = fs::remove_file(&archive_path);
            return Err(PushPackError::ArchiveFinalization(format!(
                "Could not save archive {}: {err}",
                archive_path.display()
            )));
        }

        Ok(ArchiveArtifact {
            path: archive_path,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Archives, ZipArchiver};
    use crate::exceptions::PushPackError;
    use crate::pkg::{Package, TemplateSet};
    use std::collections::BTreeSet;
    use std::fs;
    use std::io::Read;

    fn staged_package(tmp: &tempfile::TempDir) -> (TemplateSet, Package) {
        let set = TemplateSet::new(
            vec![
                "icon.iconset/icon_16x16.png".to_string(),
                "website.json".to_string(),
            ],
            "website.json",
        )
        .unwrap();
        let package = Package::new(tmp.path().join("work"), "r", "c");
        fs::create_dir_all(package.working_dir().join("icon.iconset")).unwrap();
        fs::write(
            package.working_dir().join("icon.iconset/icon_16x16.png"),
            b"png",
        )
        .unwrap();
        fs::write(package.working_dir().join("website.json"), b"{}").unwrap();
        fs::write(package.working_dir().join("manifest.json"), b"{\"k\":\"v\"}").unwrap();
        fs::write(package.working_dir().join("signature"), b"\x30\x03\x02\x01\x00").unwrap();
        (set, package)
    }

    #[test]
    fn test_archive_contains_exactly_the_expected_entries() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (set, package) = staged_package(&tmp);

        let artifact = ZipArchiver.archive(&set, &package).unwrap();
        assert_eq!(artifact.path, package.archive_path());

        let file = fs::File::open(&artifact.path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let names: BTreeSet<String> = archive.file_names().map(str::to_string).collect();
        let expected: BTreeSet<String> = set.archive_entries().into_iter().collect();
        assert_eq!(names, expected);

        // Entry bytes survive the round trip
        let mut entry = archive.by_name("manifest.json").unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"{\"k\":\"v\"}");
    }

    #[test]
    fn test_missing_file_aborts_before_archive_is_created() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (set, package) = staged_package(&tmp);
        fs::remove_file(package.working_dir().join("signature")).unwrap();

        match ZipArchiver.archive(&set, &package) {
            Err(PushPackError::MissingInput(path)) => assert!(path.ends_with("signature")),
            other => panic!("expected MissingInput, got {other:?}"),
        }
        assert!(!package.archive_path().exists());
    }
}
