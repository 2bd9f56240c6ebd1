//! Digest manifest construction
//!
//! The manifest maps each template-set entry to the lowercase hex SHA-1
//! of its materialized bytes. The serialized form written to disk is
//! exactly what the signature covers; the builder returns those bytes so
//! the signer never re-reads or re-serializes.

use crate::exceptions::{PushPackError, Result};
use crate::pkg::{MANIFEST_FILE_NAME, Package, TemplateSet};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// Lowercase hex SHA-1 of a byte slice
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Lowercase hex SHA-1 computed with streaming I/O
pub fn sha1_hex_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    const BUFFER_SIZE: usize = 64 * 1024;
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut hasher = Sha1::new();

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Mapping of relative file path to content digest.
///
/// Sorted order makes the serialized form stable within a build and
/// byte-identical across builds with identical inputs; verifiers must
/// treat it as an unordered mapping regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    digests: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(digests: BTreeMap<String, String>) -> Self {
        Manifest { digests }
    }

    /// Relative path → lowercase hex SHA-1
    pub fn digests(&self) -> &BTreeMap<String, String> {
        &self.digests
    }

    /// Recorded digest for one entry
    pub fn digest_for(&self, entry: &str) -> Option<&str> {
        self.digests.get(entry).map(String::as_str)
    }

    /// Serialize to the canonical on-disk form
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse from serialized manifest bytes
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// What the manifest stage wrote: the file location, the exact bytes on
/// disk (the signature input), and the parsed mapping.
#[derive(Debug)]
pub struct ManifestArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub manifest: Manifest,
}

/// Capability: produce the digest manifest for a materialized package
pub trait BuildsManifest {
    fn build_manifest(&self, set: &TemplateSet, package: &Package) -> Result<ManifestArtifact>;
}

/// Default manifest builder: reads each materialized file in template-set
/// order and writes `manifest.json` into the working directory.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder;

impl BuildsManifest for ManifestBuilder {
    fn build_manifest(&self, set: &TemplateSet, package: &Package) -> Result<ManifestArtifact> {
        info!("Building digest manifest for {:?}", package.working_dir());

        let mut digests = BTreeMap::new();
        for entry in set.entries() {
            let path = package.working_dir().join(entry);
            if !path.is_file() {
                return Err(PushPackError::MissingInput(path));
            }
            let digest = sha1_hex_reader(fs::File::open(&path)?)?;
            debug!("{entry}: sha1 {digest}");
            digests.insert(entry.clone(), digest);
        }

        let manifest = Manifest::new(digests);
        let bytes = manifest.to_json_bytes()?;
        let path = package.working_dir().join(MANIFEST_FILE_NAME);
        fs::write(&path, &bytes)?;

        Ok(ManifestArtifact {
            path,
            bytes,
            manifest,
        })
    }
}
