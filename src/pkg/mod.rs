//! Push package build pipeline
//!
//! A package moves through four strictly sequential stages, each one's
//! on-disk output the next one's required input:
//!
//! materialize → manifest → sign → archive

pub mod archive;
pub mod certificate;
pub mod generator;
pub mod manifest;
pub mod package;
pub mod signature;
pub mod template;
pub mod verifier;

pub use archive::{ArchiveArtifact, Archives, ZipArchiver};
pub use certificate::Certificate;
pub use generator::{BuildReceipt, PackageGenerator};
pub use manifest::{BuildsManifest, Manifest, ManifestArtifact, ManifestBuilder};
pub use package::{BuildStage, Package};
pub use signature::{Pkcs7Signer, SignatureArtifact, Signs};
pub use template::{
    Materialized, Materializes, SubstitutionValues, TemplateMaterializer, TemplateSet,
};
pub use verifier::VerifyResult;

/// Entry name of the digest manifest inside the working directory and archive
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Entry name of the detached signature inside the working directory and archive
pub const SIGNATURE_FILE_NAME: &str = "signature";
