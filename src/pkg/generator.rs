//! Pipeline orchestrator
//!
//! Drives one package through materialize → manifest → sign → archive.
//! The four stages are capability traits so tests can substitute doubles
//! without touching the driver. Each stage returns a structured artifact
//! describing what it wrote; the receipt collects them all so callers
//! can assert on results instead of re-reading the disk.

use crate::exceptions::Result;
use crate::pkg::{
    ArchiveArtifact, Archives, BuildStage, BuildsManifest, Certificate, ManifestArtifact,
    ManifestBuilder, Materialized, Materializes, Package, Pkcs7Signer, SignatureArtifact, Signs,
    SubstitutionValues, TemplateMaterializer, TemplateSet, ZipArchiver,
};
use log::info;
use std::path::{Path, PathBuf};

/// Everything one successful build produced
#[derive(Debug)]
pub struct BuildReceipt {
    pub package: Package,
    pub materialized: Materialized,
    pub manifest: ManifestArtifact,
    pub signature: SignatureArtifact,
    pub archive: ArchiveArtifact,
}

/// Sequential build pipeline over injected stage implementations
#[derive(Debug)]
pub struct PackageGenerator<M, B, S, A> {
    template_set: TemplateSet,
    base_dir: PathBuf,
    materializer: M,
    manifester: B,
    signer: S,
    archiver: A,
}

impl PackageGenerator<TemplateMaterializer, ManifestBuilder, Pkcs7Signer, ZipArchiver> {
    /// Generator with the default stage implementations and the Safari
    /// template layout.
    pub fn new(
        certificate: Certificate,
        template_dir: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
        values: SubstitutionValues,
    ) -> Self {
        PackageGenerator {
            template_set: TemplateSet::safari_default(),
            base_dir: base_dir.into(),
            materializer: TemplateMaterializer::new(template_dir, values),
            manifester: ManifestBuilder,
            signer: Pkcs7Signer::new(certificate),
            archiver: ZipArchiver,
        }
    }
}

impl<M, B, S, A> PackageGenerator<M, B, S, A>
where
    M: Materializes,
    B: BuildsManifest,
    S: Signs,
    A: Archives,
{
    /// Generator over explicit stage implementations, for tests and
    /// custom template layouts.
    pub fn with_components(
        template_set: TemplateSet,
        base_dir: impl Into<PathBuf>,
        materializer: M,
        manifester: B,
        signer: S,
        archiver: A,
    ) -> Self {
        PackageGenerator {
            template_set,
            base_dir: base_dir.into(),
            materializer,
            manifester,
            signer,
            archiver,
        }
    }

    /// The template set this generator builds from
    pub fn template_set(&self) -> &TemplateSet {
        &self.template_set
    }

    /// Base directory working directories are created under
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Build a push package for the given recipient in a fresh working
    /// directory.
    pub fn create_push_package(
        &self,
        recipient_id: &str,
        correlation_id: &str,
    ) -> Result<BuildReceipt> {
        let package = Package::for_recipient(&self.base_dir, recipient_id, correlation_id);
        self.build(package)
    }

    /// Run the pipeline for an already-described package.
    ///
    /// A stage failure halts the pipeline with the package left in its
    /// current stage; partially written working-directory contents are
    /// the caller's to clean up.
    pub fn build(&self, mut package: Package) -> Result<BuildReceipt> {
        info!(
            "📦 Building push package for recipient '{}' (correlation '{}')",
            package.recipient_id(),
            package.correlation_id()
        );

        let materialized = self.materializer.materialize(&self.template_set, &package)?;
        package.advance(BuildStage::Materialized);

        let manifest = self.manifester.build_manifest(&self.template_set, &package)?;
        package.advance(BuildStage::Manifested);

        let signature = self.signer.sign(&manifest, &package)?;
        package.advance(BuildStage::Signed);

        let archive = self.archiver.archive(&self.template_set, &package)?;
        package.advance(BuildStage::Archived);

        info!("✅ Package archived at {:?}", archive.path);

        Ok(BuildReceipt {
            package,
            materialized,
            manifest,
            signature,
            archive,
        })
    }
}
