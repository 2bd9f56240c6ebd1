//! Detached PKCS#7 signing of the manifest
//!
//! The signature covers the manifest's exact on-disk bytes. DETACHED
//! keeps the signed content out of the container, BINARY suppresses the
//! MIME canonicalization that would otherwise rewrite the byte sequence
//! a verifier has to reproduce.

use crate::exceptions::Result;
use crate::pkg::{Certificate, ManifestArtifact, Package, SIGNATURE_FILE_NAME};
use log::{debug, info};
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::X509;
use openssl::x509::store::X509StoreBuilder;
use std::fs;
use std::path::PathBuf;

/// What the signing stage wrote: the file location and the DER bytes
#[derive(Debug)]
pub struct SignatureArtifact {
    pub path: PathBuf,
    pub der: Vec<u8>,
}

/// Capability: produce a detached signature over the manifest bytes
pub trait Signs {
    fn sign(&self, manifest: &ManifestArtifact, package: &Package) -> Result<SignatureArtifact>;
}

/// Default signer: PKCS#7 SignedData in binary DER, written to the
/// `signature` file alongside the manifest.
#[derive(Debug)]
pub struct Pkcs7Signer {
    certificate: Certificate,
}

impl Pkcs7Signer {
    pub fn new(certificate: Certificate) -> Self {
        Pkcs7Signer { certificate }
    }
}

impl Signs for Pkcs7Signer {
    fn sign(&self, manifest: &ManifestArtifact, package: &Package) -> Result<SignatureArtifact> {
        info!("Signing manifest ({} bytes)", manifest.bytes.len());

        let mut extra_certs: Stack<X509> = Stack::new()?;
        if let Some(intermediate) = self.certificate.intermediate() {
            extra_certs.push(intermediate.to_owned())?;
        }

        let flags = Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY;
        let pkcs7 = Pkcs7::sign(
            self.certificate.cert(),
            self.certificate.key(),
            &extra_certs,
            &manifest.bytes,
            flags,
        )?;
        let der = pkcs7.to_der()?;

        let path = package.working_dir().join(SIGNATURE_FILE_NAME);
        fs::write(&path, &der)?;
        debug!("Wrote detached signature: {} bytes DER", der.len());

        Ok(SignatureArtifact { path, der })
    }
}

/// Check a detached signature against the content it claims to cover.
///
/// Verifies the cryptographic signature using the certificates embedded
/// in the container; chain validation against a trust root is the
/// consuming agent's concern, not this pipeline's.
pub fn verify_detached(signature_der: &[u8], content: &[u8]) -> Result<bool> {
    let pkcs7 = Pkcs7::from_der(signature_der)?;
    let certs: Stack<X509> = Stack::new()?;
    let store = X509StoreBuilder::new()?.build();

    let flags = Pkcs7Flags::BINARY | Pkcs7Flags::NOVERIFY;
    match pkcs7.verify(&certs, &store, Some(content), None, flags) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
