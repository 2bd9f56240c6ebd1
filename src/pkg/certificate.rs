//! Certificate holder for package signing
//!
//! Wraps the issuer certificate, its private key and an optional
//! intermediate certificate as opaque material. The pipeline never
//! inspects their structure beyond what the signing operation requires.

use crate::exceptions::{PushPackError, Result};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::fmt;
use std::fs;
use std::path::Path;

/// Issuer certificate, private key and optional intermediate certificate
pub struct Certificate {
    cert: X509,
    key: PKey<Private>,
    intermediate: Option<X509>,
}

impl Certificate {
    /// Load from PEM-encoded bytes
    pub fn from_pem(
        cert_pem: &[u8],
        key_pem: &[u8],
        intermediate_pem: Option<&[u8]>,
    ) -> Result<Self> {
        let cert = X509::from_pem(cert_pem)?;
        let key = PKey::private_key_from_pem(key_pem)?;
        let intermediate = match intermediate_pem {
            Some(pem) => Some(X509::from_pem(pem)?),
            None => None,
        };
        Ok(Certificate {
            cert,
            key,
            intermediate,
        })
    }

    /// Load from PEM-encoded bytes with a passphrase-protected key
    pub fn from_pem_with_passphrase(
        cert_pem: &[u8],
        key_pem: &[u8],
        passphrase: &[u8],
        intermediate_pem: Option<&[u8]>,
    ) -> Result<Self> {
        let cert = X509::from_pem(cert_pem)?;
        let key = PKey::private_key_from_pem_passphrase(key_pem, passphrase)?;
        let intermediate = match intermediate_pem {
            Some(pem) => Some(X509::from_pem(pem)?),
            None => None,
        };
        Ok(Certificate {
            cert,
            key,
            intermediate,
        })
    }

    /// Load from PEM files on disk
    pub fn from_pem_files(
        cert_path: &Path,
        key_path: &Path,
        intermediate_path: Option<&Path>,
        passphrase: Option<&str>,
    ) -> Result<Self> {
        let cert_pem = read_pem(cert_path)?;
        let key_pem = read_pem(key_path)?;
        let intermediate_pem = match intermediate_path {
            Some(path) => Some(read_pem(path)?),
            None => None,
        };

        match passphrase {
            Some(pass) => Self::from_pem_with_passphrase(
                &cert_pem,
                &key_pem,
                pass.as_bytes(),
                intermediate_pem.as_deref(),
            ),
            None => Self::from_pem(&cert_pem, &key_pem, intermediate_pem.as_deref()),
        }
    }

    /// The issuer certificate
    pub fn cert(&self) -> &X509 {
        &self.cert
    }

    /// The issuer's private key
    pub fn key(&self) -> &PKey<Private> {
        &self.key
    }

    /// Intermediate certificate for chain building, if supplied
    pub fn intermediate(&self) -> Option<&X509> {
        self.intermediate.as_ref()
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("has_intermediate", &self.intermediate.is_some())
            .finish_non_exhaustive()
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(PushPackError::MissingInput(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Generate a throwaway self-signed RSA identity for signing tests.
#[cfg(test)]
pub(crate) fn generate_test_identity() -> (Vec<u8>, Vec<u8>) {
    use openssl::asn1::Asn1Time;
    use openssl::hash::MessageDigest;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509Builder, X509NameBuilder};

    let rsa = Rsa::generate(2048).unwrap();
    let key = PKey::from_rsa(rsa).unwrap();

    let mut name_builder = X509NameBuilder::new().unwrap();
    name_builder
        .append_entry_by_text("CN", "pushpack-test")
        .unwrap();
    let name = name_builder.build();

    let mut x509_builder = X509Builder::new().unwrap();
    x509_builder.set_version(2).unwrap();
    x509_builder.set_subject_name(&name).unwrap();
    x509_builder.set_issuer_name(&name).unwrap();
    x509_builder.set_pubkey(&key).unwrap();

    let not_before = Asn1Time::days_from_now(0).unwrap();
    let not_after = Asn1Time::days_from_now(365).unwrap();
    x509_builder.set_not_before(&not_before).unwrap();
    x509_builder.set_not_after(&not_after).unwrap();

    x509_builder.sign(&key, MessageDigest::sha256()).unwrap();
    let cert = x509_builder.build();

    (
        cert.to_pem().unwrap(),
        key.private_key_to_pem_pkcs8().unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::{Certificate, generate_test_identity};
    use crate::exceptions::PushPackError;
    use std::path::Path;

    #[test]
    fn test_from_pem_loads_cert_and_key() {
        let (cert_pem, key_pem) = generate_test_identity();
        let certificate = Certificate::from_pem(&cert_pem, &key_pem, None).unwrap();
        assert!(certificate.intermediate().is_none());
    }

    #[test]
    fn test_intermediate_is_carried() {
        let (cert_pem, key_pem) = generate_test_identity();
        let (intermediate_pem, _) = generate_test_identity();
        let certificate =
            Certificate::from_pem(&cert_pem, &key_pem, Some(&intermediate_pem)).unwrap();
        assert!(certificate.intermediate().is_some());
    }

    #[test]
    fn test_garbage_pem_is_a_crypto_error() {
        let result = Certificate::from_pem(b"not a pem", b"also not a pem", None);
        assert!(matches!(result, Err(PushPackError::CryptoError(_))));
    }

    #[test]
    fn test_missing_pem_file_names_the_path() {
        let missing = Path::new("/nonexistent/issuer.pem");
        let result = Certificate::from_pem_files(missing, missing, None, None);
        assert!(matches!(result, Err(PushPackError::MissingInput(_))));
    }
}
