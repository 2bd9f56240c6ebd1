//! High-level API for push package operations

use crate::exceptions::{PushPackError, Result};
use crate::pkg::{
    BuildReceipt, Certificate, PackageGenerator, SubstitutionValues, TemplateSet, VerifyResult,
    verifier,
};
use log::info;
use std::path::{Path, PathBuf};

/// Options for building a push package
#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Path to the issuer certificate (PEM)
    pub certificate_path: PathBuf,
    /// Path to the issuer private key (PEM)
    pub private_key_path: PathBuf,
    /// Passphrase for the private key, if protected
    pub key_passphrase: Option<String>,
    /// Path to an intermediate certificate (PEM)
    pub intermediate_path: Option<PathBuf>,
    /// Directory holding the template files
    pub template_dir: PathBuf,
    /// Base directory for working directories; defaults to the system
    /// temp directory
    pub output_dir: Option<PathBuf>,
    /// Primary delivery host
    pub host: String,
    /// Base delivery domains; empty falls back to the host
    pub push_domains: Vec<String>,
    /// Display name shown to the recipient
    pub website_name: String,
    /// Push-service identifier
    pub website_push_id: String,
    /// Delivery-service host; defaults to the host
    pub web_service_host: Option<String>,
    /// Skip verification after building
    pub skip_verification: bool,
}

/// Build a push package for one recipient.
///
/// Runs the full pipeline in a fresh working directory and, unless
/// `skip_verification` is set, re-opens the archive and verifies it the
/// way a consuming agent would.
pub fn build_push_package(
    recipient_id: &str,
    correlation_id: &str,
    options: &BuildOptions,
) -> Result<BuildReceipt> {
    let certificate = Certificate::from_pem_files(
        &options.certificate_path,
        &options.private_key_path,
        options.intermediate_path.as_deref(),
        options.key_passphrase.as_deref(),
    )?;

    let values = SubstitutionValues {
        host: options.host.clone(),
        push_domains: options.push_domains.clone(),
        website_name: options.website_name.clone(),
        website_push_id: options.website_push_id.clone(),
        web_service_host: options.web_service_host.clone(),
    };

    let base_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    let generator = PackageGenerator::new(certificate, &options.template_dir, base_dir, values);
    let receipt = generator.create_push_package(recipient_id, correlation_id)?;

    if !options.skip_verification {
        let result = verify_push_package(&receipt.archive.path)?;
        if !result.is_valid() {
            return Err(PushPackError::VerificationFailed(format!(
                "Built archive failed verification: {result:?}"
            )));
        }
        info!("Verified {} archive entries", result.entry_count);
    }

    Ok(receipt)
}

/// Verify a built push package against the default Safari layout
pub fn verify_push_package(archive_path: &Path) -> Result<VerifyResult> {
    verifier::verify(archive_path, &TemplateSet::safari_default())
}

#[cfg(test)]
mod tests {
    use super::{BuildOptions, build_push_package, verify_push_package};
    use crate::exceptions::PushPackError;
    use crate::pkg::certificate::generate_test_identity;
    use std::fs;
    use std::path::Path;

    const ICONS: [&str; 6] = [
        "icon_16x16.png",
        "icon_16x16@2x.png",
        "icon_32x32.png",
        "icon_32x32@2x.png",
        "icon_128x128.png",
        "icon_128x128@2x.png",
    ];

    fn write_template_dir(root: &Path) {
        let iconset = root.join("icon.iconset");
        fs::create_dir_all(&iconset).unwrap();
        for icon in ICONS {
            fs::write(iconset.join(icon), format!("png:{icon}")).unwrap();
        }
        fs::write(
            root.join("website.json"),
            concat!(
                r#"{"websiteName":"{{ websiteName }}","websitePushID":"{{ websitePushId }}","#,
                r#""allowedDomains":[{{ pushSubDomain }}],"#,
                r#""urlFormatString":"https://{{ host }}/%@","#,
                r#""authenticationToken":"{{ recipientId }}:{{ correlationId }}","#,
                r#""webServiceURL":"https://{{ webServiceHost }}/push"}"#
            ),
        )
        .unwrap();
    }

    fn options(tmp: &tempfile::TempDir) -> BuildOptions {
        let (cert_pem, key_pem) = generate_test_identity();
        let cert_path = tmp.path().join("issuer.pem");
        let key_path = tmp.path().join("issuer.key");
        fs::write(&cert_path, cert_pem).unwrap();
        fs::write(&key_path, key_pem).unwrap();

        let template_dir = tmp.path().join("templates");
        write_template_dir(&template_dir);

        BuildOptions {
            certificate_path: cert_path,
            private_key_path: key_path,
            template_dir,
            output_dir: Some(tmp.path().join("out")),
            host: "example.com".to_string(),
            push_domains: vec![
                "a.example.com".to_string(),
                "https://b.example.com".to_string(),
            ],
            website_name: "Example".to_string(),
            website_push_id: "web.com.example".to_string(),
            ..BuildOptions::default()
        }
    }

    #[test]
    fn test_end_to_end_build_and_verify() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("out")).unwrap();
        let options = options(&tmp);

        let receipt = build_push_package("abc123", "corr-1", &options).unwrap();
        assert!(receipt.archive.path.is_file());
        assert_eq!(receipt.archive.entries.len(), 9);

        let result = verify_push_package(&receipt.archive.path).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.entry_count, 9);

        // The substituted document carries the recipient identity and a
        // valid, scheme-prefixed domain list
        let document =
            fs::read_to_string(receipt.package.working_dir().join("website.json")).unwrap();
        assert!(document.contains(r#""authenticationToken":"abc123:corr-1""#));
        assert!(document.contains(
            r#""allowedDomains":["https://a.example.com", "https://b.example.com"]"#
        ));
    }

    #[test]
    fn test_manifests_are_byte_identical_across_builds() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("out")).unwrap();
        let options = options(&tmp);

        let first = build_push_package("abc123", "corr-1", &options).unwrap();
        let second = build_push_package("abc123", "corr-1", &options).unwrap();

        assert_ne!(first.package.working_dir(), second.package.working_dir());
        assert_eq!(first.manifest.bytes, second.manifest.bytes);
        // Signatures may legitimately differ (signing time attribute);
        // both must still verify, which build_push_package already did.
    }

    #[test]
    fn test_missing_template_asset_yields_no_archive() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("out")).unwrap();
        let options = options(&tmp);
        fs::remove_file(options.template_dir.join("icon.iconset/icon_32x32.png")).unwrap();

        match build_push_package("abc123", "corr-1", &options) {
            Err(PushPackError::MissingInput(path)) => {
                assert!(path.ends_with("icon.iconset/icon_32x32.png"));
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
        let archives: Vec<_> = fs::read_dir(tmp.path().join("out"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "zip"))
            .collect();
        assert!(archives.is_empty());
    }

    #[test]
    fn test_tampered_manifest_fails_verification() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("out")).unwrap();
        let mut options = options(&tmp);
        options.skip_verification = true;

        let receipt = build_push_package("abc123", "corr-1", &options).unwrap();

        // Rebuild the archive with one manifest byte flipped
        let mut manifest = fs::read(&receipt.manifest.path).unwrap();
        let last = manifest.len() - 3;
        manifest[last] = manifest[last].wrapping_add(1);
        fs::write(&receipt.manifest.path, &manifest).unwrap();

        use crate::pkg::{Archives, Package, TemplateSet, ZipArchiver};
        let package = Package::new(
            receipt.package.working_dir(),
            receipt.package.recipient_id(),
            receipt.package.correlation_id(),
        );
        ZipArchiver
            .archive(&TemplateSet::safari_default(), &package)
            .unwrap();

        let result = verify_push_package(&receipt.archive.path).unwrap();
        assert!(!result.is_valid());
        assert!(!result.signature_valid);
    }
}
