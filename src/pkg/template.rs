//! Template set and materialization
//!
//! The template set is the single source of truth for which files make
//! up a package: materialization, manifest computation and archive
//! membership all iterate the same list. Drift between stages is a
//! correctness bug, so the set is an explicit immutable value passed to
//! each component rather than shared state.

use crate::exceptions::{PushPackError, Result};
use crate::pkg::{MANIFEST_FILE_NAME, SIGNATURE_FILE_NAME, Package};
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

/// Fixed, ordered list of relative file names every build must contain.
///
/// One designated entry is a text document subject to placeholder
/// substitution; all others are copied byte-for-byte.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    entries: Vec<String>,
    document: String,
}

impl TemplateSet {
    /// The Safari web push package layout: six iconset sizes plus the
    /// templated `website.json` configuration document.
    pub fn safari_default() -> Self {
        TemplateSet {
            entries: vec![
                "icon.iconset/icon_16x16.png".to_string(),
                "icon.iconset/icon_16x16@2x.png".to_string(),
                "icon.iconset/icon_32x32.png".to_string(),
                "icon.iconset/icon_32x32@2x.png".to_string(),
                "icon.iconset/icon_128x128.png".to_string(),
                "icon.iconset/icon_128x128@2x.png".to_string(),
                "website.json".to_string(),
            ],
            document: "website.json".to_string(),
        }
    }

    /// Build a custom set. The designated document must be one of the
    /// entries.
    pub fn new(entries: Vec<String>, document: impl Into<String>) -> Result<Self> {
        let document = document.into();
        if !entries.iter().any(|e| *e == document) {
            return Err(PushPackError::BuildError(format!(
                "Designated document '{document}' is not part of the template set"
            )));
        }
        Ok(TemplateSet { entries, document })
    }

    /// Relative paths of the template files, in declared order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Relative path of the substitution target
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Every entry the final archive must contain: the template files
    /// followed by the manifest and the signature.
    pub fn archive_entries(&self) -> Vec<String> {
        let mut entries = self.entries.clone();
        entries.push(MANIFEST_FILE_NAME.to_string());
        entries.push(SIGNATURE_FILE_NAME.to_string());
        entries
    }
}

/// Build-time values substituted into the templated document
#[derive(Debug, Clone, Default)]
pub struct SubstitutionValues {
    /// Primary delivery host, also the fallback push domain
    pub host: String,
    /// Base delivery domains; empty means "use the host"
    pub push_domains: Vec<String>,
    /// Display name shown to the recipient
    pub website_name: String,
    /// Push-service identifier
    pub website_push_id: String,
    /// Delivery-service host; defaults to `host` when unset
    pub web_service_host: Option<String>,
}

/// Format the push-domain list for its array-shaped template slot.
///
/// Each value is JSON-quoted, values without an `http` scheme gain
/// `https://`, and values are joined with `", "`. An empty list falls
/// back to the host. The output is always a syntactically valid list
/// body, single value or not.
pub fn format_push_domains(domains: &[String], fallback: &str) -> String {
    let list: Vec<&str> = if domains.is_empty() {
        vec![fallback]
    } else {
        domains.iter().map(String::as_str).collect()
    };

    list.iter()
        .map(|domain| {
            if domain.starts_with("http") {
                format!("\"{domain}\"")
            } else {
                format!("\"https://{domain}\"")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Files written by materialization, absolute paths in template-set order
#[derive(Debug)]
pub struct Materialized {
    pub files: Vec<PathBuf>,
}

/// Capability: populate a package's working directory from templates
pub trait Materializes {
    fn materialize(&self, set: &TemplateSet, package: &Package) -> Result<Materialized>;
}

/// Copies the template set into the working directory, substituting
/// recognized `{{ token }}` placeholders in the designated document.
/// Unrecognized placeholders are left as literal text.
#[derive(Debug, Clone)]
pub struct TemplateMaterializer {
    template_dir: PathBuf,
    values: SubstitutionValues,
}

impl TemplateMaterializer {
    pub fn new(template_dir: impl Into<PathBuf>, values: SubstitutionValues) -> Self {
        TemplateMaterializer {
            template_dir: template_dir.into(),
            values,
        }
    }

    fn substitute(&self, document: &str, package: &Package) -> String {
        let web_service_host = self
            .values
            .web_service_host
            .as_deref()
            .unwrap_or(&self.values.host);
        let push_domains = format_push_domains(&self.values.push_domains, &self.values.host);

        let replacements = [
            ("{{ recipientId }}", package.recipient_id()),
            ("{{ correlationId }}", package.correlation_id()),
            ("{{ host }}", self.values.host.as_str()),
            ("{{ pushSubDomain }}", push_domains.as_str()),
            ("{{ websiteName }}", self.values.website_name.as_str()),
            ("{{ websitePushId }}", self.values.website_push_id.as_str()),
            ("{{ webServiceHost }}", web_service_host),
        ];

        let mut output = document.to_string();
        for (token, value) in replacements {
            output = output.replace(token, value);
        }
        output
    }
}

impl Materializes for TemplateMaterializer {
    fn materialize(&self, set: &TemplateSet, package: &Package) -> Result<Materialized> {
        info!(
            "Materializing {} template files into {:?}",
            set.entries().len(),
            package.working_dir()
        );

        fs::create_dir_all(package.working_dir())?;

        let mut files = Vec::with_capacity(set.entries().len());

        for entry in set.entries() {
            let source = self.template_dir.join(entry);
            if !source.is_file() {
                return Err(PushPackError::MissingInput(source));
            }

            let destination = package.working_dir().join(entry);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }

            if entry == set.document() {
                let document = fs::read_to_string(&source)?;
                fs::write(&destination, self.substitute(&document, package))?;
                debug!("Substituted {entry}");
            } else {
                fs::copy(&source, &destination)?;
                debug!("Copied {entry}");
            }

            files.push(destination);
        }

        Ok(Materialized { files })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Materializes, SubstitutionValues, TemplateMaterializer, TemplateSet, format_push_domains,
    };
    use crate::exceptions::PushPackError;
    use crate::pkg::Package;
    use std::fs;

    #[test]
    fn test_default_set_has_seven_entries_ending_in_document() {
        let set = TemplateSet::safari_default();
        assert_eq!(set.entries().len(), 7);
        assert_eq!(set.document(), "website.json");
        assert_eq!(set.entries().last().map(String::as_str), Some("website.json"));
    }

    #[test]
    fn test_archive_entries_append_manifest_and_signature() {
        let set = TemplateSet::safari_default();
        let entries = set.archive_entries();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[7], "manifest.json");
        assert_eq!(entries[8], "signature");
    }

    #[test]
    fn test_document_must_be_an_entry() {
        let result = TemplateSet::new(vec!["a.png".to_string()], "website.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_single_domain_gains_scheme_no_separator() {
        let domains = vec!["push.example.com".to_string()];
        assert_eq!(
            format_push_domains(&domains, "example.com"),
            "\"https://push.example.com\""
        );
    }

    #[test]
    fn test_multiple_domains_quoted_and_separated() {
        let domains = vec![
            "a.example.com".to_string(),
            "https://b.example.com".to_string(),
        ];
        assert_eq!(
            format_push_domains(&domains, "example.com"),
            "\"https://a.example.com\", \"https://b.example.com\""
        );
    }

    #[test]
    fn test_empty_domains_fall_back_to_host() {
        assert_eq!(
            format_push_domains(&[], "example.com"),
            "\"https://example.com\""
        );
    }

    #[test]
    fn test_substitution_replaces_tokens_and_leaves_rest() {
        let tmp = tempfile::TempDir::new().unwrap();
        let template_dir = tmp.path().join("templates");
        fs::create_dir_all(&template_dir).unwrap();
        fs::write(
            template_dir.join("website.json"),
            r#"{"id":"{{ recipientId }}","corr":"{{ correlationId }}","unknown":"{{ notAToken }}"}"#,
        )
        .unwrap();

        let set = TemplateSet::new(vec!["website.json".to_string()], "website.json").unwrap();
        let materializer =
            TemplateMaterializer::new(&template_dir, SubstitutionValues::default());
        let package = Package::new(tmp.path().join("work"), "abc123", "corr-9");

        materializer.materialize(&set, &package).unwrap();

        let document = fs::read_to_string(package.working_dir().join("website.json")).unwrap();
        assert_eq!(
            document,
            r#"{"id":"abc123","corr":"corr-9","unknown":"{{ notAToken }}"}"#
        );
    }

    #[test]
    fn test_missing_template_file_names_the_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let template_dir = tmp.path().join("templates");
        fs::create_dir_all(&template_dir).unwrap();

        let set = TemplateSet::safari_default();
        let materializer =
            TemplateMaterializer::new(&template_dir, SubstitutionValues::default());
        let package = Package::new(tmp.path().join("work"), "r", "c");

        match materializer.materialize(&set, &package) {
            Err(PushPackError::MissingInput(path)) => {
                assert!(path.ends_with("icon.iconset/icon_16x16.png"));
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }
}
