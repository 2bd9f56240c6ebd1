//! Package descriptor and build stage tracking

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Pipeline position of a single package build.
///
/// Each transition is one component's successful completion; a failure
/// leaves the package in its current stage with no rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Initialized,
    Materialized,
    Manifested,
    Signed,
    Archived,
}

/// One recipient-specific build: its identity plus filesystem locations.
///
/// The working directory is unique to this build and never reused; the
/// archive path is derived from it by appending the `.zip` extension.
/// Deleting the working directory after archiving is the caller's job.
#[derive(Debug, Clone)]
pub struct Package {
    working_dir: PathBuf,
    recipient_id: String,
    correlation_id: String,
    archive_path: PathBuf,
    stage: BuildStage,
}

impl Package {
    /// Create a package descriptor rooted at the given working directory.
    ///
    /// The directory itself is created later, by materialization.
    pub fn new(
        working_dir: impl Into<PathBuf>,
        recipient_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        let working_dir = working_dir.into();
        let mut archive_path = OsString::from(working_dir.as_os_str());
        archive_path.push(".zip");

        Package {
            working_dir,
            recipient_id: recipient_id.into(),
            correlation_id: correlation_id.into(),
            archive_path: PathBuf::from(archive_path),
            stage: BuildStage::Initialized,
        }
    }

    /// Create a package with a fresh working directory under `base_dir`,
    /// named from a nanosecond timestamp, the recipient id and a random
    /// suffix so concurrent builds never collide.
    pub fn for_recipient(
        base_dir: &Path,
        recipient_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        let recipient_id = recipient_id.into();
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let suffix: u16 = rand::random();
        let dir_name = format!("pushpack-{nanos}-{recipient_id}-{suffix:04x}");

        Self::new(base_dir.join(dir_name), recipient_id, correlation_id)
    }

    /// Directory this build materializes into
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Recipient this package is built for
    pub fn recipient_id(&self) -> &str {
        &self.recipient_id
    }

    /// Correlation id carried through to the delivery subsystem
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Final archive location: `<working_dir>.zip`
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Current pipeline stage
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Record a completed stage transition. Transitions only move forward.
    pub(crate) fn advance(&mut self, stage: BuildStage) {
        debug_assert!(stage > self.stage, "build stages must advance forward");
        self.stage = stage;
    }
}
