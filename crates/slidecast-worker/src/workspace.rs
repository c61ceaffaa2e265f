//! Per-job temporary workspace.
//!
//! One workspace per orchestrator invocation, exclusively owned for the job's
//! lifetime. Backing storage is a `TempDir`, so removal happens on drop on
//! every exit path, including cancellation unwinding.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace under `root` (system temp dir when `None`), named
    /// with the job's short id for log correlation.
    pub fn create(root: Option<&Path>, job_tag: &str) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        let prefix = format!("slidecast-{}-", job_tag);
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Workspace-relative artifact path.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
