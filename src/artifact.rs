//! @acp:module "Artifacts"
//! @acp:summary "Saving and opening generated test documents"
//! @acp:domain cli
//! @acp:layer output
//!
//! Generated test documents
//!
//! After a test is created the server renders it on demand. The document is
//! written to the artifact directory and handed to the platform opener.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::api::TestId;
use crate::error::Result;

/// Rendered test document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub test_id: TestId,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// File extension derived from the content type, `html` when unknown
    pub fn extension(&self) -> &'static str {
        let content_type = self
            .content_type
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.contains("pdf") {
            "pdf"
        } else if content_type.contains("wordprocessingml") {
            "docx"
        } else if content_type.starts_with("text/plain") {
            "txt"
        } else {
            "html"
        }
    }

    pub fn file_name(&self) -> String {
        format!("test-{}.{}", self.test_id, self.extension())
    }
}

/// Presents a generated document to the user
pub trait ArtifactViewer {
    /// Returns where the document ended up, if it was stored
    fn open(&mut self, artifact: &Artifact) -> Result<Option<PathBuf>>;
}

/// Writes documents to a directory and optionally launches the system opener
#[derive(Debug, Clone)]
pub struct FileViewer {
    dir: PathBuf,
    launch: bool,
}

impl FileViewer {
    pub fn new(dir: impl Into<PathBuf>, launch: bool) -> Self {
        Self {
            dir: dir.into(),
            launch,
        }
    }

    fn launch(path: &Path) {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        };

        let spawned = command
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(_) => debug!(path = %path.display(), "opener launched"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not launch opener"),
        }
    }
}

impl ArtifactViewer for FileViewer {
    fn open(&mut self, artifact: &Artifact) -> Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(artifact.file_name());
        std::fs::write(&path, &artifact.bytes)?;
        debug!(path = %path.display(), bytes = artifact.bytes.len(), "artifact written");

        if self.launch {
            Self::launch(&path);
        }
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(content_type: Option<&str>) -> Artifact {
        Artifact {
            test_id: TestId(17),
            content_type: content_type.map(str::to_string),
            bytes: b"<h1>Quiz</h1>".to_vec(),
        }
    }

    #[test]
    fn test_extension_from_content_type() {
        assert_eq!(artifact(Some("application/pdf")).extension(), "pdf");
        assert_eq!(artifact(Some("text/html; charset=utf-8")).extension(), "html");
        assert_eq!(artifact(Some("text/plain")).extension(), "txt");
        assert_eq!(artifact(None).extension(), "html");
        assert_eq!(artifact(None).file_name(), "test-17.html");
    }

    #[test]
    fn test_file_viewer_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = FileViewer::new(dir.path().join("out"), false);

        let path = viewer.open(&artifact(None)).unwrap().unwrap();

        assert_eq!(path, dir.path().join("out").join("test-17.html"));
        assert_eq!(std::fs::read(&path).unwrap(), b"<h1>Quiz</h1>");
    }
}
