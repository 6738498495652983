//! The assignment store: one JSON document on local disk.
//!
//! Every operation reads the whole document and, when it changes, writes the
//! whole document back. Writers go through [`Store::update`], which holds an
//! in-process mutex for the read-modify-write and replaces the file by
//! renaming a sibling temp file over it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AppError;
use crate::models::Assignment;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

pub struct Store {
    path: PathBuf,
    gate: Mutex<()>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current document. A missing file is an empty store; an
    /// unreadable or invalid one is an error, never an empty store.
    pub async fn load(&self) -> Result<StoreDocument, AppError> {
        self.read_document().await
    }

    /// Runs `f` against the current document while holding the store gate.
    /// The document is written back only if `f` succeeds and changed it.
    pub async fn update<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut StoreDocument) -> Result<T, AppError>,
    {
        let _guard = self.gate.lock().await;

        let original = self.read_document().await?;
        let mut doc = original.clone();
        let out = f(&mut doc)?;

        if doc != original {
            self.write_document(&doc).await?;
        }
        Ok(out)
    }

    async fn read_document(&self) -> Result<StoreDocument, AppError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("store {} does not exist yet", self.path.display());
                return Ok(StoreDocument::default());
            }
            Err(e) => {
                return Err(AppError::StoreCorrupt(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&text)
            .map_err(|e| AppError::StoreCorrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn write_document(&self, doc: &StoreDocument) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let text = serde_json::to_string_pretty(doc).map_err(std::io::Error::from)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            "wrote {} assignments to {}",
            doc.assignments.len(),
            self.path.display()
        );
        Ok(())
    }
}
