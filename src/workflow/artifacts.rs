//! Artifact directory
//!
//! Downloads land here and extracted results are written here. The directory
//! belongs to the environment; workflows only create, clear and count.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::{Result, ScreenflowError};

/// Handle on the artifact directory
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the directory if needed
    pub async fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            ScreenflowError::artifact(format!("failed to create {}: {}", self.root.display(), e))
        })
    }

    /// Delete every `.pdf` file, returning how many were removed
    pub async fn clear_pdfs(&self) -> Result<usize> {
        let pdfs = self.pdf_files().await?;
        for pdf in &pdfs {
            fs::remove_file(pdf).await?;
        }
        if !pdfs.is_empty() {
            tracing::debug!("removed {} stale pdf(s) from {}", pdfs.len(), self.root.display());
        }
        Ok(pdfs.len())
    }

    /// Count `.pdf` files
    pub async fn count_pdfs(&self) -> Result<usize> {
        Ok(self.pdf_files().await?.len())
    }

    /// Write `value` as 2-space indented JSON and return the file path
    pub async fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        self.ensure().await?;
        let path = self.path(name);
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content).await.map_err(|e| {
            ScreenflowError::artifact(format!("failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Check whether a file exists
    pub async fn exists(&self, name: &str) -> bool {
        fs::try_exists(self.path(name)).await.unwrap_or(false)
    }

    async fn pdf_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut pdfs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_pdf(&path) {
                pdfs.push(path);
            }
        }
        Ok(pdfs)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension().map(|ext| ext == "pdf").unwrap_or(false)
}
