//! Filesystem-backed resource reader

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use glyphbridge_core::ResourceReader;
use glyphbridge_domain::{GlyphBridgeError, Result};
use tracing::debug;

use crate::errors::InfraError;

/// Reads bundled panel resources relative to a root directory
#[derive(Debug, Clone)]
pub struct FsResourceReader {
    root: PathBuf,
}

impl FsResourceReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` under the root, refusing anything that escapes it
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let candidate = Path::new(relative);
        let escapes = candidate.components().any(|component| {
            matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if relative.trim().is_empty() || escapes {
            return Err(GlyphBridgeError::InvalidInput(format!(
                "resource path must be relative to the panel root: {relative}"
            )));
        }
        Ok(self.root.join(candidate))
    }
}

#[async_trait]
impl ResourceReader for FsResourceReader {
    async fn read_text(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path)?;
        debug!(path = %full_path.display(), "Reading panel resource");
        tokio::fs::read_to_string(&full_path).await.map_err(|e| InfraError::from(e).into())
    }
}
