use std::fs;
use std::path::PathBuf;

use rust_embed::Embed;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::word::Catalog;
use crate::engine::chapters::ChapterId;

#[derive(Embed)]
#[folder = "assets/chapters/"]
struct ChapterAssets;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no word file for chapter {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed word file for chapter {chapter}: {source}")]
    Parse {
        chapter: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can hand out a chapter's catalog. The listening engine
/// loads lazily through this seam so tests can supply catalogs in memory.
pub trait CatalogSource {
    fn load(&self, chapter: ChapterId) -> Result<Catalog, CatalogError>;
}

/// Loads `words_<chapter>.json`, preferring a user directory over the
/// catalogs bundled into the binary.
pub struct CatalogLoader {
    user_dir: Option<PathBuf>,
}

impl CatalogLoader {
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        Self { user_dir }
    }

    fn file_name(chapter: ChapterId) -> String {
        format!("words_{}.json", chapter.to_key())
    }

    /// Load the chapter or degrade to the built-in fallback catalog.
    pub fn load_or_fallback(&self, chapter: ChapterId) -> Catalog {
        match self.load(chapter) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(chapter = chapter.to_key(), %err, "using fallback catalog");
                Catalog::fallback()
            }
        }
    }
}

impl CatalogSource for CatalogLoader {
    fn load(&self, chapter: ChapterId) -> Result<Catalog, CatalogError> {
        let name = Self::file_name(chapter);

        if let Some(dir) = &self.user_dir {
            let path = dir.join(&name);
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                let catalog = parse(chapter, &content)?;
                debug!(path = %path.display(), words = catalog.len(), "loaded user catalog");
                return Ok(catalog);
            }
        }

        let file = ChapterAssets::get(&name)
            .ok_or_else(|| CatalogError::NotFound(chapter.to_key().to_string()))?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        let catalog = parse(chapter, &content)?;
        debug!(chapter = chapter.to_key(), words = catalog.len(), "loaded bundled catalog");
        Ok(catalog)
    }
}

fn parse(chapter: ChapterId, content: &str) -> Result<Catalog, CatalogError> {
    serde_json::from_str(content).map_err(|source| CatalogError::Parse {
        chapter: chapter.to_key().to_string(),
        source,
    })
}
