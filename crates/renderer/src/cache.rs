use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use paddle::TextureId;

use crate::texture::{decode_png, DecodedImage};

/// A texture resident on the backend together with its pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTexture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Somewhere decoded images can be uploaded to.
pub trait TextureBackend {
    fn upload(&mut self, label: &str, image: &DecodedImage) -> Result<TextureId>;
}

/// Resolves texture files to backend handles.
pub trait TextureSource {
    fn texture(&mut self, path: &Path) -> Option<LoadedTexture>;
}

#[derive(Debug, Clone, Copy)]
enum CacheEntry {
    Loaded(LoadedTexture),
    Failed,
}

/// Decodes and uploads each texture file at most once.
///
/// Failures are remembered as well, so a broken asset produces one warning
/// instead of one per frame.
pub struct TextureCache<B> {
    backend: B,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl<B: TextureBackend> TextureCache<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            entries: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn get_or_load(&mut self, path: &Path) -> Option<LoadedTexture> {
        if let Some(entry) = self.entries.get(path) {
            return match entry {
                CacheEntry::Loaded(texture) => Some(*texture),
                CacheEntry::Failed => None,
            };
        }

        let entry = match self.load(path) {
            Ok(texture) => {
                tracing::debug!(
                    path = %path.display(),
                    id = texture.id.0,
                    width = texture.width,
                    height = texture.height,
                    "texture resident"
                );
                CacheEntry::Loaded(texture)
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{error:#}"),
                    "failed to load texture; decoration disabled"
                );
                CacheEntry::Failed
            }
        };
        self.entries.insert(path.to_path_buf(), entry);
        match entry {
            CacheEntry::Loaded(texture) => Some(texture),
            CacheEntry::Failed => None,
        }
    }

    /// Number of paths seen so far, including failed ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn load(&mut self, path: &Path) -> Result<LoadedTexture> {
        let image = decode_png(path)?;
        let label = path.display().to_string();
        let id = self.backend.upload(&label, &image)?;
        Ok(LoadedTexture {
            id,
            width: image.width(),
            height: image.height(),
        })
    }
}

impl<B: TextureBackend> TextureSource for TextureCache<B> {
    fn texture(&mut self, path: &Path) -> Option<LoadedTexture> {
        self.get_or_load(path)
    }
}
