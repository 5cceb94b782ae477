//! Lazily populated texture cache
//!
//! Textures are loaded on first request through a [`TextureLoader`] and kept
//! for the lifetime of the cache. Entries are never evicted, so a
//! [`TextureHandle`] stays valid as long as its cache lives.
//!
//! # Example
//!
//! ```ignore
//! let mut cache = TextureCache::new(FileTextureLoader::new("assets"));
//! let handle = cache.get_or_load(&TextureKey::new("blocks.png"))?;
//! let texture = cache.get(handle).unwrap();
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use slotmap::SlotMap;

use crate::asset_error::AssetError;
use crate::texture::{SharedTexture, Texture, TextureHandle, TextureKey};

/// Source of texture pixels
pub trait TextureLoader {
    /// Load and decode the texture named `key`
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::MissingResource`] when no such resource exists.
    fn load(&self, key: &TextureKey) -> Result<Texture, AssetError>;
}

/// Loads image files relative to a root directory
#[derive(Clone, Debug)]
pub struct FileTextureLoader {
    root: PathBuf,
}

impl FileTextureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path for a texture name
    pub fn resolve(&self, key: &TextureKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

impl TextureLoader for FileTextureLoader {
    fn load(&self, key: &TextureKey) -> Result<Texture, AssetError> {
        let path = self.resolve(key);
        let bytes = std::fs::read(&path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                AssetError::MissingResource(path.display().to_string())
            } else {
                AssetError::Io(err)
            }
        })?;

        let image = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        Texture::from_rgba8(width, height, image.into_raw())
            .ok_or_else(|| AssetError::Decode(format!("{} has no pixels", path.display())))
    }
}

/// Texture cache keyed by resource name
pub struct TextureCache {
    textures: SlotMap<TextureHandle, SharedTexture>,
    by_key: HashMap<TextureKey, TextureHandle>,
    loader: Box<dyn TextureLoader>,
    default_handle: TextureHandle,
}

impl TextureCache {
    /// Create a cache holding only the built-in default texture
    pub fn new(loader: impl TextureLoader + 'static) -> Self {
        let mut textures = SlotMap::with_key();
        let default_handle = textures.insert(Arc::new(Texture::checkerboard()));
        Self {
            textures,
            by_key: HashMap::new(),
            loader: Box::new(loader),
            default_handle,
        }
    }

    /// Handle to the texture named `key`, loading it on first use
    ///
    /// Failed loads are not remembered, so a later call retries.
    pub fn get_or_load(&mut self, key: &TextureKey) -> Result<TextureHandle, AssetError> {
        if let Some(&handle) = self.by_key.get(key) {
            return Ok(handle);
        }

        let texture = self.loader.load(key)?;
        log::debug!("Loaded texture '{}' ({}x{})", key, texture.width, texture.height);
        let handle = self.textures.insert(Arc::new(texture));
        self.by_key.insert(key.clone(), handle);
        Ok(handle)
    }

    /// Like [`get_or_load`](Self::get_or_load), but a missing resource
    /// resolves to the default texture
    ///
    /// Returns the handle and whether the fallback was used. Other errors
    /// are still reported.
    pub fn resolve_or_default(&mut self, key: &TextureKey) -> Result<(TextureHandle, bool), AssetError> {
        match self.get_or_load(key) {
            Ok(handle) => Ok((handle, false)),
            Err(err) if err.is_missing() => {
                log::warn!("Texture '{}' not found, using default texture", key);
                Ok((self.default_handle, true))
            }
            Err(err) => Err(err),
        }
    }

    /// Handle of an already loaded texture
    pub fn handle(&self, key: &TextureKey) -> Option<TextureHandle> {
        self.by_key.get(key).copied()
    }

    /// Texture data for a handle
    pub fn get(&self, handle: TextureHandle) -> Option<SharedTexture> {
        self.textures.get(handle).cloned()
    }

    /// The built-in texture, always present
    pub fn default_handle(&self) -> TextureHandle {
        self.default_handle
    }

    /// Number of cached textures, including the default
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn contains_key(&self, key: &TextureKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Iterate over all cached textures
    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &SharedTexture)> + '_ {
        self.textures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Serves a 2x2 texture for "ok.png", counts calls
    struct CountingLoader {
        calls: Rc<Cell<usize>>,
    }

    impl TextureLoader for CountingLoader {
        fn load(&self, key: &TextureKey) -> Result<Texture, AssetError> {
            self.calls.set(self.calls.get() + 1);
            match key.as_str() {
                "ok.png" => Ok(Texture::solid(2, 2, [255, 255, 255, 255])),
                "broken.png" => Err(AssetError::Decode("truncated".to_string())),
                other => Err(AssetError::MissingResource(other.to_string())),
            }
        }
    }

    fn cache() -> (TextureCache, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let cache = TextureCache::new(CountingLoader { calls: calls.clone() });
        (cache, calls)
    }

    #[test]
    fn test_new_cache_has_default() {
        let (cache, _) = cache();
        assert_eq!(cache.len(), 1);
        let default = cache.get(cache.default_handle()).unwrap();
        assert_eq!(default.width, 8);
    }

    #[test]
    fn test_load_once() {
        let (mut cache, calls) = cache();
        let key = TextureKey::new("ok.png");
        let h1 = cache.get_or_load(&key).unwrap();
        let h2 = cache.get_or_load(&key).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.handle(&key), Some(h1));
    }

    #[test]
    fn test_missing_is_not_cached() {
        let (mut cache, calls) = cache();
        let key = TextureKey::new("nope.png");
        assert!(matches!(cache.get_or_load(&key), Err(AssetError::MissingResource(_))));
        assert!(cache.get_or_load(&key).is_err());
        assert_eq!(calls.get(), 2);
        assert!(!cache.contains_key(&key));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_resolve_or_default() {
        let (mut cache, _) = cache();
        let (handle, fallback) = cache.resolve_or_default(&TextureKey::new("nope.png")).unwrap();
        assert!(fallback);
        assert_eq!(handle, cache.default_handle());

        let (handle, fallback) = cache.resolve_or_default(&TextureKey::new("ok.png")).unwrap();
        assert!(!fallback);
        assert_ne!(handle, cache.default_handle());

        // Decode errors are not papered over
        assert!(matches!(
            cache.resolve_or_default(&TextureKey::new("broken.png")),
            Err(AssetError::Decode(_))
        ));
    }

    #[test]
    fn test_file_loader_missing_file() {
        let loader = FileTextureLoader::new("/definitely/not/a/real/dir");
        let err = loader.load(&TextureKey::new("blocks.png")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_file_loader_decodes_png() {
        let dir = std::env::temp_dir().join(format!("tiltbox_tex_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(dir.join("tiny.png")).unwrap();

        let loader = FileTextureLoader::new(&dir);
        let texture = loader.load(&TextureKey::new("tiny.png")).unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(&texture.pixels[0..4], &[10, 20, 30, 255]);

        std::fs::write(dir.join("garbage.png"), b"not a png").unwrap();
        assert!(matches!(
            loader.load(&TextureKey::new("garbage.png")),
            Err(AssetError::Decode(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
