//! Texture data and handles

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a texture stored in a [`TextureCache`](crate::TextureCache)
    pub struct TextureHandle;
}

/// Name of a texture resource, e.g. `"blocks.png"`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureKey(String);

impl TextureKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TextureKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TextureKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Decoded RGBA8 pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Row-major, 4 bytes per pixel
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Wrap raw RGBA8 data, `None` when the length does not match
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (pixels.len() == expected && width > 0 && height > 0).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-colour texture
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }

    /// Magenta and black checkerboard, 8x8
    pub fn checkerboard() -> Self {
        let size = 8u32;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let px: [u8; 4] = if (x / 4 + y / 4) % 2 == 0 {
                    [255, 0, 255, 255]
                } else {
                    [0, 0, 0, 255]
                };
                pixels.extend_from_slice(&px);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }
}

/// Shared, immutable texture data
pub type SharedTexture = Arc<Texture>;

/// Normalised UV rectangle of a texture
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureRegion {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl Default for TextureRegion {
    fn default() -> Self {
        Self::FULL
    }
}

impl TextureRegion {
    /// The whole texture
    pub const FULL: Self = Self {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// Cell `(column, row)` of an atlas split into `columns x rows`
    ///
    /// Row 0 is the top of the image. Out-of-range cells wrap around.
    pub fn grid_cell(columns: u32, rows: u32, column: u32, row: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let column = column % columns;
        let row = row % rows;
        let w = 1.0 / columns as f32;
        let h = 1.0 / rows as f32;
        Self {
            u0: column as f32 * w,
            v0: row as f32 * h,
            u1: (column + 1) as f32 * w,
            v1: (row + 1) as f32 * h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_key() {
        let key: TextureKey = "blocks.png".into();
        assert_eq!(key.as_str(), "blocks.png");
        assert_eq!(key.to_string(), "blocks.png");
        assert_eq!(key, TextureKey::new(String::from("blocks.png")));
    }

    #[test]
    fn test_from_rgba8_checks_length() {
        assert!(Texture::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(Texture::from_rgba8(2, 2, vec![0; 15]).is_none());
        assert!(Texture::from_rgba8(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn test_solid_and_checkerboard() {
        let t = Texture::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(t.pixels.len(), 24);
        assert_eq!(&t.pixels[20..24], &[1, 2, 3, 4]);

        let c = Texture::checkerboard();
        assert_eq!(c.pixels.len(), 8 * 8 * 4);
        assert_eq!(&c.pixels[0..4], &[255, 0, 255, 255]);
    }

    #[test]
    fn test_grid_cell() {
        let cell = TextureRegion::grid_cell(2, 2, 1, 0);
        assert_eq!(cell, TextureRegion { u0: 0.5, v0: 0.0, u1: 1.0, v1: 0.5 });
        // Wraps out-of-range indices
        assert_eq!(TextureRegion::grid_cell(2, 2, 3, 2), TextureRegion::grid_cell(2, 2, 1, 0));
        assert_eq!(TextureRegion::grid_cell(0, 0, 0, 0), TextureRegion::FULL);
    }
}
