use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0} has zero area")]
    Empty(PathBuf),
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Colour textures are sampled as sRGB, data textures (normal maps) are not.
    pub srgb: bool,
}

impl TextureData {
    pub fn load(path: &Path, srgb: bool) -> Result<Self, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.to_path_buf()));
        }
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
            srgb,
        })
    }

    pub fn solid(rgba: [u8; 4], srgb: bool) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
            srgb,
        }
    }

    /// Normal map pointing straight out of the surface.
    pub fn flat_normal() -> Self {
        Self::solid([128, 128, 255, 255], false)
    }

    /// Two-tone checkerboard of `cells` x `cells` squares.
    pub fn checker(size: u32, cells: u32) -> Self {
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let light = ((x / cell) + (y / cell)) % 2 == 0;
                let value = if light { 200 } else { 60 };
                pixels.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
            srgb: true,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates_cells() {
        let texture = TextureData::checker(8, 4);
        assert_eq!(texture.pixels.len(), 8 * 8 * 4);
        assert_eq!(texture.pixel(0, 0), [200, 200, 200, 255]);
        assert_eq!(texture.pixel(2, 0), [60, 60, 60, 255]);
        assert_eq!(texture.pixel(2, 2), [200, 200, 200, 255]);
    }

    #[test]
    fn flat_normal_is_linear() {
        let normal = TextureData::flat_normal();
        assert!(!normal.srgb);
        assert_eq!(normal.pixel(0, 0), [128, 128, 255, 255]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TextureData::load(Path::new("does/not/exist.png"), true).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
