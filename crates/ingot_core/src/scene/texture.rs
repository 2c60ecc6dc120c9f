//! Embedded textures.
//!
//! A scene can carry texture data directly, either still compressed in its
//! container format (PNG, JPEG, ...) or as decoded RGBA8 texels. Material
//! slots refer to embedded textures with `*N` paths.

use image::GenericImageView;
use thiserror::Error;

/// Errors that can occur while decoding an embedded texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Texel buffer has {actual} texels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Pixel payload of an embedded texture.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureData {
    /// Raw file contents in a container format
    Compressed(Vec<u8>),

    /// Decoded RGBA8 texels, row-major
    Rgba8(Vec<[u8; 4]>),
}

/// A texture stored inside the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Original file name or identifier (for debugging)
    pub filename: String,

    /// Width in pixels (for compressed data: decoded width)
    pub width: u32,

    /// Height in pixels (for compressed data: decoded height)
    pub height: u32,

    /// Lower-case format hint such as "png" or "jpg", empty for decoded data
    pub format_hint: String,

    pub data: TextureData,
}

impl Texture {
    /// Wrap compressed file contents, decoding once to validate and size them.
    pub fn from_compressed(filename: impl Into<String>, bytes: Vec<u8>) -> TextureResult<Self> {
        let format = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;
        let format_hint = format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            filename: filename.into(),
            width: decoded.width(),
            height: decoded.height(),
            format_hint,
            data: TextureData::Compressed(bytes),
        })
    }

    /// Create a texture from decoded texels.
    pub fn from_rgba8(
        filename: impl Into<String>,
        width: u32,
        height: u32,
        texels: Vec<[u8; 4]>,
    ) -> TextureResult<Self> {
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: texels.len(),
            });
        }

        Ok(Self {
            filename: filename.into(),
            width,
            height,
            format_hint: String::new(),
            data: TextureData::Rgba8(texels),
        })
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.data, TextureData::Compressed(_))
    }

    /// Decode into RGBA8 texels regardless of storage.
    pub fn to_rgba8(&self) -> TextureResult<Vec<[u8; 4]>> {
        match &self.data {
            TextureData::Rgba8(texels) => Ok(texels.clone()),
            TextureData::Compressed(bytes) => {
                let rgba = image::load_from_memory(bytes)?.to_rgba8();
                Ok(rgba.pixels().map(|p| p.0).collect())
            }
        }
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        match &self.data {
            TextureData::Compressed(bytes) => bytes.len(),
            TextureData::Rgba8(texels) => texels.len() * 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[test]
    fn test_compressed_texture_is_sized() {
        let tex = Texture::from_compressed("orange.png", png_bytes(4, 2)).unwrap();

        assert_eq!(tex.width, 4);
        assert_eq!(tex.height, 2);
        assert_eq!(tex.format_hint, "png");
        assert!(tex.is_compressed());

        let texels = tex.to_rgba8().unwrap();
        assert_eq!(texels.len(), 8);
        assert_eq!(texels[0], [255, 128, 0, 255]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Texture::from_compressed("bad.png", b"not an image".to_vec()).is_err());
    }

    #[test]
    fn test_rgba8_size_mismatch() {
        let err = Texture::from_rgba8("t", 2, 2, vec![[0; 4]; 3]).unwrap_err();
        assert!(matches!(err, TextureError::SizeMismatch { expected: 4, actual: 3 }));
    }
}
