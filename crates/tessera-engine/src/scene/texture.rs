use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ConfigError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Immutable RGBA8 image. Backends key their GPU copies by [`TextureId`].
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ConfigError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(ConfigError::TextureSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            id: TextureId::next(),
            width,
            height,
            rgba,
        })
    }

    /// 1x1 texture of a single color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            id: TextureId::next(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_checked() {
        assert!(Texture::from_rgba8(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Texture::from_rgba8(2, 2, vec![0; 15]),
            Err(ConfigError::TextureSize { expected: 16, actual: 15, .. })
        ));
        assert!(Texture::from_rgba8(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Texture::solid([0; 4]).id(), Texture::solid([0; 4]).id());
    }
}
