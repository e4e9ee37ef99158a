use std::path::Path;

use crate::render::{RenderBackend, TextureFilter, TextureKey};

use super::slots::{SlotTable, TextureHandle};
use super::ResourceError;

/// Maximum number of simultaneously loaded textures.
pub const MAX_TEXTURES: usize = 1024;

/// A loaded texture as seen by draw calls.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureInfo {
    pub key: TextureKey,
    pub width: u32,
    pub height: u32,
}

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone)]
pub(crate) struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decodes any supported image format (PNG, JPEG, BMP, GIF, TGA) to RGBA8.
pub(crate) fn decode_image(bytes: &[u8]) -> Result<DecodedImage, ResourceError> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| ResourceError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, ResourceError> {
    std::fs::read(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Sprite textures, sampled with nearest filtering.
#[derive(Debug)]
pub struct TexturePool {
    slots: SlotTable<TextureInfo>,
}

impl TexturePool {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TEXTURES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotTable::new("texture", capacity),
        }
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load_path<B>(&mut self, backend: &mut B, path: &Path) -> Result<TextureHandle, ResourceError>
    where
        B: RenderBackend + ?Sized,
    {
        self.slots.free_slot()?;
        let bytes = read_file(path)?;
        self.load_bytes(backend, &bytes)
    }

    pub fn load_bytes<B>(&mut self, backend: &mut B, bytes: &[u8]) -> Result<TextureHandle, ResourceError>
    where
        B: RenderBackend + ?Sized,
    {
        self.slots.free_slot()?;
        let img = decode_image(bytes)?;
        self.load_rgba(backend, &img.pixels, img.width, img.height)
    }

    /// Uploads already-decoded RGBA8 pixels (`width * height * 4` bytes).
    pub fn load_rgba<B>(
        &mut self,
        backend: &mut B,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError>
    where
        B: RenderBackend + ?Sized,
    {
        let slot = self.slots.free_slot()?;

        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ResourceError::InvalidPixels {
                width,
                height,
                len: pixels.len(),
            });
        }

        let key = backend.create_texture(pixels, width, height, TextureFilter::Nearest)?;
        let handle: TextureHandle = self.slots.fill(slot, TextureInfo { key, width, height });
        log::debug!("texture {} loaded ({width}x{height})", handle.raw());
        Ok(handle)
    }

    /// Releases `handle`. Returns `false` for invalid or already-freed handles.
    pub fn free<B>(&mut self, backend: &mut B, handle: TextureHandle) -> bool
    where
        B: RenderBackend + ?Sized,
    {
        match self.slots.remove(handle) {
            Some(info) => {
                backend.destroy_texture(info.key);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: TextureHandle) -> Option<TextureInfo> {
        self.slots.get(handle).copied()
    }

    /// Width in pixels, or 0 for an invalid handle.
    pub fn width(&self, handle: TextureHandle) -> u32 {
        self.get(handle).map_or(0, |t| t.width)
    }

    /// Height in pixels, or 0 for an invalid handle.
    pub fn height(&self, handle: TextureHandle) -> u32 {
        self.get(handle).map_or(0, |t| t.height)
    }

    /// Frees every live texture and returns how many there were.
    pub fn clear<B>(&mut self, backend: &mut B) -> usize
    where
        B: RenderBackend + ?Sized,
    {
        let mut n = 0;
        for info in self.slots.drain() {
            backend.destroy_texture(info.key);
            n += 1;
        }
        n
    }
}

impl Default for TexturePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{Call, RecordingBackend};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_bytes_load_with_dimensions() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();

        let h = pool.load_bytes(&mut backend, &png(3, 5)).unwrap();
        assert_eq!(h.raw(), 1);
        assert_eq!((pool.width(h), pool.height(h)), (3, 5));
        assert!(matches!(
            backend.calls[0],
            Call::CreateTexture { width: 3, height: 5, filter: TextureFilter::Nearest, .. }
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();
        let err = pool.load_bytes(&mut backend, b"not an image").unwrap_err();
        assert!(matches!(err, ResourceError::Decode(_)));
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();
        let err = pool
            .load_path(&mut backend, Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
    }

    #[test]
    fn freed_handle_is_reissued() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();
        let px = [0u8; 4];

        let a = pool.load_rgba(&mut backend, &px, 1, 1).unwrap();
        let b = pool.load_rgba(&mut backend, &px, 1, 1).unwrap();
        assert!(pool.free(&mut backend, a));
        let c = pool.load_rgba(&mut backend, &[0u8; 3 * 7 * 4], 3, 7).unwrap();

        assert_eq!(c, a);
        assert_ne!(c, b);
        assert_eq!((pool.width(a), pool.height(a)), (3, 7));
        assert_eq!((pool.width(b), pool.height(b)), (1, 1));
        assert_eq!(backend.live_textures(), 2);
    }

    #[test]
    fn invalid_handles_are_harmless() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();

        assert!(!pool.free(&mut backend, TextureHandle::INVALID));
        assert!(!pool.free(&mut backend, TextureHandle(77)));
        assert_eq!(pool.width(TextureHandle::INVALID), 0);
        assert_eq!(pool.height(TextureHandle(3)), 0);
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn exhausted_pool_rejects_loads() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::with_capacity(2);
        let px = [0u8; 4];

        pool.load_rgba(&mut backend, &px, 1, 1).unwrap();
        pool.load_rgba(&mut backend, &px, 1, 1).unwrap();
        let err = pool.load_rgba(&mut backend, &px, 1, 1).unwrap_err();

        assert!(matches!(err, ResourceError::PoolFull { capacity: 2, .. }));
        assert_eq!(backend.live_textures(), 2);
    }

    #[test]
    fn pixel_length_mismatch_is_rejected() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();
        let err = pool.load_rgba(&mut backend, &[0u8; 7], 1, 2).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidPixels { width: 1, height: 2, len: 7 }));
    }

    #[test]
    fn upload_failure_leaves_slot_free() {
        let mut backend = RecordingBackend {
            fail_uploads: true,
            ..Default::default()
        };
        let mut pool = TexturePool::new();

        let err = pool.load_rgba(&mut backend, &[0u8; 4], 1, 1).unwrap_err();
        assert!(matches!(err, ResourceError::Upload(_)));
        assert!(pool.is_empty());
    }

    #[test]
    fn clear_destroys_everything() {
        let mut backend = RecordingBackend::default();
        let mut pool = TexturePool::new();
        for _ in 0..3 {
            pool.load_rgba(&mut backend, &[0u8; 4], 1, 1).unwrap();
        }
        assert_eq!(pool.clear(&mut backend), 3);
        assert_eq!(backend.live_textures(), 0);
        assert!(pool.is_empty());
    }
}
