//! Baked bitmap fonts.
//!
//! Loading a font rasterizes the printable ASCII range once, at one pixel
//! size, into a single coverage atlas. Drawing text is then just a run of
//! textured quads that sample that atlas.

use std::path::Path;

use crate::coords::Rect;
use crate::render::{RenderBackend, TextureFilter, TextureKey, UvRect};

use super::slots::{FontHandle, SlotTable};
use super::texture::read_file;
use super::ResourceError;

/// Maximum number of simultaneously loaded fonts.
pub const MAX_FONTS: usize = 16;

/// Width and height of each font atlas, in pixels.
pub const FONT_ATLAS_SIZE: u32 = 512;

/// First baked character (space).
pub const FIRST_CHAR: u32 = 32;

/// Number of baked characters: `FIRST_CHAR..FIRST_CHAR + GLYPH_COUNT`.
pub const GLYPH_COUNT: usize = 96;

/// Checked in order by [`FontPool::load_default`].
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Where one glyph lives in the atlas and how it sits on the baseline.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BakedGlyph {
    /// Atlas rectangle `[x0, x1) × [y0, y1)`.
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    /// Offset from the pen position to the bitmap's top-left corner.
    pub xoff: f32,
    pub yoff: f32,
    pub xadvance: f32,
}

impl BakedGlyph {
    #[inline]
    fn is_blank(&self) -> bool {
        self.x1 == self.x0 || self.y1 == self.y0
    }
}

/// Glyph metrics of one baked font. The atlas pixels live on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedFont {
    pub(crate) size: f32,
    pub(crate) atlas_size: u32,
    pub(crate) glyphs: Vec<BakedGlyph>,
}

impl BakedFont {
    /// Rasterizes the ASCII range of a TrueType/OpenType font.
    ///
    /// `size` is the pixel distance from the highest ascender to the lowest
    /// descender. Returns the metrics and the `FONT_ATLAS_SIZE²` coverage
    /// bitmap.
    pub fn bake(font_bytes: &[u8], size: f32) -> Result<(Self, Vec<u8>), ResourceError> {
        if !(size > 0.0 && size.is_finite()) {
            return Err(ResourceError::InvalidFontSize(size));
        }
        let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
            .map_err(|e| ResourceError::FontParse(e.to_string()))?;

        let px = match font.horizontal_line_metrics(size) {
            Some(m) if m.ascent - m.descent > 0.0 => size * size / (m.ascent - m.descent),
            _ => size,
        };

        let chars: Vec<char> = (FIRST_CHAR..FIRST_CHAR + GLYPH_COUNT as u32)
            .map(|c| char::from_u32(c).unwrap_or(' '))
            .collect();

        // Pack from metrics alone so oversized fonts fail before rasterizing.
        let sizes: Vec<(u32, u32)> = chars
            .iter()
            .map(|&ch| {
                let m = font.metrics(ch, px);
                (m.width as u32, m.height as u32)
            })
            .collect();
        let origins = pack_shelves(&sizes, FONT_ATLAS_SIZE).ok_or(ResourceError::AtlasFull { size })?;

        let stride = FONT_ATLAS_SIZE as usize;
        let mut atlas = vec![0u8; stride * stride];
        let mut glyphs = Vec::with_capacity(GLYPH_COUNT);

        for (&ch, &(x, y)) in chars.iter().zip(&origins) {
            let (metrics, bitmap) = font.rasterize(ch, px);
            let (w, h) = (metrics.width, metrics.height);
            for row in 0..h {
                let dst = (y as usize + row) * stride + x as usize;
                atlas[dst..dst + w].copy_from_slice(&bitmap[row * w..(row + 1) * w]);
            }

            glyphs.push(BakedGlyph {
                x0: x,
                y0: y,
                x1: x + w as u32,
                y1: y + h as u32,
                xoff: metrics.xmin as f32,
                // fontdue measures ymin upward from the baseline to the bitmap's bottom.
                yoff: -(metrics.ymin as f32 + h as f32),
                xadvance: metrics.advance_width,
            });
        }

        let baked = Self {
            size,
            atlas_size: FONT_ATLAS_SIZE,
            glyphs,
        };
        Ok((baked, atlas))
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Baked glyph for `ch`, or `None` outside the baked range.
    pub fn glyph(&self, ch: char) -> Option<&BakedGlyph> {
        let index = (ch as u32).checked_sub(FIRST_CHAR)?;
        self.glyphs.get(index as usize)
    }

    /// Pen advance for `ch`; unbaked characters advance by half the font size.
    pub fn advance(&self, ch: char) -> f32 {
        self.glyph(ch).map_or(self.size * 0.5, |g| g.xadvance)
    }

    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.advance(c)).sum()
    }

    /// Lays out `text` with the pen starting at `(x, baseline)`.
    ///
    /// Yields one screen rectangle and atlas UV rectangle per visible glyph.
    /// Blank and unbaked characters only move the pen.
    pub fn layout<'a>(
        &'a self,
        text: &'a str,
        x: f32,
        baseline: f32,
    ) -> impl Iterator<Item = (Rect, UvRect)> + 'a {
        let inv = 1.0 / self.atlas_size as f32;
        let mut pen = x;

        text.chars().filter_map(move |ch| {
            let origin = pen;
            pen += self.advance(ch);

            let g = self.glyph(ch).filter(|g| !g.is_blank())?;
            let dst = Rect::new(
                origin + g.xoff,
                baseline + g.yoff,
                (g.x1 - g.x0) as f32,
                (g.y1 - g.y0) as f32,
            );
            let uv = UvRect::new(
                g.x0 as f32 * inv,
                g.y0 as f32 * inv,
                g.x1 as f32 * inv,
                g.y1 as f32 * inv,
            );
            Some((dst, uv))
        })
    }
}

/// Places rectangles left to right on shelves with a 1-px gap, starting a new
/// shelf below the tallest rectangle of the current one when a row is full.
///
/// Returns the top-left corner of each rectangle, or `None` when they do not
/// all fit into `atlas × atlas`.
pub fn pack_shelves(sizes: &[(u32, u32)], atlas: u32) -> Option<Vec<(u32, u32)>> {
    let (mut x, mut y, mut bottom) = (1u32, 1u32, 1u32);
    let mut out = Vec::with_capacity(sizes.len());

    for &(w, h) in sizes {
        if x + w + 1 >= atlas {
            y = bottom;
            x = 1;
        }
        if y + h + 1 >= atlas || x + w + 1 >= atlas {
            return None;
        }
        out.push((x, y));
        x += w + 1;
        bottom = bottom.max(y + h + 1);
    }
    Some(out)
}

/// Expands a coverage bitmap to white RGBA with coverage as alpha.
pub(crate) fn coverage_to_rgba(coverage: &[u8]) -> Vec<u8> {
    coverage.iter().flat_map(|&a| [255, 255, 255, a]).collect()
}

/// Checks `candidates` in order and returns the first that is an existing file.
pub fn find_default_font<'a>(candidates: &[&'a str]) -> Option<&'a Path> {
    candidates.iter().copied().map(Path::new).find(|p| p.is_file())
}

#[derive(Debug)]
struct FontEntry {
    font: BakedFont,
    texture: TextureKey,
}

/// Baked fonts and their atlas textures.
#[derive(Debug)]
pub struct FontPool {
    slots: SlotTable<FontEntry>,
}

impl FontPool {
    pub fn new() -> Self {
        Self::with_capacity(MAX_FONTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotTable::new("font", capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load_path<B>(
        &mut self,
        backend: &mut B,
        path: &Path,
        size: f32,
    ) -> Result<FontHandle, ResourceError>
    where
        B: RenderBackend + ?Sized,
    {
        self.slots.free_slot()?;
        let bytes = read_file(path)?;
        let handle = self.load_bytes(backend, &bytes, size)?;
        log::info!("font {} loaded from {} at {size}px", handle.raw(), path.display());
        Ok(handle)
    }

    pub fn load_bytes<B>(
        &mut self,
        backend: &mut B,
        bytes: &[u8],
        size: f32,
    ) -> Result<FontHandle, ResourceError>
    where
        B: RenderBackend + ?Sized,
    {
        let slot = self.slots.free_slot()?;
        let (font, coverage) = BakedFont::bake(bytes, size)?;
        let texture = backend.create_texture(
            &coverage_to_rgba(&coverage),
            font.atlas_size,
            font.atlas_size,
            TextureFilter::Linear,
        )?;
        Ok(self.slots.fill(slot, FontEntry { font, texture }))
    }

    /// Loads the first existing file of [`DEFAULT_FONT_CANDIDATES`].
    pub fn load_default<B>(&mut self, backend: &mut B, size: f32) -> Result<FontHandle, ResourceError>
    where
        B: RenderBackend + ?Sized,
    {
        let path = find_default_font(DEFAULT_FONT_CANDIDATES).ok_or(ResourceError::NoDefaultFont)?;
        self.load_path(backend, path, size)
    }

    /// Releases `handle`. Returns `false` for invalid or already-freed handles.
    pub fn free<B>(&mut self, backend: &mut B, handle: FontHandle) -> bool
    where
        B: RenderBackend + ?Sized,
    {
        match self.slots.remove(handle) {
            Some(entry) => {
                backend.destroy_texture(entry.texture);
                true
            }
            None => false,
        }
    }

    /// Metrics and atlas texture of a live font.
    pub fn get(&self, handle: FontHandle) -> Option<(&BakedFont, TextureKey)> {
        self.slots.get(handle).map(|e| (&e.font, e.texture))
    }

    /// Frees every live font and returns how many there were.
    pub fn clear<B>(&mut self, backend: &mut B) -> usize
    where
        B: RenderBackend + ?Sized,
    {
        let mut n = 0;
        for entry in self.slots.drain() {
            backend.destroy_texture(entry.texture);
            n += 1;
        }
        n
    }

    #[cfg(test)]
    pub(crate) fn insert_baked<B>(&mut self, backend: &mut B, font: BakedFont) -> FontHandle
    where
        B: RenderBackend + ?Sized,
    {
        let n = (font.atlas_size * font.atlas_size) as usize;
        let texture = backend
            .create_texture(&coverage_to_rgba(&vec![0; n]), font.atlas_size, font.atlas_size, TextureFilter::Linear)
            .unwrap();
        self.slots.insert(FontEntry { font, texture }).unwrap()
    }
}

impl Default for FontPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand-built font for tests: every glyph is 4×6 at atlas `(8 * i, 0)`, sits
/// 5 px above the baseline, and advances 5 px; space is blank.
#[cfg(test)]
pub(crate) fn test_font(size: f32) -> BakedFont {
    let glyphs = (0..GLYPH_COUNT as u32)
        .map(|i| {
            if i == 0 {
                BakedGlyph { xadvance: 3.0, ..Default::default() }
            } else {
                BakedGlyph {
                    x0: 8 * i,
                    y0: 0,
                    x1: 8 * i + 4,
                    y1: 6,
                    xoff: 1.0,
                    yoff: -5.0,
                    xadvance: 5.0,
                }
            }
        })
        .collect();
    BakedFont {
        size,
        atlas_size: 16,
        glyphs,
    }
}
