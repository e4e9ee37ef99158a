//! Texture and font pools.
//!
//! Both pools are fixed-size slot tables. Callers hold small integer handles
//! (`slot + 1`, with `0` meaning invalid); the pools map them to backend
//! texture keys and, for fonts, baked glyph metrics.

mod error;
mod font;
mod slots;
mod texture;

pub use error::ResourceError;
pub use font::{
    find_default_font, pack_shelves, BakedFont, BakedGlyph, FontPool, DEFAULT_FONT_CANDIDATES,
    FIRST_CHAR, FONT_ATLAS_SIZE, GLYPH_COUNT, MAX_FONTS,
};
pub use slots::{FontHandle, TextureHandle};
pub use texture::{TextureInfo, TexturePool, MAX_TEXTURES};

#[cfg(test)]
pub(crate) use font::test_font;
