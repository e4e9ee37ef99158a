use std::fmt;
use std::path::PathBuf;

/// Why a texture or font could not be loaded.
#[derive(Debug)]
pub enum ResourceError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The bytes are not a supported image.
    Decode(String),
    /// Raw pixel data does not match the stated dimensions.
    InvalidPixels { width: u32, height: u32, len: usize },
    /// The bytes are not a usable TrueType/OpenType font.
    FontParse(String),
    /// The glyph set does not fit into the font atlas at this size.
    AtlasFull { size: f32 },
    /// Font size is not a positive finite number.
    InvalidFontSize(f32),
    /// None of the default font locations exist.
    NoDefaultFont,
    /// Every slot of the pool is in use.
    PoolFull { kind: &'static str, capacity: usize },
    /// The GPU rejected the upload.
    Upload(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Decode(msg) => write!(f, "image decode error: {msg}"),
            Self::InvalidPixels { width, height, len } => write!(
                f,
                "{len} bytes do not form a {width}x{height} RGBA image"
            ),
            Self::FontParse(msg) => write!(f, "font load error: {msg}"),
            Self::AtlasFull { size } => {
                write!(f, "glyphs at size {size} do not fit the font atlas; use a smaller size")
            }
            Self::InvalidFontSize(size) => write!(f, "invalid font size {size}"),
            Self::NoDefaultFont => write!(f, "no default font found"),
            Self::PoolFull { kind, capacity } => {
                write!(f, "{kind} pool is full ({capacity} slots in use)")
            }
            Self::Upload(msg) => write!(f, "texture upload failed: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
