//! Binary PPM (`P6`) reading and writing.
//!
//! Only 8-bit channels are supported. Loaded pixels are expanded from 3 to 4
//! bytes with the fourth byte set to 255, matching the 4-byte images the
//! replay engine renders into.

use std::path::Path;

use tracing::debug;

use crate::resources::Image;

pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

#[derive(Debug, thiserror::Error)]
pub enum PixmapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a binary PPM (expected P6 magic line)")]
    BadMagic,

    #[error("malformed header: {0}")]
    BadHeader(String),

    #[error("dimensions {width}x{height} outside 1..={max}")]
    DimensionsOutOfRange { width: u32, height: u32, max: u32 },

    #[error("unsupported max channel value line: {0:?}")]
    UnsupportedMaxValue(String),

    #[error("truncated pixel data: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("cannot write {0}-byte pixels as PPM")]
    UnsupportedPixelSize(u32),
}

/// A decoded pixel map with 4-byte pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Pixmap {
    pub fn into_image(self) -> Image {
        Image {
            width: self.width,
            height: self.height,
            bytes_per_pixel: 4,
            pixels: self.rgba,
        }
    }
}

/// Load a PPM file from disk.
pub fn load_pixmap(path: impl AsRef<Path>, max_dimension: u32) -> Result<Pixmap, PixmapError> {
    let bytes = std::fs::read(path.as_ref())?;
    let pixmap = parse_pixmap(&bytes, max_dimension)?;
    debug!(
        "loaded pixmap {} ({}x{})",
        path.as_ref().display(),
        pixmap.width,
        pixmap.height
    );
    Ok(pixmap)
}

/// Parse PPM bytes: magic line, optional `#` comment lines, `width height`,
/// a max-value line starting with `255`, then `width * height * 3` bytes.
pub fn parse_pixmap(bytes: &[u8], max_dimension: u32) -> Result<Pixmap, PixmapError> {
    let mut lines = HeaderLines { bytes, pos: 0 };

    let magic = lines.next_line().ok_or(PixmapError::BadMagic)?;
    if magic != b"P6" {
        return Err(PixmapError::BadMagic);
    }

    let dims = loop {
        let line = lines
            .next_line()
            .ok_or_else(|| PixmapError::BadHeader("missing dimensions".to_string()))?;
        if !line.starts_with(b"#") {
            break line;
        }
    };
    let (width, height) = parse_dimensions(dims)?;
    if width < 1 || width > max_dimension || height < 1 || height > max_dimension {
        return Err(PixmapError::DimensionsOutOfRange {
            width,
            height,
            max: max_dimension,
        });
    }

    let max_value = lines
        .next_line()
        .ok_or_else(|| PixmapError::BadHeader("missing max value".to_string()))?;
    if !max_value.starts_with(b"255") {
        return Err(PixmapError::UnsupportedMaxValue(
            String::from_utf8_lossy(max_value).into_owned(),
        ));
    }

    let pixel_count = width as usize * height as usize;
    let data = &bytes[lines.pos..];
    let expected = pixel_count * 3;
    if data.len() < expected {
        return Err(PixmapError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for rgb in data[..expected].chunks_exact(3) {
        rgba.extend_from_slice(rgb);
        rgba.push(0xFF);
    }

    Ok(Pixmap {
        width,
        height,
        rgba,
    })
}

fn parse_dimensions(line: &[u8]) -> Result<(u32, u32), PixmapError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| PixmapError::BadHeader("dimensions are not text".to_string()))?;
    let mut parts = text.split_ascii_whitespace().map(str::parse::<u32>);
    match (parts.next(), parts.next()) {
        (Some(Ok(w)), Some(Ok(h))) => Ok((w, h)),
        _ => Err(PixmapError::BadHeader(format!("bad dimensions line {:?}", text))),
    }
}

/// Encode the first three channels of every pixel as a binary PPM.
pub fn encode_ppm(image: &Image) -> Result<Vec<u8>, PixmapError> {
    let bpp = image.bytes_per_pixel as usize;
    if bpp < 3 {
        return Err(PixmapError::UnsupportedPixelSize(image.bytes_per_pixel));
    }

    let mut out = format!("P6\n{} {}\n255\n", image.width, image.height).into_bytes();
    out.reserve(image.width as usize * image.height as usize * 3);
    for px in image.pixels.chunks_exact(bpp) {
        out.extend_from_slice(&px[..3]);
    }
    Ok(out)
}

pub fn save_ppm(path: impl AsRef<Path>, image: &Image) -> Result<(), PixmapError> {
    std::fs::write(path, encode_ppm(image)?)?;
    Ok(())
}

/// Newline-delimited header reader. Returned lines exclude the `\n`.
struct HeaderLines<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderLines<'a> {
    fn next_line(&mut self) -> Option<&'a [u8]> {
        let rest = &self.bytes[self.pos..];
        let len = rest.iter().position(|b| *b == b'\n')?;
        self.pos += len + 1;
        Some(&rest[..len])
    }
}
