//! Integration test: binary PPM loading and writing

use visor_core::pixmap::{self, PixmapError, DEFAULT_MAX_DIMENSION};
use visor_core::Image;

fn ppm(header: &str, pixels: &[u8]) -> Vec<u8> {
    let mut bytes = header.as_bytes().to_vec();
    bytes.extend_from_slice(pixels);
    bytes
}

#[test]
fn test_parse_expands_to_four_bytes() {
    let bytes = ppm("P6\n2 1\n255\n", &[10, 20, 30, 40, 50, 60]);
    let pm = pixmap::parse_pixmap(&bytes, DEFAULT_MAX_DIMENSION).expect("parse");

    assert_eq!((pm.width, pm.height), (2, 1));
    assert_eq!(pm.rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
}

#[test]
fn test_comment_lines_skipped() {
    let bytes = ppm(
        "P6\n# written by gimp\n# second comment\n1 1\n255\n",
        &[1, 2, 3],
    );
    let pm = pixmap::parse_pixmap(&bytes, DEFAULT_MAX_DIMENSION).expect("parse");
    assert_eq!(pm.rgba, vec![1, 2, 3, 255]);
}

#[test]
fn test_trailing_bytes_ignored() {
    let bytes = ppm("P6\n1 1\n255\n", &[1, 2, 3, 9, 9]);
    let pm = pixmap::parse_pixmap(&bytes, DEFAULT_MAX_DIMENSION).expect("parse");
    assert_eq!(pm.rgba.len(), 4);
}

#[test]
fn test_bad_magic() {
    for header in ["P3\n1 1\n255\n", "P6 1 1 255\n", ""] {
        match pixmap::parse_pixmap(&ppm(header, &[0, 0, 0]), DEFAULT_MAX_DIMENSION) {
            Err(PixmapError::BadMagic) => {}
            other => panic!("expected BadMagic for {:?}, got {:?}", header, other),
        }
    }
}

#[test]
fn test_dimensions_out_of_range() {
    for header in ["P6\n0 4\n255\n", "P6\n4 0\n255\n", "P6\n2049 1\n255\n"] {
        match pixmap::parse_pixmap(&ppm(header, &[]), DEFAULT_MAX_DIMENSION) {
            Err(PixmapError::DimensionsOutOfRange { max, .. }) => assert_eq!(max, 2048),
            other => panic!("expected DimensionsOutOfRange for {:?}, got {:?}", header, other),
        }
    }

    // The bound is configurable
    let bytes = ppm("P6\n9 9\n255\n", &[0; 243]);
    match pixmap::parse_pixmap(&bytes, 8) {
        Err(PixmapError::DimensionsOutOfRange { width, height, max }) => {
            assert_eq!((width, height, max), (9, 9, 8));
        }
        other => panic!("expected DimensionsOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_malformed_dimensions() {
    match pixmap::parse_pixmap(&ppm("P6\nwide tall\n255\n", &[]), DEFAULT_MAX_DIMENSION) {
        Err(PixmapError::BadHeader(_)) => {}
        other => panic!("expected BadHeader, got {:?}", other),
    }
}

#[test]
fn test_max_value_must_be_255() {
    match pixmap::parse_pixmap(&ppm("P6\n1 1\n65535\n", &[0; 6]), DEFAULT_MAX_DIMENSION) {
        Err(PixmapError::UnsupportedMaxValue(line)) => assert_eq!(line, "65535"),
        other => panic!("expected UnsupportedMaxValue, got {:?}", other),
    }
}

#[test]
fn test_truncated_pixels() {
    match pixmap::parse_pixmap(&ppm("P6\n2 2\n255\n", &[0; 5]), DEFAULT_MAX_DIMENSION) {
        Err(PixmapError::Truncated { expected, actual }) => {
            assert_eq!(expected, 12);
            assert_eq!(actual, 5);
        }
        other => panic!("expected Truncated, got {:?}", other),
    }
}

#[test]
fn test_encode_drops_fourth_channel() {
    let image = Image::from_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).expect("image");
    let bytes = pixmap::encode_ppm(&image).expect("encode");
    assert_eq!(bytes, ppm("P6\n2 1\n255\n", &[1, 2, 3, 5, 6, 7]));
}

#[test]
fn test_encode_rejects_narrow_pixels() {
    let image = Image::new(1, 1, 2);
    match pixmap::encode_ppm(&image) {
        Err(PixmapError::UnsupportedPixelSize(2)) => {}
        other => panic!("expected UnsupportedPixelSize, got {:?}", other),
    }
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("frame.ppm");

    let mut image = Image::new(3, 2, 4);
    for (i, px) in image.pixels.chunks_exact_mut(4).enumerate() {
        px.copy_from_slice(&[i as u8, 0x80, 0xFF - i as u8, 0]);
    }
    pixmap::save_ppm(&path, &image).expect("save");

    let loaded = pixmap::load_pixmap(&path, DEFAULT_MAX_DIMENSION).expect("load");
    assert_eq!((loaded.width, loaded.height), (3, 2));
    // Alpha comes back opaque, color channels unchanged
    for (i, px) in loaded.rgba.chunks_exact(4).enumerate() {
        assert_eq!(px, &[i as u8, 0x80, 0xFF - i as u8, 0xFF]);
    }

    let image = loaded.into_image();
    assert_eq!(image.bytes_per_pixel, 4);
    assert_eq!(image.byte_size(), 24);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    match pixmap::load_pixmap(dir.path().join("missing.ppm"), DEFAULT_MAX_DIMENSION) {
        Err(PixmapError::Io(_)) => {}
        other => panic!("expected Io, got {:?}", other),
    }
}
