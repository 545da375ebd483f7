use std::borrow::Cow;

use crate::codec::CommandReader;
use crate::commands::Command;
use crate::error::DecodeError;

/// Capture file magic bytes: "VS"
pub const MAGIC: [u8; 2] = [0x56, 0x53];

/// Maximum capture payload size: 256 MB
pub const MAX_CAPTURE_SIZE: u32 = 256 * 1024 * 1024;

/// Capture header size in bytes: magic(2) + flags(1) + record_count(4) + length(4) = 11
pub const HEADER_SIZE: usize = 11;

/// Default minimum stream size to attempt LZ4 compression (bytes).
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 512;

bitflags::bitflags! {
    /// Capture flags byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CaptureFlags: u8 {
        const COMPRESSED = 0b0000_0001;
    }
}

/// A command stream read back from a capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub flags: CaptureFlags,
    pub record_count: u32,
    pub stream: Vec<u8>,
}

impl Capture {
    /// Decode every record with its byte offset, checking the count against
    /// the header.
    pub fn records(&self) -> Result<Vec<(usize, Command)>, WireError> {
        let mut reader = CommandReader::new(&self.stream);
        let mut records = Vec::new();
        loop {
            let offset = reader.position();
            match reader.next_command()? {
                Some(cmd) => records.push((offset, cmd)),
                None => break,
            }
        }
        if records.len() != self.record_count as usize {
            return Err(WireError::RecordCountMismatch {
                declared: self.record_count,
                actual: records.len(),
            });
        }
        Ok(records)
    }
}

/// Options controlling how a capture is written.
#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    pub compress: bool,
    pub compression_threshold: usize,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            compress: true,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }
}

/// Frame a command stream (header + payload), with optional LZ4 compression.
pub fn encode_capture(
    stream: &[u8],
    record_count: u32,
    options: CaptureOptions,
) -> Result<Vec<u8>, WireError> {
    if stream.len() > MAX_CAPTURE_SIZE as usize {
        return Err(WireError::CaptureTooLarge(stream.len()));
    }

    let (payload, flags) = if options.compress && stream.len() > options.compression_threshold {
        let compressed = lz4_flex::compress_prepend_size(stream);
        if compressed.len() < stream.len() {
            (Cow::Owned(compressed), CaptureFlags::COMPRESSED)
        } else {
            // Compression didn't help, store as-is
            (Cow::Borrowed(stream), CaptureFlags::empty())
        }
    } else {
        (Cow::Borrowed(stream), CaptureFlags::empty())
    };

    let payload_len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_CAPTURE_SIZE)
        .ok_or(WireError::CaptureTooLarge(payload.len()))?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(flags.bits());
    frame.extend_from_slice(&record_count.to_le_bytes());
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&payload);

    Ok(frame)
}

/// Decode a capture header. Returns (flags, record_count, payload_length).
pub fn decode_header(header: &[u8; HEADER_SIZE]) -> Result<(CaptureFlags, u32, u32), WireError> {
    if header[0] != MAGIC[0] || header[1] != MAGIC[1] {
        return Err(WireError::InvalidMagic);
    }

    let flags = CaptureFlags::from_bits(header[2]).ok_or(WireError::UnknownFlags(header[2]))?;
    let record_count = u32::from_le_bytes([header[3], header[4], header[5], header[6]]);
    let length = u32::from_le_bytes([header[7], header[8], header[9], header[10]]);

    if length > MAX_CAPTURE_SIZE {
        return Err(WireError::CaptureTooLarge(length as usize));
    }

    Ok((flags, record_count, length))
}

/// Decode a whole capture file, decompressing if the COMPRESSED flag is set.
pub fn decode_capture(bytes: &[u8]) -> Result<Capture, WireError> {
    let header: &[u8; HEADER_SIZE] = bytes
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or(WireError::TruncatedHeader(bytes.len()))?;
    let (flags, record_count, length) = decode_header(header)?;

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != length as usize {
        return Err(WireError::LengthMismatch {
            declared: length,
            actual: payload.len(),
        });
    }

    let stream = if flags.contains(CaptureFlags::COMPRESSED) {
        // The size prefix is checked before lz4_flex allocates for it
        let prefix: [u8; 4] = payload
            .get(..4)
            .and_then(|p| p.try_into().ok())
            .ok_or_else(|| WireError::DecompressionError("missing size prefix".to_string()))?;
        let inflated = u32::from_le_bytes(prefix);
        if inflated > MAX_CAPTURE_SIZE {
            return Err(WireError::CaptureTooLarge(inflated as usize));
        }
        lz4_flex::decompress_size_prepended(payload)
            .map_err(|e| WireError::DecompressionError(e.to_string()))?
    } else {
        payload.to_vec()
    };

    Ok(Capture {
        flags,
        record_count,
        stream,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid magic bytes")]
    InvalidMagic,
    #[error("unknown capture flags: {0:#04x}")]
    UnknownFlags(u8),
    #[error("capture too short for header: {0} bytes")]
    TruncatedHeader(usize),
    #[error("capture too large: {0} bytes")]
    CaptureTooLarge(usize),
    #[error("payload length mismatch: header declares {declared} bytes, found {actual}")]
    LengthMismatch { declared: u32, actual: usize },
    #[error("decompression error: {0}")]
    DecompressionError(String),
    #[error("header declares {declared} records but stream holds {actual}")]
    RecordCountMismatch { declared: u32, actual: usize },
    #[error("capture stream: {0}")]
    Decode(#[from] DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
