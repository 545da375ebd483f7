//! Command stream encoding and decoding.
//!
//! A stream is a plain concatenation of records. Each record is a `u32` tag
//! followed by the tag's fixed-width payload (see [`CommandTag::payload_size`]).
//! All integers and floats are little-endian. A handle field is encoded as
//! `index: u32, generation: u32`; its resource kind comes from the schema.

use crate::commands::{
    BufferImageCopy, ClearColor, Command, CommandTag, IndexType, Rect2D, Viewport, TAG_SIZE,
};
use crate::error::DecodeError;
use crate::handle::{Handle, ResourceKind};

// ============================================================================
// Encoder
// ============================================================================

/// Append-only encoder for a command stream.
#[derive(Debug, Default, Clone)]
pub struct CommandWriter {
    bytes: Vec<u8>,
    records: u32,
}

impl CommandWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt bytes encoded elsewhere. `records` is what the producer
    /// reported; it is not checked against the bytes.
    pub fn from_raw(bytes: Vec<u8>, records: u32) -> Self {
        Self { bytes, records }
    }

    pub fn push(&mut self, cmd: &Command) {
        encode_command(cmd, &mut self.bytes);
        self.records += 1;
    }

    pub fn record_count(&self) -> u32 {
        self.records
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.records = 0;
    }
}

/// Encode one record (tag + payload) onto `out`.
/// Always writes exactly `cmd.tag().record_size()` bytes.
pub fn encode_command(cmd: &Command, out: &mut Vec<u8>) {
    let start = out.len();
    write_u32(out, cmd.tag().as_raw());

    match cmd {
        Command::PipelineBarrier {
            src_stage_mask,
            dst_stage_mask,
            dependency_flags,
        } => {
            write_u32(out, *src_stage_mask);
            write_u32(out, *dst_stage_mask);
            write_u32(out, *dependency_flags);
        }
        Command::BeginRenderPass {
            render_pass,
            framebuffer,
            render_area,
            clear_color,
        } => {
            write_handle(out, render_pass);
            write_handle(out, framebuffer);
            write_rect(out, render_area);
            for c in clear_color.float32 {
                write_f32(out, c);
            }
        }
        Command::EndRenderPass => {}
        Command::BindPipeline { pipeline } => write_handle(out, pipeline),
        Command::BindDescriptorSets { descriptor_set } => write_handle(out, descriptor_set),
        Command::BindIB {
            buffer,
            offset,
            index_type,
        } => {
            write_handle(out, buffer);
            write_u64(out, *offset);
            write_u32(out, index_type.as_raw());
        }
        Command::BindVB {
            slot,
            buffer,
            offset,
        } => {
            write_u32(out, *slot);
            write_handle(out, buffer);
            write_u64(out, *offset);
        }
        Command::SetViewport { viewport } => {
            write_f32(out, viewport.x);
            write_f32(out, viewport.y);
            write_f32(out, viewport.width);
            write_f32(out, viewport.height);
            write_f32(out, viewport.min_depth);
            write_f32(out, viewport.max_depth);
        }
        Command::SetScissors { scissor } => write_rect(out, scissor),
        Command::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        } => {
            write_u32(out, *vertex_count);
            write_u32(out, *instance_count);
            write_u32(out, *first_vertex);
            write_u32(out, *first_instance);
        }
        Command::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        } => {
            write_u32(out, *index_count);
            write_u32(out, *instance_count);
            write_u32(out, *first_index);
            write_i32(out, *vertex_offset);
            write_u32(out, *first_instance);
        }
        Command::CopyBuf2Img {
            src_buffer,
            dst_image,
            region,
        } => {
            write_handle(out, src_buffer);
            write_handle(out, dst_image);
            write_u64(out, region.buffer_offset);
            write_u32(out, region.buffer_row_length);
            write_u32(out, region.buffer_image_height);
            for v in region.image_offset {
                write_i32(out, v);
            }
            for v in region.image_extent {
                write_u32(out, v);
            }
        }
    }

    debug_assert_eq!(out.len() - start, cmd.tag().record_size());
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_handle(out: &mut Vec<u8>, h: &Handle) {
    write_u32(out, h.index);
    write_u32(out, h.generation);
}

fn write_rect(out: &mut Vec<u8>, r: &Rect2D) {
    write_i32(out, r.offset[0]);
    write_i32(out, r.offset[1]);
    write_u32(out, r.extent[0]);
    write_u32(out, r.extent[1]);
}

// ============================================================================
// Decoder
// ============================================================================

/// Bounds-checked reader over a complete command stream.
///
/// Yields one [`Command`] per record. After the first error the reader is
/// exhausted; a stream either decodes to its exact end or fails.
pub struct CommandReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> CommandReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset of the next record.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Decode the next record, or `Ok(None)` at the exact end of the stream.
    pub fn next_command(&mut self) -> Result<Option<Command>, DecodeError> {
        if self.failed || self.is_at_end() {
            return Ok(None);
        }
        match self.decode_record() {
            Ok(cmd) => Ok(Some(cmd)),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn decode_record(&mut self) -> Result<Command, DecodeError> {
        let offset = self.pos;
        let remaining = self.remaining();

        if remaining < TAG_SIZE {
            return Err(DecodeError::TruncatedTag { offset, remaining });
        }
        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(&self.bytes[offset..offset + TAG_SIZE]);
        let raw_tag = u32::from_le_bytes(tag_bytes);
        let tag = CommandTag::from_raw(raw_tag)
            .ok_or(DecodeError::UnknownTag { offset, value: raw_tag })?;

        let needed = tag.payload_size();
        let available = remaining - TAG_SIZE;
        if available < needed {
            return Err(DecodeError::Truncated {
                offset,
                tag,
                needed,
                available,
            });
        }

        let payload_start = offset + TAG_SIZE;
        let payload = &self.bytes[payload_start..payload_start + needed];
        let mut fields = FieldCursor {
            buf: payload,
            pos: 0,
            record_offset: offset,
            tag,
        };
        let cmd = fields.decode()?;
        debug_assert_eq!(fields.pos, needed, "schema width mismatch for {:?}", tag);

        self.pos = payload_start + needed;
        Ok(cmd)
    }
}

impl Iterator for CommandReader<'_> {
    type Item = Result<Command, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_command().transpose()
    }
}

/// Decode an entire stream into records.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Command>, DecodeError> {
    CommandReader::new(bytes).collect()
}

/// Field-by-field reader over one record's payload slice.
struct FieldCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    record_offset: usize,
    tag: CommandTag,
}

impl FieldCursor<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let src = self.buf.get(self.pos..end).ok_or(DecodeError::Truncated {
            offset: self.record_offset,
            tag: self.tag,
            needed: end,
            available: self.buf.len(),
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(src);
        self.pos = end;
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn handle(&mut self, kind: ResourceKind) -> Result<Handle, DecodeError> {
        let index = self.u32()?;
        let generation = self.u32()?;
        Ok(Handle::new(kind, index, generation))
    }

    fn rect(&mut self) -> Result<Rect2D, DecodeError> {
        Ok(Rect2D {
            offset: [self.i32()?, self.i32()?],
            extent: [self.u32()?, self.u32()?],
        })
    }

    fn decode(&mut self) -> Result<Command, DecodeError> {
        let cmd = match self.tag {
            CommandTag::PipelineBarrier => Command::PipelineBarrier {
                src_stage_mask: self.u32()?,
                dst_stage_mask: self.u32()?,
                dependency_flags: self.u32()?,
            },
            CommandTag::BeginRenderPass => Command::BeginRenderPass {
                render_pass: self.handle(ResourceKind::RenderPass)?,
                framebuffer: self.handle(ResourceKind::Framebuffer)?,
                render_area: self.rect()?,
                clear_color: ClearColor {
                    float32: [self.f32()?, self.f32()?, self.f32()?, self.f32()?],
                },
            },
            CommandTag::EndRenderPass => Command::EndRenderPass,
            CommandTag::BindPipeline => Command::BindPipeline {
                pipeline: self.handle(ResourceKind::Pipeline)?,
            },
            CommandTag::BindDescriptorSets => Command::BindDescriptorSets {
                descriptor_set: self.handle(ResourceKind::DescriptorSet)?,
            },
            CommandTag::BindIB => {
                let buffer = self.handle(ResourceKind::Buffer)?;
                let offset = self.u64()?;
                let raw = self.u32()?;
                let index_type = IndexType::from_raw(raw).ok_or(DecodeError::InvalidIndexType {
                    offset: self.record_offset,
                    value: raw,
                })?;
                Command::BindIB {
                    buffer,
                    offset,
                    index_type,
                }
            }
            CommandTag::BindVB => Command::BindVB {
                slot: self.u32()?,
                buffer: self.handle(ResourceKind::Buffer)?,
                offset: self.u64()?,
            },
            CommandTag::SetViewport => Command::SetViewport {
                viewport: Viewport {
                    x: self.f32()?,
                    y: self.f32()?,
                    width: self.f32()?,
                    height: self.f32()?,
                    min_depth: self.f32()?,
                    max_depth: self.f32()?,
                },
            },
            CommandTag::SetScissors => Command::SetScissors {
                scissor: self.rect()?,
            },
            CommandTag::Draw => Command::Draw {
                vertex_count: self.u32()?,
                instance_count: self.u32()?,
                first_vertex: self.u32()?,
                first_instance: self.u32()?,
            },
            CommandTag::DrawIndexed => Command::DrawIndexed {
                index_count: self.u32()?,
                instance_count: self.u32()?,
                first_index: self.u32()?,
                vertex_offset: self.i32()?,
                first_instance: self.u32()?,
            },
            CommandTag::CopyBuf2Img => Command::CopyBuf2Img {
                src_buffer: self.handle(ResourceKind::Buffer)?,
                dst_image: self.handle(ResourceKind::Image)?,
                region: BufferImageCopy {
                    buffer_offset: self.u64()?,
                    buffer_row_length: self.u32()?,
                    buffer_image_height: self.u32()?,
                    image_offset: [self.i32()?, self.i32()?, self.i32()?],
                    image_extent: [self.u32()?, self.u32()?, self.u32()?],
                },
            },
        };
        Ok(cmd)
    }
}
