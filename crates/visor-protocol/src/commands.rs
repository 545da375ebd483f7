use serde::{Deserialize, Serialize};

use crate::handle::Handle;

/// Number of vertex-buffer binding slots in the register state.
pub const MAX_VERTEX_BINDINGS: usize = 16;

// ============================================================================
// Plain payload types
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect2D {
    pub offset: [i32; 2],
    pub extent: [u32; 2],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// RGBA clear color, one float per channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearColor {
    pub float32: [f32; 4],
}

impl ClearColor {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            float32: [r, g, b, a],
        }
    }

    /// Quantize to 8-bit unsigned normalized channels.
    pub fn to_unorm8(&self) -> [u8; 4] {
        self.float32
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum IndexType {
    #[default]
    Uint16 = 0,
    Uint32 = 1,
}

impl IndexType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Uint16),
            1 => Some(Self::Uint32),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// Buffer-to-image copy region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferImageCopy {
    pub buffer_offset: u64,
    pub buffer_row_length: u32,
    pub buffer_image_height: u32,
    pub image_offset: [i32; 3],
    pub image_extent: [u32; 3],
}

impl BufferImageCopy {
    /// A region with no row pitch and zero source offset.
    pub fn tight(width: u32, height: u32) -> Self {
        Self {
            image_extent: [width, height, 1],
            ..Self::default()
        }
    }

    pub fn is_tightly_packed(&self) -> bool {
        self.buffer_offset == 0 && self.buffer_row_length == 0
    }
}

// ============================================================================
// Command tags
// ============================================================================

/// Closed set of record tags. The discriminant is the on-wire tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CommandTag {
    PipelineBarrier = 0,
    BeginRenderPass = 1,
    EndRenderPass = 2,
    BindPipeline = 3,
    BindDescriptorSets = 4,
    BindIB = 5,
    BindVB = 6,
    SetViewport = 7,
    SetScissors = 8,
    Draw = 9,
    DrawIndexed = 10,
    CopyBuf2Img = 11,
}

/// Encoded size of a handle field: index u32 + generation u32.
pub const HANDLE_SIZE: usize = 8;

/// Encoded size of the tag that precedes every payload.
pub const TAG_SIZE: usize = 4;

impl CommandTag {
    pub const ALL: [CommandTag; 12] = [
        CommandTag::PipelineBarrier,
        CommandTag::BeginRenderPass,
        CommandTag::EndRenderPass,
        CommandTag::BindPipeline,
        CommandTag::BindDescriptorSets,
        CommandTag::BindIB,
        CommandTag::BindVB,
        CommandTag::SetViewport,
        CommandTag::SetScissors,
        CommandTag::Draw,
        CommandTag::DrawIndexed,
        CommandTag::CopyBuf2Img,
    ];

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Fixed payload width in bytes. Recorder and replayer agree on these
    /// widths; nothing in the stream carries them.
    pub const fn payload_size(self) -> usize {
        match self {
            CommandTag::PipelineBarrier => 12,
            CommandTag::BeginRenderPass => 2 * HANDLE_SIZE + 16 + 16,
            CommandTag::EndRenderPass => 0,
            CommandTag::BindPipeline => HANDLE_SIZE,
            CommandTag::BindDescriptorSets => HANDLE_SIZE,
            CommandTag::BindIB => HANDLE_SIZE + 8 + 4,
            CommandTag::BindVB => 4 + HANDLE_SIZE + 8,
            CommandTag::SetViewport => 24,
            CommandTag::SetScissors => 16,
            CommandTag::Draw => 16,
            CommandTag::DrawIndexed => 20,
            CommandTag::CopyBuf2Img => 2 * HANDLE_SIZE + 8 + 4 + 4 + 12 + 12,
        }
    }

    /// Full record width: tag plus payload.
    pub const fn record_size(self) -> usize {
        TAG_SIZE + self.payload_size()
    }
}

// ============================================================================
// Decoded records
// ============================================================================

/// One decoded command record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    PipelineBarrier {
        src_stage_mask: u32,
        dst_stage_mask: u32,
        dependency_flags: u32,
    },
    BeginRenderPass {
        render_pass: Handle,
        framebuffer: Handle,
        render_area: Rect2D,
        clear_color: ClearColor,
    },
    EndRenderPass,
    BindPipeline {
        pipeline: Handle,
    },
    BindDescriptorSets {
        descriptor_set: Handle,
    },
    BindIB {
        buffer: Handle,
        offset: u64,
        index_type: IndexType,
    },
    BindVB {
        slot: u32,
        buffer: Handle,
        offset: u64,
    },
    SetViewport {
        viewport: Viewport,
    },
    SetScissors {
        scissor: Rect2D,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
    CopyBuf2Img {
        src_buffer: Handle,
        dst_image: Handle,
        region: BufferImageCopy,
    },
}

impl Command {
    pub fn tag(&self) -> CommandTag {
        match self {
            Command::PipelineBarrier { .. } => CommandTag::PipelineBarrier,
            Command::BeginRenderPass { .. } => CommandTag::BeginRenderPass,
            Command::EndRenderPass => CommandTag::EndRenderPass,
            Command::BindPipeline { .. } => CommandTag::BindPipeline,
            Command::BindDescriptorSets { .. } => CommandTag::BindDescriptorSets,
            Command::BindIB { .. } => CommandTag::BindIB,
            Command::BindVB { .. } => CommandTag::BindVB,
            Command::SetViewport { .. } => CommandTag::SetViewport,
            Command::SetScissors { .. } => CommandTag::SetScissors,
            Command::Draw { .. } => CommandTag::Draw,
            Command::DrawIndexed { .. } => CommandTag::DrawIndexed,
            Command::CopyBuf2Img { .. } => CommandTag::CopyBuf2Img,
        }
    }

    /// Shorthand for a single-instance non-indexed draw.
    pub fn draw(vertex_count: u32, first_vertex: u32) -> Self {
        Command::Draw {
            vertex_count,
            instance_count: 1,
            first_vertex,
            first_instance: 0,
        }
    }
}
