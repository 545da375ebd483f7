use visor_core::ResourceError;
use visor_protocol::commands::BufferImageCopy;
use visor_protocol::DecodeError;

use crate::command_buffer::CommandBufferState;

/// Replay of one command stream failed. Offsets are byte positions of the
/// offending record within its stream.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("unsupported operation at offset {offset}: {reason}")]
    UnsupportedOperation { offset: usize, reason: String },

    #[error("copy at offset {offset} reads {needed} bytes from a {available}-byte buffer")]
    CopyOutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid render pass at offset {offset}: {reason}")]
    InvalidRenderPass { offset: usize, reason: String },

    #[error("vertex binding slot {slot} out of range at offset {offset}")]
    VertexSlotOutOfRange { offset: usize, slot: u32 },

    #[error("draw outside a render pass at offset {offset}")]
    DrawOutsideRenderPass { offset: usize },

    #[error("render pass begun at offset {offset} while another is active")]
    NestedRenderPass { offset: usize },

    #[error("render pass ended at offset {offset} with none active")]
    NoActiveRenderPass { offset: usize },

    #[error("stream ended inside a render pass")]
    UnterminatedRenderPass,

    #[error("rasterizer error: {0}")]
    Raster(String),
}

impl ReplayError {
    pub(crate) fn non_tight_copy(offset: usize, region: &BufferImageCopy) -> Self {
        ReplayError::UnsupportedOperation {
            offset,
            reason: format!(
                "only tightly packed copies are supported (buffer_offset={}, buffer_row_length={})",
                region.buffer_offset, region.buffer_row_length
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission {submission}, command buffer {buffer}: {source}")]
    Replay {
        submission: usize,
        buffer: usize,
        #[source]
        source: ReplayError,
    },

    #[error("submission {submission}, command buffer {buffer} is not executable (state {state:?})")]
    NotExecutable {
        submission: usize,
        buffer: usize,
        state: CommandBufferState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("command buffer is not recording (state {0:?})")]
    NotRecording(CommandBufferState),

    #[error("command buffer cannot begin recording from state {0:?}")]
    InvalidBegin(CommandBufferState),
}
