//! Command buffer recording.
//! Recording encodes each command straight into the buffer's byte stream;
//! the stream is replayed at submit time.

use visor_protocol::commands::{
    BufferImageCopy, ClearColor, Command, IndexType, Rect2D, Viewport,
};
use visor_protocol::{CommandWriter, Handle};

use crate::error::RecordError;

/// Lifecycle of a command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandBufferState {
    Initial,
    Recording,
    Executable,
}

/// Owns one command stream.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    state: CommandBufferState,
    stream: CommandWriter,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self {
            state: CommandBufferState::Initial,
            stream: CommandWriter::new(),
        }
    }

    /// Wrap an already-encoded stream, e.g. one read back from a capture.
    /// The buffer is immediately executable; the bytes are not validated
    /// until replay.
    pub fn from_stream(bytes: Vec<u8>, record_count: u32) -> Self {
        Self {
            state: CommandBufferState::Executable,
            stream: CommandWriter::from_raw(bytes, record_count),
        }
    }

    pub fn state(&self) -> CommandBufferState {
        self.state
    }

    pub fn is_executable(&self) -> bool {
        self.state == CommandBufferState::Executable
    }

    pub fn begin(&mut self) -> Result<(), RecordError> {
        if self.state == CommandBufferState::Recording {
            return Err(RecordError::InvalidBegin(self.state));
        }
        // Beginning an executable buffer implicitly resets it
        self.stream.clear();
        self.state = CommandBufferState::Recording;
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), RecordError> {
        if self.state != CommandBufferState::Recording {
            return Err(RecordError::NotRecording(self.state));
        }
        self.state = CommandBufferState::Executable;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.stream.clear();
        self.state = CommandBufferState::Initial;
    }

    /// The encoded command stream.
    pub fn stream(&self) -> &[u8] {
        self.stream.as_bytes()
    }

    pub fn record_count(&self) -> u32 {
        self.stream.record_count()
    }

    /// Append one command to the stream.
    pub fn record(&mut self, cmd: &Command) -> Result<(), RecordError> {
        if self.state != CommandBufferState::Recording {
            return Err(RecordError::NotRecording(self.state));
        }
        self.stream.push(cmd);
        Ok(())
    }

    // ── Typed recording helpers ─────────────────────────────

    pub fn cmd_pipeline_barrier(
        &mut self,
        src_stage_mask: u32,
        dst_stage_mask: u32,
        dependency_flags: u32,
    ) -> Result<(), RecordError> {
        self.record(&Command::PipelineBarrier {
            src_stage_mask,
            dst_stage_mask,
            dependency_flags,
        })
    }

    pub fn cmd_begin_render_pass(
        &mut self,
        render_pass: Handle,
        framebuffer: Handle,
        render_area: Rect2D,
        clear_color: ClearColor,
    ) -> Result<(), RecordError> {
        self.record(&Command::BeginRenderPass {
            render_pass,
            framebuffer,
            render_area,
            clear_color,
        })
    }

    pub fn cmd_end_render_pass(&mut self) -> Result<(), RecordError> {
        self.record(&Command::EndRenderPass)
    }

    pub fn cmd_bind_pipeline(&mut self, pipeline: Handle) -> Result<(), RecordError> {
        self.record(&Command::BindPipeline { pipeline })
    }

    pub fn cmd_bind_descriptor_sets(&mut self, descriptor_set: Handle) -> Result<(), RecordError> {
        self.record(&Command::BindDescriptorSets { descriptor_set })
    }

    pub fn cmd_bind_index_buffer(
        &mut self,
        buffer: Handle,
        offset: u64,
        index_type: IndexType,
    ) -> Result<(), RecordError> {
        self.record(&Command::BindIB {
            buffer,
            offset,
            index_type,
        })
    }

    pub fn cmd_bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: Handle,
        offset: u64,
    ) -> Result<(), RecordError> {
        self.record(&Command::BindVB {
            slot,
            buffer,
            offset,
        })
    }

    pub fn cmd_set_viewport(&mut self, viewport: Viewport) -> Result<(), RecordError> {
        self.record(&Command::SetViewport { viewport })
    }

    pub fn cmd_set_scissor(&mut self, scissor: Rect2D) -> Result<(), RecordError> {
        self.record(&Command::SetScissors { scissor })
    }

    pub fn cmd_draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<(), RecordError> {
        self.record(&Command::draw(vertex_count, first_vertex))
    }

    pub fn cmd_draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<(), RecordError> {
        self.record(&Command::DrawIndexed {
            index_count,
            instance_count: 1,
            first_index,
            vertex_offset,
            first_instance: 0,
        })
    }

    pub fn cmd_copy_buffer_to_image(
        &mut self,
        src_buffer: Handle,
        dst_image: Handle,
        region: BufferImageCopy,
    ) -> Result<(), RecordError> {
        self.record(&Command::CopyBuf2Img {
            src_buffer,
            dst_image,
            region,
        })
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}
