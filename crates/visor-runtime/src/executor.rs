use tracing::{debug, trace, warn};

use visor_core::config::{RenderPassScope, ReplayConfig};
use visor_core::{ResourceError, ResourceGraph};
use visor_protocol::commands::{BufferImageCopy, ClearColor, Command};
use visor_protocol::{CommandReader, Handle};

use crate::error::ReplayError;
use crate::rasterizer::Rasterizer;
use crate::state::{bound, GpuState, IndexBinding, VertexBinding};

/// Result of replaying one command stream to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// Records executed
    pub records: usize,
    /// Bytes consumed; always the full stream length
    pub bytes: usize,
    /// Register state after the last record
    pub state: GpuState,
}

/// Replay engine: decodes a command stream record by record and applies each
/// one to a fresh [`GpuState`], calling into the rasterizer for clears and
/// draws.
pub struct Executor<R: Rasterizer> {
    rasterizer: R,
    scope: RenderPassScope,
}

impl<R: Rasterizer> Executor<R> {
    /// Executor with strict render-pass scope enforcement.
    pub fn new(rasterizer: R) -> Self {
        Self::with_scope(rasterizer, RenderPassScope::Strict)
    }

    pub fn with_scope(rasterizer: R, scope: RenderPassScope) -> Self {
        Self { rasterizer, scope }
    }

    pub fn from_config(rasterizer: R, config: &ReplayConfig) -> Self {
        Self::with_scope(rasterizer, config.render_pass_scope)
    }

    pub fn scope(&self) -> RenderPassScope {
        self.scope
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Replay `stream` from its first byte to its last.
    ///
    /// Effects of records before a failing one are kept; nothing after it
    /// is decoded.
    pub fn replay(
        &mut self,
        resources: &mut ResourceGraph,
        stream: &[u8],
    ) -> Result<ReplayOutcome, ReplayError> {
        let mut state = GpuState::new();
        let mut reader = CommandReader::new(stream);
        let mut records = 0;

        loop {
            let offset = reader.position();
            let Some(cmd) = reader.next_command()? else {
                break;
            };
            trace!("record {} at offset {}: {:?}", records, offset, cmd.tag());
            self.execute(resources, &mut state, offset, cmd)?;
            records += 1;
        }
        debug_assert!(reader.is_at_end());

        if state.in_render_pass() {
            match self.scope {
                RenderPassScope::Strict => return Err(ReplayError::UnterminatedRenderPass),
                RenderPassScope::Permissive => {
                    warn!("command stream ended inside a render pass");
                }
            }
        }

        debug!("replayed {} records ({} bytes)", records, stream.len());
        Ok(ReplayOutcome {
            records,
            bytes: stream.len(),
            state,
        })
    }

    fn execute(
        &mut self,
        resources: &mut ResourceGraph,
        state: &mut GpuState,
        offset: usize,
        cmd: Command,
    ) -> Result<(), ReplayError> {
        match cmd {
            // Ordering is implicit in a single-threaded replay
            Command::PipelineBarrier { .. } => {}

            Command::BeginRenderPass {
                render_pass,
                framebuffer,
                render_area: _,
                clear_color,
            } => {
                self.begin_render_pass(
                    resources,
                    state,
                    offset,
                    render_pass,
                    framebuffer,
                    clear_color,
                )?;
            }

            Command::EndRenderPass => {
                if state.target.is_none() {
                    self.scope_violation(ReplayError::NoActiveRenderPass { offset })?;
                }
                state.target = None;
            }

            Command::BindPipeline { pipeline } => {
                if !pipeline.is_null() {
                    resources.pipeline(pipeline)?;
                }
                state.pipeline = bound(pipeline);
            }

            Command::BindDescriptorSets { descriptor_set } => {
                if !descriptor_set.is_null() {
                    resources.descriptor_set(descriptor_set)?;
                }
                state.descriptor_set = bound(descriptor_set);
            }

            Command::BindIB {
                buffer,
                offset: byte_offset,
                index_type,
            } => {
                if !buffer.is_null() {
                    resources.buffer(buffer)?;
                }
                state.index_buffer = IndexBinding {
                    buffer: bound(buffer),
                    offset: byte_offset,
                    index_type,
                };
            }

            Command::BindVB {
                slot,
                buffer,
                offset: byte_offset,
            } => {
                let binding = state
                    .vertex_buffers
                    .get_mut(slot as usize)
                    .ok_or(ReplayError::VertexSlotOutOfRange { offset, slot })?;
                if !buffer.is_null() {
                    resources.buffer(buffer)?;
                }
                *binding = VertexBinding {
                    buffer: bound(buffer),
                    offset: byte_offset,
                };
            }

            Command::SetViewport { viewport } => state.viewport = viewport,

            // Scissor state is not tracked
            Command::SetScissors { .. } => {}

            Command::Draw {
                vertex_count,
                first_vertex,
                ..
            } => {
                self.check_draw_scope(state, offset)?;
                self.rasterizer
                    .draw_triangles(resources, state, vertex_count, first_vertex, false)?;
            }

            Command::DrawIndexed {
                index_count,
                first_index,
                ..
            } => {
                self.check_draw_scope(state, offset)?;
                self.rasterizer
                    .draw_triangles(resources, state, index_count, first_index, true)?;
            }

            Command::CopyBuf2Img {
                src_buffer,
                dst_image,
                region,
            } => copy_buffer_to_image(resources, offset, src_buffer, dst_image, &region)?,
        }
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        resources: &mut ResourceGraph,
        state: &mut GpuState,
        offset: usize,
        render_pass: Handle,
        framebuffer: Handle,
        clear_color: ClearColor,
    ) -> Result<(), ReplayError> {
        if state.target.is_some() {
            self.scope_violation(ReplayError::NestedRenderPass { offset })?;
        }

        let attachment = *resources
            .render_pass(render_pass)?
            .primary_color_attachment()
            .ok_or_else(|| ReplayError::InvalidRenderPass {
                offset,
                reason: format!("{} has no color attachment in its first subpass", render_pass),
            })?;

        let target = *resources
            .framebuffer(framebuffer)?
            .attachments
            .get(attachment.index as usize)
            .ok_or_else(|| ReplayError::InvalidRenderPass {
                offset,
                reason: format!(
                    "{} has no attachment at slot {}",
                    framebuffer, attachment.index
                ),
            })?;
        resources.image(target)?;

        state.target = Some(target);
        if attachment.clear_on_load {
            self.rasterizer.clear_target(resources, target, clear_color)?;
        }
        Ok(())
    }

    fn check_draw_scope(&self, state: &GpuState, offset: usize) -> Result<(), ReplayError> {
        if state.target.is_none() {
            self.scope_violation(ReplayError::DrawOutsideRenderPass { offset })?;
        }
        Ok(())
    }

    /// Strict scope turns the violation into an error; permissive scope
    /// logs it and lets replay continue.
    fn scope_violation(&self, violation: ReplayError) -> Result<(), ReplayError> {
        match self.scope {
            RenderPassScope::Strict => Err(violation),
            RenderPassScope::Permissive => {
                warn!("{}", violation);
                Ok(())
            }
        }
    }
}

/// Copy a tightly packed buffer region into the whole destination image.
fn copy_buffer_to_image(
    resources: &mut ResourceGraph,
    offset: usize,
    src_buffer: Handle,
    dst_image: Handle,
    region: &BufferImageCopy,
) -> Result<(), ReplayError> {
    if !region.is_tightly_packed() {
        return Err(ReplayError::non_tight_copy(offset, region));
    }

    let (src, dst) = resources.buffer_and_image_mut(src_buffer, dst_image)?;
    let size = dst.byte_size();
    if src.len() < size {
        return Err(ReplayError::CopyOutOfBounds {
            offset,
            needed: size,
            available: src.len(),
        });
    }
    if dst.pixels.len() < size {
        return Err(ReplayError::Resource(ResourceError::PixelSizeMismatch {
            expected: size,
            actual: dst.pixels.len(),
        }));
    }

    dst.pixels[..size].copy_from_slice(&src.bytes[..size]);
    trace!("copied {} bytes from {} to {}", size, src_buffer, dst_image);
    Ok(())
}
