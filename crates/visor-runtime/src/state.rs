use visor_protocol::commands::{IndexType, Viewport, MAX_VERTEX_BINDINGS};
use visor_protocol::handle::Handle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexBinding {
    pub buffer: Option<Handle>,
    pub offset: u64,
    pub index_type: IndexType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexBinding {
    pub buffer: Option<Handle>,
    pub offset: u64,
}

/// Register file consulted by draws during one stream's replay.
///
/// Starts zeroed for every stream. `target` is only set while a render pass
/// is active; every other field keeps its value across render-pass
/// boundaries until the stream overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuState {
    pub target: Option<Handle>,
    pub pipeline: Option<Handle>,
    pub descriptor_set: Option<Handle>,
    pub index_buffer: IndexBinding,
    pub vertex_buffers: [VertexBinding; MAX_VERTEX_BINDINGS],
    pub viewport: Viewport,
}

impl GpuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_render_pass(&self) -> bool {
        self.target.is_some()
    }

    pub fn vertex_buffer(&self, slot: usize) -> Option<&VertexBinding> {
        self.vertex_buffers.get(slot)
    }
}

/// `None` for a null handle, so a zeroed record unbinds.
pub(crate) fn bound(handle: Handle) -> Option<Handle> {
    (!handle.is_null()).then_some(handle)
}
