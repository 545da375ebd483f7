use serde::{Deserialize, Serialize};

/// A generation-checked handle that identifies a resource in the resource graph.
/// Opaque to the recorder -- the resource arena assigns these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    /// Slot index within the arena for `kind`
    pub index: u32,
    /// Generation of the slot at allocation time; 0 is never allocated
    pub generation: u32,
    /// Type tag for validation. Not carried on the wire: the record schema
    /// implies it from the field position.
    pub kind: ResourceKind,
}

impl Handle {
    /// Create a null handle of the given kind.
    pub const fn null(kind: ResourceKind) -> Self {
        Self {
            index: 0,
            generation: 0,
            kind,
        }
    }

    pub const fn new(kind: ResourceKind, index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            kind,
        }
    }

    pub fn is_null(&self) -> bool {
        self.generation == 0 && self.index == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Image,
    Buffer,
    RenderPass,
    Framebuffer,
    Pipeline,
    DescriptorSet,
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}#{}v{}", self.kind, self.index, self.generation)
    }
}
