//! Resource graph: the objects command payloads refer to by handle.

use serde::{Deserialize, Serialize};
use visor_protocol::handle::{Handle, ResourceKind};

use crate::arena::ResourceArena;
use crate::error::ResourceError;

/// A 2D image with linear, tightly packed pixel storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    /// Zero-filled image.
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        let size = width as usize * height as usize * bytes_per_pixel as usize;
        Self {
            width,
            height,
            bytes_per_pixel,
            pixels: vec![0; size],
        }
    }

    /// Wrap existing 4-byte-per-pixel storage.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ResourceError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ResourceError::PixelSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bytes_per_pixel: 4,
            pixels,
        })
    }

    /// Size of the whole pixel storage in bytes.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    pub bytes: Vec<u8>,
}

impl Buffer {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Reference from a subpass to a framebuffer attachment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAttachment {
    /// Framebuffer attachment slot
    pub index: u32,
    /// Clear the attachment when the render pass begins
    pub clear_on_load: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subpass {
    pub color_attachments: Vec<ColorAttachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPass {
    pub subpasses: Vec<Subpass>,
}

impl RenderPass {
    /// Single subpass writing one color attachment.
    pub fn single_color(index: u32, clear_on_load: bool) -> Self {
        Self {
            subpasses: vec![Subpass {
                color_attachments: vec![ColorAttachment {
                    index,
                    clear_on_load,
                }],
            }],
        }
    }

    /// The attachment a render pass renders into: first color attachment
    /// of the first subpass.
    pub fn primary_color_attachment(&self) -> Option<&ColorAttachment> {
        self.subpasses.first()?.color_attachments.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    /// Image per attachment slot
    pub attachments: Vec<Handle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSet {
    /// Sampled images, by binding
    pub images: Vec<Handle>,
}

/// All resources a command stream may reference.
pub struct ResourceGraph {
    images: ResourceArena<Image>,
    buffers: ResourceArena<Buffer>,
    render_passes: ResourceArena<RenderPass>,
    framebuffers: ResourceArena<Framebuffer>,
    pipelines: ResourceArena<Pipeline>,
    descriptor_sets: ResourceArena<DescriptorSet>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self {
            images: ResourceArena::new(ResourceKind::Image),
            buffers: ResourceArena::new(ResourceKind::Buffer),
            render_passes: ResourceArena::new(ResourceKind::RenderPass),
            framebuffers: ResourceArena::new(ResourceKind::Framebuffer),
            pipelines: ResourceArena::new(ResourceKind::Pipeline),
            descriptor_sets: ResourceArena::new(ResourceKind::DescriptorSet),
        }
    }

    // ── Creation ────────────────────────────────────────────

    pub fn create_image(&mut self, image: Image) -> Handle {
        self.images.insert(image)
    }

    pub fn create_buffer(&mut self, buffer: Buffer) -> Handle {
        self.buffers.insert(buffer)
    }

    pub fn create_render_pass(&mut self, render_pass: RenderPass) -> Handle {
        self.render_passes.insert(render_pass)
    }

    pub fn create_framebuffer(&mut self, framebuffer: Framebuffer) -> Handle {
        self.framebuffers.insert(framebuffer)
    }

    pub fn create_pipeline(&mut self, pipeline: Pipeline) -> Handle {
        self.pipelines.insert(pipeline)
    }

    pub fn create_descriptor_set(&mut self, set: DescriptorSet) -> Handle {
        self.descriptor_sets.insert(set)
    }

    // ── Lookup ──────────────────────────────────────────────

    pub fn image(&self, handle: Handle) -> Result<&Image, ResourceError> {
        self.images.get(handle)
    }

    pub fn image_mut(&mut self, handle: Handle) -> Result<&mut Image, ResourceError> {
        self.images.get_mut(handle)
    }

    pub fn buffer(&self, handle: Handle) -> Result<&Buffer, ResourceError> {
        self.buffers.get(handle)
    }

    pub fn render_pass(&self, handle: Handle) -> Result<&RenderPass, ResourceError> {
        self.render_passes.get(handle)
    }

    pub fn framebuffer(&self, handle: Handle) -> Result<&Framebuffer, ResourceError> {
        self.framebuffers.get(handle)
    }

    pub fn pipeline(&self, handle: Handle) -> Result<&Pipeline, ResourceError> {
        self.pipelines.get(handle)
    }

    pub fn descriptor_set(&self, handle: Handle) -> Result<&DescriptorSet, ResourceError> {
        self.descriptor_sets.get(handle)
    }

    /// Borrow a source buffer and a destination image at the same time.
    pub fn buffer_and_image_mut(
        &mut self,
        buffer: Handle,
        image: Handle,
    ) -> Result<(&Buffer, &mut Image), ResourceError> {
        let src = self.buffers.get(buffer)?;
        let dst = self.images.get_mut(image)?;
        Ok((src, dst))
    }

    // ── Destruction ─────────────────────────────────────────

    /// Destroy any resource. The handle and all copies of it become stale.
    pub fn destroy(&mut self, handle: Handle) -> Result<(), ResourceError> {
        match handle.kind {
            ResourceKind::Image => self.images.remove(handle).map(drop),
            ResourceKind::Buffer => self.buffers.remove(handle).map(drop),
            ResourceKind::RenderPass => self.render_passes.remove(handle).map(drop),
            ResourceKind::Framebuffer => self.framebuffers.remove(handle).map(drop),
            ResourceKind::Pipeline => self.pipelines.remove(handle).map(drop),
            ResourceKind::DescriptorSet => self.descriptor_sets.remove(handle).map(drop),
        }
    }

    /// Total number of live resources of every kind.
    pub fn len(&self) -> usize {
        self.images.len()
            + self.buffers.len()
            + self.render_passes.len()
            + self.framebuffers.len()
            + self.pipelines.len()
            + self.descriptor_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}
