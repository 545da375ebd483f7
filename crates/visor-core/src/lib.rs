pub mod arena;
pub mod config;
pub mod error;
pub mod pixmap;
pub mod resources;

pub use arena::ResourceArena;
pub use config::{RenderPassScope, VisorConfig};
pub use error::{CoreError, ResourceError};
pub use resources::{
    Buffer, ColorAttachment, DescriptorSet, Framebuffer, Image, Pipeline, RenderPass,
    ResourceGraph, Subpass,
};
