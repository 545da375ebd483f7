//! Shared fixtures for runtime integration tests.

#![allow(dead_code)]

use visor_core::{Buffer, Framebuffer, Image, Pipeline, RenderPass, ResourceGraph};
use visor_protocol::commands::ClearColor;
use visor_protocol::Handle;
use visor_runtime::{GpuState, Rasterizer, ReplayError};

pub const SIZE: u32 = 4;
pub const RED: ClearColor = ClearColor::rgba(1.0, 0.0, 0.0, 1.0);

/// What the replay engine asked the rasterizer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterCall {
    Clear {
        target: Handle,
        color: ClearColor,
    },
    Draw {
        target: Option<Handle>,
        pipeline: Option<Handle>,
        vertex_buffer: Option<Handle>,
        count: u32,
        first: u32,
        indexed: bool,
    },
}

/// Rasterizer that records every call and touches no pixels.
#[derive(Debug, Default)]
pub struct RecordingRasterizer {
    pub calls: Vec<RasterCall>,
}

impl Rasterizer for RecordingRasterizer {
    fn clear_target(
        &mut self,
        _resources: &mut ResourceGraph,
        target: Handle,
        color: ClearColor,
    ) -> Result<(), ReplayError> {
        self.calls.push(RasterCall::Clear { target, color });
        Ok(())
    }

    fn draw_triangles(
        &mut self,
        _resources: &mut ResourceGraph,
        state: &GpuState,
        count: u32,
        first: u32,
        indexed: bool,
    ) -> Result<(), ReplayError> {
        self.calls.push(RasterCall::Draw {
            target: state.target,
            pipeline: state.pipeline,
            vertex_buffer: state.vertex_buffers[0].buffer,
            count,
            first,
            indexed,
        });
        Ok(())
    }
}

/// A single-attachment render setup.
pub struct Scene {
    pub resources: ResourceGraph,
    pub target: Handle,
    pub render_pass: Handle,
    pub framebuffer: Handle,
    pub pipeline: Handle,
    pub vertices: Handle,
}

impl Scene {
    pub fn new(clear_on_load: bool) -> Self {
        let mut resources = ResourceGraph::new();
        let target = resources.create_image(Image::new(SIZE, SIZE, 4));
        let render_pass = resources.create_render_pass(RenderPass::single_color(0, clear_on_load));
        let framebuffer = resources.create_framebuffer(Framebuffer {
            attachments: vec![target],
        });
        let pipeline = resources.create_pipeline(Pipeline {
            label: "test".to_string(),
        });
        let vertices = resources.create_buffer(Buffer::new(36 * 12));
        Self {
            resources,
            target,
            render_pass,
            framebuffer,
            pipeline,
            vertices,
        }
    }

    pub fn area(&self) -> visor_protocol::commands::Rect2D {
        visor_protocol::commands::Rect2D {
            offset: [0, 0],
            extent: [SIZE, SIZE],
        }
    }
}
