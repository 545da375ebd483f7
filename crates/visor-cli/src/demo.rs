//! Offscreen rendition of the textured-cube test frame.

use anyhow::Context;
use tracing::info;

use visor_core::pixmap;
use visor_core::{
    Buffer, DescriptorSet, Framebuffer, Image, Pipeline, RenderPass, ResourceGraph, VisorConfig,
};
use visor_protocol::commands::{BufferImageCopy, ClearColor, Rect2D, Viewport};
use visor_protocol::wire::{self, CaptureOptions};
use visor_runtime::{CommandBuffer, Executor, Queue, SoftwareRasterizer, SubmitInfo};

const CLEAR_COLOR: ClearColor = ClearColor::rgba(1.0, 0.0, 0.0, 1.0);

pub struct DemoOptions {
    pub texture: Option<String>,
    pub output: String,
    pub capture: Option<String>,
    pub size: u32,
}

pub fn run_demo(config: &VisorConfig, opts: &DemoOptions) -> anyhow::Result<()> {
    let mut resources = ResourceGraph::new();

    let target = resources.create_image(Image::new(opts.size, opts.size, 4));
    let render_pass = resources.create_render_pass(RenderPass::single_color(0, true));
    let framebuffer = resources.create_framebuffer(Framebuffer {
        attachments: vec![target],
    });
    let pipeline = resources.create_pipeline(Pipeline {
        label: "textured-cube".to_string(),
    });
    let vertices = cube_vertices();
    let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
    let vertex_buffer = resources.create_buffer(Buffer::from_bytes(vertex_bytes));

    // Texture upload goes in its own command buffer, submitted ahead of the frame
    let mut upload = CommandBuffer::new();
    upload.begin()?;
    let mut descriptor_set = None;
    if let Some(path) = &opts.texture {
        let texture = pixmap::load_pixmap(path, config.pixmap.max_dimension)
            .with_context(|| format!("loading texture {}", path))?;
        let (width, height) = (texture.width, texture.height);
        let staging = resources.create_buffer(Buffer::from_bytes(texture.rgba));
        let image = resources.create_image(Image::new(width, height, 4));
        descriptor_set = Some(resources.create_descriptor_set(DescriptorSet {
            images: vec![image],
        }));
        upload.cmd_copy_buffer_to_image(staging, image, BufferImageCopy::tight(width, height))?;
    }
    upload.end()?;

    let mut frame = CommandBuffer::new();
    frame.begin()?;
    frame.cmd_begin_render_pass(
        render_pass,
        framebuffer,
        Rect2D {
            offset: [0, 0],
            extent: [opts.size, opts.size],
        },
        CLEAR_COLOR,
    )?;
    frame.cmd_bind_pipeline(pipeline)?;
    if let Some(set) = descriptor_set {
        frame.cmd_bind_descriptor_sets(set)?;
    }
    frame.cmd_bind_vertex_buffer(0, vertex_buffer, 0)?;
    frame.cmd_set_viewport(Viewport {
        x: 0.0,
        y: 0.0,
        width: opts.size as f32,
        height: opts.size as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    })?;
    frame.cmd_set_scissor(Rect2D {
        offset: [0, 0],
        extent: [opts.size, opts.size],
    })?;
    frame.cmd_draw(vertices.len() as u32, 0)?;
    frame.cmd_end_render_pass()?;
    frame.end()?;

    let executor = Executor::from_config(SoftwareRasterizer::new(), &config.replay);
    let mut queue = Queue::new(executor);
    let report = queue.submit(
        &mut resources,
        &[SubmitInfo::new([&upload]), SubmitInfo::new([&frame])],
    )?;
    let stats = queue.executor().rasterizer().stats();
    info!(
        "frame replayed: {} record(s), {} clear(s), {} triangle(s)",
        report.records, stats.clears, stats.triangles
    );

    pixmap::save_ppm(&opts.output, resources.image(target)?)
        .with_context(|| format!("writing {}", opts.output))?;
    println!("wrote {}", opts.output);

    if let Some(path) = &opts.capture {
        let options = CaptureOptions {
            compress: config.capture.compress,
            compression_threshold: config.capture.compression_threshold,
        };
        let bytes = wire::encode_capture(frame.stream(), frame.record_count(), options)?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path))?;
        println!("wrote {} ({} records)", path, frame.record_count());
    }

    Ok(())
}

/// 36 positions: two triangles per face of the unit cube centred on the origin.
fn cube_vertices() -> Vec<[f32; 3]> {
    // (axis, sign) for each face
    const FACES: [(usize, f32); 6] = [
        (0, -1.0),
        (0, 1.0),
        (1, -1.0),
        (1, 1.0),
        (2, -1.0),
        (2, 1.0),
    ];
    const QUAD: [(f32, f32); 6] = [
        (-1.0, -1.0),
        (1.0, -1.0),
        (1.0, 1.0),
        (-1.0, -1.0),
        (1.0, 1.0),
        (-1.0, 1.0),
    ];

    let mut out = Vec::with_capacity(FACES.len() * QUAD.len());
    for (axis, sign) in FACES {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        for (a, b) in QUAD {
            let mut p = [0.0f32; 3];
            p[axis] = sign;
            p[u] = a;
            p[v] = b;
            out.push(p);
        }
    }
    out
}
