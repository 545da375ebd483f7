use tracing::{trace, warn};

use visor_core::ResourceGraph;
use visor_protocol::commands::ClearColor;
use visor_protocol::Handle;

use crate::error::ReplayError;
use crate::state::GpuState;

/// Pixel-level backend invoked by the replay engine.
pub trait Rasterizer {
    /// Fill every pixel of `target` with `color`.
    fn clear_target(
        &mut self,
        resources: &mut ResourceGraph,
        target: Handle,
        color: ClearColor,
    ) -> Result<(), ReplayError>;

    /// Rasterize `count` vertices (or indices, when `indexed`) starting at
    /// `first`, using the bindings in `state`.
    fn draw_triangles(
        &mut self,
        resources: &mut ResourceGraph,
        state: &GpuState,
        count: u32,
        first: u32,
        indexed: bool,
    ) -> Result<(), ReplayError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &mut R {
    fn clear_target(
        &mut self,
        resources: &mut ResourceGraph,
        target: Handle,
        color: ClearColor,
    ) -> Result<(), ReplayError> {
        (**self).clear_target(resources, target, color)
    }

    fn draw_triangles(
        &mut self,
        resources: &mut ResourceGraph,
        state: &GpuState,
        count: u32,
        first: u32,
        indexed: bool,
    ) -> Result<(), ReplayError> {
        (**self).draw_triangles(resources, state, count, first, indexed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub clears: u64,
    pub draw_calls: u64,
    pub triangles: u64,
    /// Draws that arrived with no render target bound
    pub dropped_draws: u64,
}

/// CPU backend. Clears are written to the target's pixel storage; draws are
/// validated and counted.
#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    stats: RasterStats,
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RasterStats {
        self.stats
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn clear_target(
        &mut self,
        resources: &mut ResourceGraph,
        target: Handle,
        color: ClearColor,
    ) -> Result<(), ReplayError> {
        let image = resources.image_mut(target)?;
        let rgba = color.to_unorm8();

        let bpp = image.bytes_per_pixel as usize;
        if bpp == 0 {
            return Err(ReplayError::Raster(format!(
                "target {} has zero-byte pixels",
                target
            )));
        }

        if bpp == 4 && image.pixels.len() % 4 == 0 {
            let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(image.pixels.as_mut_slice());
            pixels.fill(rgba);
        } else {
            let n = bpp.min(4);
            for px in image.pixels.chunks_exact_mut(bpp) {
                px[..n].copy_from_slice(&rgba[..n]);
            }
        }

        self.stats.clears += 1;
        trace!("cleared {} to {:?}", target, rgba);
        Ok(())
    }

    fn draw_triangles(
        &mut self,
        resources: &mut ResourceGraph,
        state: &GpuState,
        count: u32,
        first: u32,
        indexed: bool,
    ) -> Result<(), ReplayError> {
        let Some(target) = state.target else {
            warn!("draw of {} vertices with no render target bound, dropped", count);
            self.stats.dropped_draws += 1;
            return Ok(());
        };
        resources.image(target)?;
        if indexed && state.index_buffer.buffer.is_none() {
            return Err(ReplayError::Raster(
                "indexed draw with no index buffer bound".to_string(),
            ));
        }

        self.stats.draw_calls += 1;
        self.stats.triangles += u64::from(count / 3);
        trace!(
            "draw {} {} from {} into {}",
            count,
            if indexed { "indices" } else { "vertices" },
            first,
            target
        );
        Ok(())
    }
}
