pub mod command_buffer;
pub mod error;
pub mod executor;
pub mod queue;
pub mod rasterizer;
pub mod state;

pub use command_buffer::{CommandBuffer, CommandBufferState};
pub use error::{RecordError, ReplayError, SubmitError};
pub use executor::{Executor, ReplayOutcome};
pub use queue::{Queue, SubmitInfo, SubmitReport};
pub use rasterizer::{RasterStats, Rasterizer, SoftwareRasterizer};
pub use state::GpuState;
