use tracing::{debug, info};

use visor_core::ResourceGraph;

use crate::command_buffer::CommandBuffer;
use crate::error::SubmitError;
use crate::executor::Executor;
use crate::rasterizer::Rasterizer;

/// One batch of command buffers, executed in order.
#[derive(Debug, Clone, Default)]
pub struct SubmitInfo<'a> {
    pub command_buffers: Vec<&'a CommandBuffer>,
}

impl<'a> SubmitInfo<'a> {
    pub fn new(command_buffers: impl IntoIterator<Item = &'a CommandBuffer>) -> Self {
        Self {
            command_buffers: command_buffers.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitReport {
    /// Command buffers replayed to completion
    pub command_buffers: usize,
    /// Records executed across all buffers
    pub records: usize,
}

/// Synchronous submission queue. `submit` returns only after every
/// referenced command stream has been replayed.
pub struct Queue<R: Rasterizer> {
    executor: Executor<R>,
    submit_count: u64,
}

impl<R: Rasterizer> Queue<R> {
    pub fn new(executor: Executor<R>) -> Self {
        Self {
            executor,
            submit_count: 0,
        }
    }

    pub fn executor(&self) -> &Executor<R> {
        &self.executor
    }

    /// Number of `submit` calls made on this queue.
    pub fn submit_count(&self) -> u64 {
        self.submit_count
    }

    /// Replay every command buffer of every submission, strictly in order.
    ///
    /// Stops at the first buffer that fails; buffers replayed before it keep
    /// their effects and later ones are never decoded.
    pub fn submit(
        &mut self,
        resources: &mut ResourceGraph,
        submits: &[SubmitInfo<'_>],
    ) -> Result<SubmitReport, SubmitError> {
        self.submit_count += 1;
        let mut report = SubmitReport::default();

        for (submission, info) in submits.iter().enumerate() {
            debug!(
                "submission {}: {} command buffer(s)",
                submission,
                info.command_buffers.len()
            );

            for (buffer, cb) in info.command_buffers.iter().enumerate() {
                if !cb.is_executable() {
                    return Err(SubmitError::NotExecutable {
                        submission,
                        buffer,
                        state: cb.state(),
                    });
                }

                let outcome = self
                    .executor
                    .replay(resources, cb.stream())
                    .map_err(|source| SubmitError::Replay {
                        submission,
                        buffer,
                        source,
                    })?;

                report.command_buffers += 1;
                report.records += outcome.records;
            }
        }

        info!(
            "queue submit #{} complete: {} command buffer(s), {} record(s)",
            self.submit_count, report.command_buffers, report.records
        );
        Ok(report)
    }
}
