//! File state
//!
//! One destination's batch, write assembly and creation time. The state is
//! `Empty` until a writer is bound, `Active` while it has one and `Closed`
//! once [`FileState::close`] consumed it.
//!
//! ```text
//! producer --try_enqueue--> [MessageBatch] --flush--> [WriterAssembly] --> writer
//!                                                            \--> fallback
//! ```

mod assembly;
mod rotation;
mod writer;

pub use assembly::{Fallback, WriterAssembly};
pub use rotation::{RotateAt, RotationPolicy, needs_rotate};
pub use writer::FileStateWriter;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use spool_protocol::{CloseOutcome, MessageBatch};
use spool_transform::ModulatorChain;

use crate::common::{FileSinkMetrics, Result};

#[cfg(test)]
pub(crate) mod test_writer;

#[cfg(test)]
#[path = "file_state_test.rs"]
mod tests;

/// Batch, writer and rotation bookkeeping for one destination
#[derive(Debug)]
pub struct FileState {
    batch: Arc<MessageBatch>,
    assembly: WriterAssembly,
    file_created: Option<DateTime<Local>>,

    /// Upper bound for `close`, including the final drain
    flush_timeout: Duration,

    metrics: Arc<FileSinkMetrics>,
}

impl FileState {
    /// Create an empty state with a batch of `max_count` messages
    pub fn new(
        max_count: usize,
        chain: Arc<ModulatorChain>,
        fallback: Fallback,
        flush_timeout: Duration,
        metrics: Arc<FileSinkMetrics>,
    ) -> Self {
        Self {
            batch: Arc::new(MessageBatch::new(max_count)),
            assembly: WriterAssembly::new(chain, fallback, Arc::clone(&metrics)),
            file_created: None,
            flush_timeout,
            metrics,
        }
    }

    /// Bind a writer created at `created`
    ///
    /// A previously bound writer is closed first; a failure there is logged
    /// and does not prevent the new writer from becoming current.
    pub fn bind_writer(&mut self, writer: Box<dyn FileStateWriter>, created: DateTime<Local>) {
        if let Some(previous) = self.assembly.set_writer(writer) {
            let name = previous.name().to_string();
            if let Err(e) = previous.close() {
                self.metrics.record_write_error();
                tracing::error!(writer = %name, error = %e, "failed to close replaced writer");
            }
        }
        self.file_created = Some(created);
    }

    /// Shared handle to the batch producers append to
    pub fn batch(&self) -> &Arc<MessageBatch> {
        &self.batch
    }

    pub fn writer_name(&self) -> Option<&str> {
        self.assembly.writer().map(|w| w.name())
    }

    pub fn file_created(&self) -> Option<DateTime<Local>> {
        self.file_created
    }

    /// Whether a writer is bound
    pub fn is_active(&self) -> bool {
        self.assembly.has_writer()
    }

    /// Drain the batch into the writer, or into the fallback without one
    ///
    /// Returns the number of drained messages.
    pub fn flush(&mut self) -> usize {
        let assembly = &mut self.assembly;
        let drained = if assembly.has_writer() {
            self.batch.flush(|messages| assembly.write(messages))
        } else {
            self.batch.flush(|messages| assembly.flush(messages))
        };

        if drained > 0 {
            self.metrics.record_flush();
        }
        drained
    }

    /// Check the rotation rules against the current local time
    pub fn needs_rotate(&self, policy: &RotationPolicy, force: bool) -> Result<bool> {
        self.needs_rotate_at(policy, force, &Local::now())
    }

    /// Check the rotation rules against `now`
    pub fn needs_rotate_at(
        &self,
        policy: &RotationPolicy,
        force: bool,
        now: &DateTime<Local>,
    ) -> Result<bool> {
        match (self.assembly.writer(), self.file_created.as_ref()) {
            (Some(writer), Some(created)) => {
                needs_rotate(Some(writer), policy, created, force, now)
            }
            _ => needs_rotate(None, policy, now, force, now),
        }
    }

    /// Close the batch, drain what is left and close the writer
    ///
    /// Waiting for a running flush and the final drain together take at
    /// most the flush timeout; messages not written by then are counted as
    /// lost. The writer is closed whether or not the drain completed.
    pub fn close(mut self) -> Result<CloseOutcome> {
        let assembly = &mut self.assembly;
        let outcome = if assembly.has_writer() {
            self.batch.close(
                |messages, deadline| assembly.write_until(messages, deadline),
                self.flush_timeout,
            )
        } else {
            self.batch.close(
                |messages, _| {
                    assembly.flush(messages);
                    0
                },
                self.flush_timeout,
            )
        };

        if outcome.drained > 0 {
            self.metrics.record_flush();
        }

        let name = self.writer_name().map(str::to_string);
        if outcome.lost > 0 {
            self.metrics.record_lost(outcome.lost as u64);
            tracing::warn!(
                writer = name.as_deref().unwrap_or("<none>"),
                lost = outcome.lost,
                timeout = ?self.flush_timeout,
                "close timed out before draining, messages lost"
            );
        }

        if let Some(writer) = self.assembly.take_writer() {
            if let Err(e) = writer.close() {
                self.metrics.record_write_error();
                tracing::error!(
                    writer = name.as_deref().unwrap_or("<none>"),
                    error = %e,
                    "failed to close writer"
                );
                return Err(e.into());
            }
            tracing::debug!(
                writer = name.as_deref().unwrap_or("<none>"),
                drained = outcome.drained,
                "file state closed"
            );
        }

        Ok(outcome)
    }
}
