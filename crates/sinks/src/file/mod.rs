//! File Sink - Batched, rotating file output
//!
//! Keeps one [`FileState`] per resolved output path. Each incoming message
//! is checked against the rotation policy, appended to its state's batch and
//! flushed once the batch reaches its flush threshold. A ticker flushes and
//! re-checks rotation on the batch timeout, and a [`FileSinkHandle`] can
//! force a rotation at any time.
//!
//! # Directory Structure
//!
//! ```text
//! path = "logs/*.log", rotation enabled, compress = true
//!
//! logs/
//! ├── api_2025-01-15_09.log.lz4   # rotated away and compressed
//! ├── api_2025-01-15_10.log       # active
//! └── worker_2025-01-15_10.log    # active
//! ```
//!
//! # Failure Handling
//!
//! A message that cannot reach a file (rotation check against an
//! unreachable file, a file that cannot be opened, a failed write) goes to
//! the fallback. Lost messages only occur when a close times out.

mod config;
pub mod naming;

pub use config::FileConfig;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use spool_config::FileSinkConfig;
use spool_protocol::{Message, Rejected};
use spool_transform::ModulatorChain;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::common::{FileSinkMetrics, MetricsSnapshot, Result};
use crate::file_state::{Fallback, FileState};
use crate::util::{DiskWriter, RateLimitedLogger, compress_file};

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

/// Handle for interacting with a running [`FileSink`]
///
/// Stays valid after `run()` consumed the sink.
#[derive(Debug, Clone)]
pub struct FileSinkHandle {
    name: String,
    metrics: Arc<FileSinkMetrics>,
    rotate_signal: Arc<Notify>,
}

impl FileSinkHandle {
    /// Ask the sink to rotate every open file
    ///
    /// Has no effect while rotation is disabled.
    pub fn rotate(&self) {
        self.rotate_signal.notify_one();
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Rotating file sink
pub struct FileSink {
    receiver: mpsc::Receiver<Message>,
    config: FileConfig,
    chain: Arc<ModulatorChain>,
    fallback: Fallback,

    /// One state per resolved output path
    states: HashMap<PathBuf, FileState>,

    name: String,
    metrics: Arc<FileSinkMetrics>,
    rotate_signal: Arc<Notify>,

    /// Background compression of rotated files
    compressions: JoinSet<()>,

    /// Rate-limited logger for rotation failures
    rotation_logger: RateLimitedLogger,
}

impl FileSink {
    /// Create a new file sink
    pub fn new(
        config: FileConfig,
        chain: Arc<ModulatorChain>,
        fallback: Fallback,
        receiver: mpsc::Receiver<Message>,
    ) -> Self {
        Self::with_name(config, chain, fallback, receiver, "file")
    }

    /// Create a new file sink with a custom name
    pub fn with_name(
        config: FileConfig,
        chain: Arc<ModulatorChain>,
        fallback: Fallback,
        receiver: mpsc::Receiver<Message>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            receiver,
            config,
            chain,
            fallback,
            states: HashMap::new(),
            name: name.into(),
            metrics: Arc::new(FileSinkMetrics::new()),
            rotate_signal: Arc::new(Notify::new()),
            compressions: JoinSet::new(),
            rotation_logger: RateLimitedLogger::default(),
        }
    }

    /// Build a sink from its file configuration
    pub fn from_config(
        config: &FileSinkConfig,
        chain: Arc<ModulatorChain>,
        fallback: Fallback,
        receiver: mpsc::Receiver<Message>,
    ) -> Result<Self> {
        let file_config = FileConfig::try_from(config)?;
        Ok(Self::with_name(
            file_config,
            chain,
            fallback,
            receiver,
            config.name.clone(),
        ))
    }

    /// Get a handle for forced rotation and metrics
    pub fn handle(&self) -> FileSinkHandle {
        FileSinkHandle {
            name: self.name.clone(),
            metrics: Arc::clone(&self.metrics),
            rotate_signal: Arc::clone(&self.rotate_signal),
        }
    }

    pub fn metrics(&self) -> &FileSinkMetrics {
        &self.metrics
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the sink until the channel closes, then close every file
    pub async fn run(mut self) -> MetricsSnapshot {
        tracing::info!(
            sink = %self.name,
            path = %self.config.path.display(),
            rotation = self.config.rotation.enabled,
            "file sink starting"
        );

        let mut flush_ticker = tokio::time::interval(self.config.batch_timeout);
        flush_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        flush_ticker.tick().await;

        let mut metrics_ticker = tokio::time::interval(self.config.metrics_interval);
        metrics_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        metrics_ticker.tick().await;

        let rotate_signal = Arc::clone(&self.rotate_signal);

        loop {
            tokio::select! {
                message = self.receiver.recv() => match message {
                    Some(message) => self.write_message(message),
                    None => break,
                },
                _ = flush_ticker.tick() => self.on_flush_tick(),
                _ = rotate_signal.notified() => self.rotate_all(),
                _ = metrics_ticker.tick() => self.report_metrics(),
            }
        }

        self.shutdown().await;

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            received = snapshot.messages_received,
            written = snapshot.messages_written,
            bytes = snapshot.bytes_written,
            fallback = snapshot.messages_fallback,
            lost = snapshot.messages_lost,
            rotations = snapshot.rotations,
            "file sink shutting down"
        );

        snapshot
    }

    /// Rotation check, append and flush-on-pressure for one message
    fn write_message(&mut self, message: Message) {
        self.metrics.record_received();
        let path = naming::resolve_path(&self.config.path, message.stream());

        if let Err(e) = self.ensure_current(&path, false) {
            self.rotation_logger
                .warn("rotation check failed, routing message to fallback", &e);
            self.divert(message);
            return;
        }

        let Some(state) = self.states.get_mut(&path) else {
            self.divert(message);
            return;
        };

        if let Some(message) = append(state, message, self.config.batch_flush_count) {
            self.divert(message);
        }
    }

    /// Rotate the state for `path` if the policy asks for it
    ///
    /// A missing state counts as "no writer bound" and is always opened.
    fn ensure_current(&mut self, path: &Path, force: bool) -> Result<()> {
        if let Some(state) = self.states.get(path)
            && !state.needs_rotate(&self.config.rotation, force)?
        {
            return Ok(());
        }
        self.rotate(path)
    }

    /// Close the current state for `path` and open the next file
    fn rotate(&mut self, path: &Path) -> Result<()> {
        if let Some(previous) = self.states.remove(path) {
            let rotated = previous.writer_name().map(PathBuf::from);
            match previous.close() {
                Ok(outcome) => tracing::info!(
                    sink = %self.name,
                    file = %rotated.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
                    drained = outcome.drained,
                    lost = outcome.lost,
                    "rotated file"
                ),
                Err(e) => tracing::error!(
                    sink = %self.name,
                    error = %e,
                    "failed to close rotated file"
                ),
            }
            self.metrics.record_rotation();

            if self.config.rotation.compress
                && let Some(rotated) = rotated
            {
                self.spawn_compression(rotated);
            }
        }

        let now = Local::now();
        let file_path = naming::next_file_path(path, &self.config.rotation, &now)?;
        let writer = DiskWriter::open(&file_path, self.config.buffer_size)?;

        let mut state = FileState::new(
            self.config.batch_max_count,
            Arc::clone(&self.chain),
            Arc::clone(&self.fallback),
            self.config.batch_timeout,
            Arc::clone(&self.metrics),
        );
        state.bind_writer(Box::new(writer), now);

        tracing::info!(sink = %self.name, file = %file_path.display(), "opened file");
        self.states.insert(path.to_path_buf(), state);
        Ok(())
    }

    fn spawn_compression(&mut self, path: PathBuf) {
        let sink = self.name.clone();
        self.compressions.spawn_blocking(move || match compress_file(&path) {
            Ok(target) => tracing::info!(
                sink = %sink,
                file = %target.display(),
                "compressed rotated file"
            ),
            Err(e) => tracing::error!(
                sink = %sink,
                file = %path.display(),
                error = %e,
                "failed to compress rotated file"
            ),
        });
    }

    /// Flush every state and re-check its rotation
    fn on_flush_tick(&mut self) {
        let paths: Vec<PathBuf> = self.states.keys().cloned().collect();
        for path in paths {
            if let Err(e) = self.ensure_current(&path, false) {
                self.rotation_logger.warn("rotation check failed", &e);
            }
            if let Some(state) = self.states.get_mut(&path) {
                state.flush();
            }
        }
    }

    fn rotate_all(&mut self) {
        if !self.config.rotation.enabled {
            tracing::info!(sink = %self.name, "rotation requested but disabled, ignoring");
            return;
        }

        tracing::info!(sink = %self.name, files = self.states.len(), "forced rotation");
        let paths: Vec<PathBuf> = self.states.keys().cloned().collect();
        for path in paths {
            if let Err(e) = self.ensure_current(&path, true) {
                self.rotation_logger.warn("forced rotation failed", &e);
            }
        }
    }

    fn report_metrics(&self) {
        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            files = self.states.len(),
            received = snapshot.messages_received,
            written = snapshot.messages_written,
            bytes = snapshot.bytes_written,
            dropped = snapshot.messages_dropped,
            discarded = snapshot.messages_discarded,
            fallback = snapshot.messages_fallback,
            errors = snapshot.write_errors,
            "file sink metrics"
        );
    }

    async fn shutdown(&mut self) {
        for (path, state) in self.states.drain() {
            if let Err(e) = state.close() {
                tracing::error!(
                    sink = %self.name,
                    path = %path.display(),
                    error = %e,
                    "failed to close file"
                );
            }
        }

        while let Some(result) = self.compressions.join_next().await {
            if let Err(e) = result {
                tracing::error!(sink = %self.name, error = %e, "compression task failed");
            }
        }
    }

    fn divert(&self, message: Message) {
        self.metrics.record_fallback();
        (self.fallback)(message);
    }
}

/// Append `message`, flushing on pressure
///
/// Returns the message if it could not be queued.
fn append(state: &mut FileState, message: Message, flush_count: usize) -> Option<Message> {
    let rejected = match state.batch().try_enqueue(message) {
        Ok(()) => None,
        Err(Rejected::Full(message)) => {
            state.flush();
            state
                .batch()
                .try_enqueue(message)
                .err()
                .map(Rejected::into_message)
        }
        Err(Rejected::Closed(message)) => Some(message),
    };

    if state.batch().len() >= flush_count {
        state.flush();
    }
    rejected
}
