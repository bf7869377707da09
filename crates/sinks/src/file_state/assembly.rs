//! Write assembly
//!
//! Binds a modulator chain, an optional writer and a fallback route. A batch
//! drained from a [`MessageBatch`](spool_protocol::MessageBatch) passes
//! through [`WriterAssembly::write`] when a writer is bound, or
//! [`WriterAssembly::flush`] when it is not. Every message ends up in exactly
//! one place: the writer, the fallback, or a counted drop/discard.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use spool_protocol::Message;
use spool_transform::{ModulatorChain, Verdict};

use super::FileStateWriter;
use crate::common::FileSinkMetrics;
use crate::util::RateLimitedLogger;

/// Destination for messages the writer could not take
pub type Fallback = Arc<dyn Fn(Message) + Send + Sync>;

/// Writer, modulators and fallback for one file state
pub struct WriterAssembly {
    writer: Option<Box<dyn FileStateWriter>>,
    chain: Arc<ModulatorChain>,
    fallback: Fallback,
    metrics: Arc<FileSinkMetrics>,
    error_logger: RateLimitedLogger,
}

impl WriterAssembly {
    /// Create an assembly without a writer
    pub fn new(
        chain: Arc<ModulatorChain>,
        fallback: Fallback,
        metrics: Arc<FileSinkMetrics>,
    ) -> Self {
        Self {
            writer: None,
            chain,
            fallback,
            metrics,
            error_logger: RateLimitedLogger::default(),
        }
    }

    /// Bind `writer`, returning the previously bound one
    ///
    /// The caller owns the old writer and is responsible for closing it.
    pub fn set_writer(
        &mut self,
        writer: Box<dyn FileStateWriter>,
    ) -> Option<Box<dyn FileStateWriter>> {
        self.writer.replace(writer)
    }

    /// Unbind and return the current writer
    pub fn take_writer(&mut self) -> Option<Box<dyn FileStateWriter>> {
        self.writer.take()
    }

    pub fn writer(&self) -> Option<&dyn FileStateWriter> {
        self.writer.as_deref()
    }

    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// Modulate and write `messages`, diverting failures to the fallback
    ///
    /// Without a bound writer this behaves like [`flush`](Self::flush).
    pub fn write(&mut self, messages: Vec<Message>) {
        self.write_within(messages, None);
    }

    /// Like [`write`](Self::write), but stop once `deadline` has passed
    ///
    /// The deadline is checked before each message. Returns the number of
    /// messages left unprocessed; the caller decides what they count as.
    pub fn write_until(&mut self, messages: Vec<Message>, deadline: Instant) -> usize {
        self.write_within(messages, Some(deadline))
    }

    fn write_within(&mut self, messages: Vec<Message>, deadline: Option<Instant>) -> usize {
        let Some(writer) = self.writer.as_deref_mut() else {
            self.flush(messages);
            return 0;
        };
        let metrics = &*self.metrics;

        let accessible = writer.is_accessible();
        if !accessible {
            self.error_logger.error(
                "writer inaccessible, routing batch to fallback",
                &writer.name(),
            );
        }

        let mut left = 0;
        let mut messages = messages.into_iter();
        while let Some(mut message) = messages.next() {
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                left = 1 + messages.len();
                break;
            }

            match self.chain.modulate(&mut message) {
                Ok(Verdict::Continue) => {}
                Ok(Verdict::Drop) => {
                    metrics.record_dropped();
                    continue;
                }
                Ok(Verdict::Discard) => {
                    metrics.record_discarded();
                    continue;
                }
                Err(e) => {
                    self.error_logger.error_with_data(
                        "modulator failed, routing message to fallback",
                        &e,
                        message.payload(),
                    );
                    divert(&self.fallback, metrics, message);
                    continue;
                }
            }

            if !accessible {
                metrics.record_write_error();
                divert(&self.fallback, metrics, message);
                continue;
            }

            match writer.write_all(message.payload()) {
                Ok(()) => metrics.record_written(message.len() as u64),
                Err(e) => {
                    self.error_logger
                        .error("write failed, routing message to fallback", &e);
                    metrics.record_write_error();
                    divert(&self.fallback, metrics, message);
                }
            }
        }

        if accessible && let Err(e) = writer.flush() {
            self.error_logger.error("failed to flush writer buffer", &e);
            metrics.record_write_error();
        }
        left
    }

    /// Route every message in `messages` to the fallback
    pub fn flush(&mut self, messages: Vec<Message>) {
        if messages.is_empty() {
            return;
        }
        tracing::debug!(
            count = messages.len(),
            "no writer bound, routing batch to fallback"
        );
        for message in messages {
            divert(&self.fallback, &self.metrics, message);
        }
    }
}

impl std::fmt::Debug for WriterAssembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterAssembly")
            .field("writer", &self.writer.as_ref().map(|w| w.name().to_string()))
            .field("modulators", &self.chain.names())
            .finish()
    }
}

#[inline]
fn divert(fallback: &Fallback, metrics: &FileSinkMetrics, message: Message) {
    metrics.record_fallback();
    fallback(message);
}

#[cfg(test)]
#[path = "assembly_test.rs"]
mod tests;
