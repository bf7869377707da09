//! Spool Protocol - Core types that flow through a spool node
//!
//! This crate provides the foundational types shared by every other crate:
//! - `Message` - Payload bytes plus routing metadata
//! - `StreamId` - Stream identification for routing and file naming
//! - `MessageBatch` - Bounded, concurrency-safe message queue with
//!   atomic drain and timeout-bounded close
//!
//! # Design Principles
//!
//! - **Cheap clones**: Payloads use `bytes::Bytes`, stream names are `Arc<str>`
//! - **Single drain**: A flushed message is visible to exactly one drain call
//! - **Backpressure**: Producers see `Rejected::Full` or block, never grow the batch

mod batch;
mod message;
mod stream;

pub use batch::{CloseOutcome, MessageBatch, Rejected};
pub use message::Message;
pub use stream::StreamId;

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Default number of messages a batch holds before producers see backpressure
pub const DEFAULT_BATCH_CAPACITY: usize = 8192;

#[cfg(test)]
mod message_test;
#[cfg(test)]
mod stream_test;
