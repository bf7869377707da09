//! Message - Payload plus routing metadata
//!
//! A `Message` is owned by a `MessageBatch` until a drain hands it to a
//! writer. Modulators may replace the payload in place.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::stream::StreamId;

/// A single message flowing through the node
#[derive(Debug, Clone)]
pub struct Message {
    /// Raw payload bytes
    payload: Bytes,

    /// Stream the message is currently routed to
    stream: StreamId,

    /// Stream the message was first produced on
    origin: StreamId,

    /// Creation time
    created: DateTime<Utc>,
}

impl Message {
    /// Create a message on `stream`
    ///
    /// The origin stream is the same as the destination stream until the
    /// message is re-routed with [`Message::set_stream`].
    pub fn new(payload: impl Into<Bytes>, stream: impl Into<StreamId>) -> Self {
        let stream = stream.into();
        Self {
            payload: payload.into(),
            origin: stream.clone(),
            stream,
            created: Utc::now(),
        }
    }

    /// Builder-style variant of [`Message::set_stream`]
    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<StreamId>) -> Self {
        self.stream = stream.into();
        self
    }

    /// Payload as a byte slice
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload as shared bytes
    #[inline]
    pub fn payload_bytes(&self) -> &Bytes {
        &self.payload
    }

    /// Replace the payload
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    /// Replace the payload with an empty one
    pub fn clear_payload(&mut self) {
        self.payload = Bytes::new();
    }

    /// Destination stream
    #[inline]
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }

    /// Re-route the message, keeping its origin
    pub fn set_stream(&mut self, stream: impl Into<StreamId>) {
        self.stream = stream.into();
    }

    /// Stream the message was produced on
    #[inline]
    pub fn origin(&self) -> &StreamId {
        &self.origin
    }

    /// Creation time
    #[inline]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Payload length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Consume the message, returning its payload
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}
