//! In-memory writer and fallback collector for file state tests

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use spool_protocol::Message;

use super::{Fallback, FileStateWriter};

#[derive(Debug)]
struct Recorded {
    data: Vec<u8>,
    writes: usize,
    flushes: usize,
    closes: usize,
    accessible: bool,
    size_override: Option<u64>,
    fail_containing: Option<Vec<u8>>,
    fail_flush: bool,
    fail_close: bool,
    write_delay: Duration,
}

/// Shared view into a [`MemoryWriter`], usable after the writer was moved
#[derive(Debug, Clone)]
pub(crate) struct WriterProbe {
    inner: Arc<Mutex<Recorded>>,
}

impl WriterProbe {
    pub(crate) fn data(&self) -> Vec<u8> {
        self.inner.lock().data.clone()
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().data).into_owned()
    }

    pub(crate) fn writes(&self) -> usize {
        self.inner.lock().writes
    }

    pub(crate) fn flushes(&self) -> usize {
        self.inner.lock().flushes
    }

    pub(crate) fn closes(&self) -> usize {
        self.inner.lock().closes
    }

    pub(crate) fn set_accessible(&self, accessible: bool) {
        self.inner.lock().accessible = accessible;
    }

    pub(crate) fn set_size(&self, size: u64) {
        self.inner.lock().size_override = Some(size);
    }

    /// Fail every write whose buffer contains `needle`
    pub(crate) fn fail_writes_containing(&self, needle: &str) {
        self.inner.lock().fail_containing = Some(needle.as_bytes().to_vec());
    }

    pub(crate) fn fail_flush(&self) {
        self.inner.lock().fail_flush = true;
    }

    pub(crate) fn fail_close(&self) {
        self.inner.lock().fail_close = true;
    }

    /// Sleep for `delay` on every write
    pub(crate) fn set_write_delay(&self, delay: Duration) {
        self.inner.lock().write_delay = delay;
    }
}

/// Writer keeping everything in memory
#[derive(Debug)]
pub(crate) struct MemoryWriter {
    name: String,
    inner: Arc<Mutex<Recorded>>,
}

impl MemoryWriter {
    pub(crate) fn new(name: &str) -> (Self, WriterProbe) {
        let inner = Arc::new(Mutex::new(Recorded {
            data: Vec::new(),
            writes: 0,
            flushes: 0,
            closes: 0,
            accessible: true,
            size_override: None,
            fail_containing: None,
            fail_flush: false,
            fail_close: false,
            write_delay: Duration::ZERO,
        }));
        let writer = Self {
            name: name.to_string(),
            inner: Arc::clone(&inner),
        };
        (writer, WriterProbe { inner })
    }

    pub(crate) fn boxed(name: &str) -> (Box<dyn FileStateWriter>, WriterProbe) {
        let (writer, probe) = Self::new(name);
        (Box::new(writer), probe)
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let delay = self.inner.lock().write_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut inner = self.inner.lock();
        if let Some(needle) = &inner.fail_containing
            && buf.windows(needle.len()).any(|w| w == needle.as_slice())
        {
            return Err(io::Error::other("injected write failure"));
        }
        inner.writes += 1;
        inner.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.flushes += 1;
        if inner.fail_flush {
            return Err(io::Error::other("injected flush failure"));
        }
        Ok(())
    }
}

impl FileStateWriter for MemoryWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        let inner = self.inner.lock();
        inner.size_override.unwrap_or(inner.data.len() as u64)
    }

    fn is_accessible(&self) -> bool {
        self.inner.lock().accessible
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.closes += 1;
        if inner.fail_close {
            return Err(io::Error::other("injected close failure"));
        }
        Ok(())
    }
}

/// Fallback collecting every routed message
pub(crate) fn collecting_fallback() -> (Fallback, Arc<Mutex<Vec<Message>>>) {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let fallback: Fallback = Arc::new(move |message: Message| sink.lock().push(message));
    (fallback, collected)
}

/// Payloads of collected messages as strings
pub(crate) fn payloads(messages: &Mutex<Vec<Message>>) -> Vec<String> {
    messages
        .lock()
        .iter()
        .map(|m| String::from_utf8_lossy(m.payload()).into_owned())
        .collect()
}
