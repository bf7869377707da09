//! Tests for the write assembly

use super::*;
use crate::file_state::test_writer::{MemoryWriter, collecting_fallback, payloads};
use spool_transform::{
    EnvelopeConfig, EnvelopeFormatter, Formatter, Modulator, RegexFilter, RegexFilterConfig,
    TransformError, TransformResult,
};

struct RejectContaining(&'static str);

impl Formatter for RejectContaining {
    fn format(&self, message: &mut Message) -> TransformResult<()> {
        if String::from_utf8_lossy(message.payload()).contains(self.0) {
            return Err(TransformError::format_failed("reject", "poisoned payload"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "reject"
    }
}

fn msgs(payloads: &[&'static str]) -> Vec<Message> {
    payloads.iter().map(|p| Message::new(*p, "test")).collect()
}

type Collected = Arc<parking_lot::Mutex<Vec<Message>>>;

fn assembly(chain: ModulatorChain) -> (WriterAssembly, Collected, Arc<FileSinkMetrics>) {
    let (fallback, collected) = collecting_fallback();
    let metrics = Arc::new(FileSinkMetrics::new());
    (
        WriterAssembly::new(Arc::new(chain), fallback, Arc::clone(&metrics)),
        collected,
        metrics,
    )
}

// =============================================================================
// Writer binding
// =============================================================================

#[test]
fn test_new_assembly_has_no_writer() {
    let (assembly, _, _) = assembly(ModulatorChain::empty());
    assert!(!assembly.has_writer());
    assert!(assembly.writer().is_none());
}

#[test]
fn test_set_writer_returns_previous() {
    let (mut assembly, _, _) = assembly(ModulatorChain::empty());
    let (first, _) = MemoryWriter::boxed("first");
    let (second, _) = MemoryWriter::boxed("second");

    assert!(assembly.set_writer(first).is_none());
    let previous = assembly.set_writer(second).unwrap();

    assert_eq!(previous.name(), "first");
    assert_eq!(assembly.writer().unwrap().name(), "second");
}

#[test]
fn test_take_writer_unbinds() {
    let (mut assembly, _, _) = assembly(ModulatorChain::empty());
    let (writer, _) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    assert_eq!(assembly.take_writer().unwrap().name(), "w");
    assert!(!assembly.has_writer());
}

// =============================================================================
// Write path
// =============================================================================

#[test]
fn test_write_in_order_and_flushes_buffer() {
    let (mut assembly, collected, metrics) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    assembly.write(msgs(&["a\n", "b\n", "c\n"]));

    assert_eq!(probe.text(), "a\nb\nc\n");
    assert_eq!(probe.flushes(), 1);
    assert!(collected.lock().is_empty());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.messages_written, 3);
    assert_eq!(snapshot.bytes_written, 6);
}

#[test]
fn test_write_applies_formatters() {
    let chain = ModulatorChain::new(vec![Modulator::formatter(EnvelopeFormatter::new(
        EnvelopeConfig::new().with_prefix("> "),
    ))]);
    let (mut assembly, _, _) = assembly(chain);
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    assembly.write(msgs(&["one", "two"]));

    assert_eq!(probe.text(), "> one\n> two\n");
}

#[test]
fn test_failed_write_goes_to_fallback_only() {
    let (mut assembly, collected, metrics) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    probe.fail_writes_containing("bad");
    assembly.set_writer(writer);

    assembly.write(msgs(&["ok-1\n", "bad\n", "ok-2\n"]));

    assert_eq!(probe.text(), "ok-1\nok-2\n");
    assert_eq!(payloads(&collected), vec!["bad\n"]);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.messages_written, 2);
    assert_eq!(snapshot.messages_fallback, 1);
    assert_eq!(snapshot.write_errors, 1);
}

#[test]
fn test_inaccessible_writer_diverts_whole_batch() {
    let (mut assembly, collected, metrics) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    probe.set_accessible(false);
    assembly.set_writer(writer);

    assembly.write(msgs(&["a", "b"]));

    assert_eq!(probe.writes(), 0);
    assert_eq!(probe.flushes(), 0);
    assert_eq!(payloads(&collected), vec!["a", "b"]);
    assert_eq!(metrics.snapshot().messages_fallback, 2);
}

#[test]
fn test_drop_and_discard_are_skipped() {
    let drop_b = RegexFilterConfig::new()
        .with_expression_not("^b")
        .unwrap()
        .with_on_reject(Verdict::Drop);
    let discard_c = RegexFilterConfig::new().with_expression_not("^c").unwrap();
    let on_reject_drop = drop_b.on_reject;
    let chain = ModulatorChain::new(vec![
        Modulator::filter_with(RegexFilter::new(drop_b), on_reject_drop),
        Modulator::filter(RegexFilter::new(discard_c)),
    ]);
    let (mut assembly, collected, metrics) = assembly(chain);
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    assembly.write(msgs(&["a\n", "b\n", "c\n", "d\n"]));

    assert_eq!(probe.text(), "a\nd\n");
    assert!(collected.lock().is_empty());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.messages_dropped, 1);
    assert_eq!(snapshot.messages_discarded, 1);
    assert_eq!(snapshot.messages_written, 2);
}

#[test]
fn test_formatter_error_routes_message_to_fallback() {
    let chain = ModulatorChain::new(vec![Modulator::formatter(RejectContaining("poison"))]);
    let (mut assembly, collected, _) = assembly(chain);
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    assembly.write(msgs(&["fine\n", "poison\n"]));

    assert_eq!(probe.text(), "fine\n");
    assert_eq!(payloads(&collected), vec!["poison\n"]);
}

#[test]
fn test_buffer_flush_failure_is_counted_not_rerouted() {
    let (mut assembly, collected, metrics) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    probe.fail_flush();
    assembly.set_writer(writer);

    assembly.write(msgs(&["a\n"]));

    assert_eq!(probe.text(), "a\n");
    assert!(collected.lock().is_empty());
    assert_eq!(metrics.snapshot().write_errors, 1);
}

#[test]
fn test_write_until_stops_at_deadline() {
    let (mut assembly, fallback, metrics) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    probe.set_write_delay(std::time::Duration::from_millis(30));
    assembly.set_writer(writer);

    let deadline = Instant::now() + std::time::Duration::from_millis(10);
    let left = assembly.write_until(msgs(&["a", "b", "c", "d"]), deadline);

    assert_eq!(left, 3);
    assert_eq!(probe.text(), "a");
    assert_eq!(probe.flushes(), 1);
    assert!(fallback.lock().is_empty());
    assert_eq!(metrics.snapshot().messages_written, 1);
}

#[test]
fn test_write_until_past_deadline_writes_nothing() {
    let (mut assembly, fallback, _) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    let left = assembly.write_until(msgs(&["a", "b"]), Instant::now());

    assert_eq!(left, 2);
    assert_eq!(probe.writes(), 0);
    assert!(fallback.lock().is_empty());
}

#[test]
fn test_write_until_with_time_left_writes_all() {
    let (mut assembly, _, _) = assembly(ModulatorChain::empty());
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    let deadline = Instant::now() + std::time::Duration::from_secs(5);
    let left = assembly.write_until(msgs(&["a", "b"]), deadline);

    assert_eq!(left, 0);
    assert_eq!(probe.text(), "ab");
}

#[test]
fn test_write_without_writer_uses_fallback() {
    let (mut assembly, collected, _) = assembly(ModulatorChain::empty());

    assembly.write(msgs(&["a", "b"]));

    assert_eq!(payloads(&collected), vec!["a", "b"]);
}

// =============================================================================
// Flush path
// =============================================================================

#[test]
fn test_flush_routes_everything_to_fallback() {
    let chain = ModulatorChain::new(vec![Modulator::formatter(EnvelopeFormatter::new(
        EnvelopeConfig::new().with_prefix("> "),
    ))]);
    let (mut assembly, collected, metrics) = assembly(chain);
    let (writer, probe) = MemoryWriter::boxed("w");
    assembly.set_writer(writer);

    assembly.flush(msgs(&["a", "b", "c"]));

    // Unmodulated, untouched writer
    assert_eq!(payloads(&collected), vec!["a", "b", "c"]);
    assert_eq!(probe.writes(), 0);
    assert_eq!(metrics.snapshot().messages_fallback, 3);
}

#[test]
fn test_flush_empty_batch_is_noop() {
    let (mut assembly, collected, metrics) = assembly(ModulatorChain::empty());
    assembly.flush(Vec::new());
    assert!(collected.lock().is_empty());
    assert_eq!(metrics.snapshot().messages_fallback, 0);
}
