//! Serve - read stdin into the file sink until EOF or Ctrl-C

use std::sync::Arc;

use anyhow::{Context, Result};
use spool_config::{Config, ModulatorInstanceConfig};
use spool_protocol::{Message, StreamId};
use spool_sinks::{Fallback, FileSink, FileSinkHandle};
use spool_transform::default_registry;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Wire stdin, the modulator chain and the file sink together and run them
pub async fn run(config: Config, stream_override: Option<String>) -> Result<()> {
    // Lines from stdin carry no terminator, so an unconfigured chain
    // re-adds one
    let modulators = if config.modulators.is_empty() {
        vec![ModulatorInstanceConfig::new("envelope")]
    } else {
        config.modulators.clone()
    };
    let chain = default_registry()
        .build_chain(&modulators)
        .context("failed to build modulator chain")?;
    info!(modulators = ?chain.names(), "modulator chain built");

    let (fallback, fallback_task) = stderr_fallback();
    let (tx, rx) = mpsc::channel(config.sink.channel_size);
    let sink = FileSink::from_config(&config.sink, Arc::new(chain), fallback, rx)
        .context("failed to create file sink")?;
    let handle = sink.handle();
    let sink_task = tokio::spawn(sink.run());

    #[cfg(unix)]
    spawn_rotate_on_hangup(handle.clone())?;

    let stream = StreamId::new(stream_override.unwrap_or(config.input.stream));
    info!(sink = handle.name(), stream = %stream, "reading stdin");

    let reader = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = forward_lines(reader, tx, stream) => {
            let lines = result?;
            info!(lines, "end of input, draining");
        }
        _ = wait_for_shutdown() => info!("shutdown signal received, draining"),
    }

    let snapshot = sink_task.await.context("file sink task failed")?;
    if let Err(e) = fallback_task.await {
        error!(error = %e, "fallback writer task failed");
    }

    info!(
        received = snapshot.messages_received,
        written = snapshot.messages_written,
        bytes = snapshot.bytes_written,
        dropped = snapshot.messages_dropped,
        discarded = snapshot.messages_discarded,
        fallback = snapshot.messages_fallback,
        lost = snapshot.messages_lost,
        rotations = snapshot.rotations,
        "spool stopped"
    );
    Ok(())
}

/// Send every line of `reader` as a message on `stream`
///
/// Lines are split on `\n` with a trailing `\r\n` or `\n` removed. Returns
/// the number of forwarded lines.
async fn forward_lines<R>(mut reader: R, tx: mpsc::Sender<Message>, stream: StreamId) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut count = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("failed to read input")?;
        if read == 0 {
            break;
        }

        let line = trim_line_end(&buf).to_vec();
        if tx.send(Message::new(line, stream.clone())).await.is_err() {
            warn!("file sink stopped, no longer reading input");
            break;
        }
        count += 1;
    }

    Ok(count)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Fallback writing each message as a line on stderr
///
/// The task ends once the sink drops the last handle to the fallback.
fn stderr_fallback() -> (Fallback, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let task = tokio::spawn(async move {
        let mut stderr = tokio::io::stderr();
        while let Some(message) = rx.recv().await {
            let mut line = message.payload().to_vec();
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }
            if let Err(e) = stderr.write_all(&line).await {
                error!(error = %e, "failed to write fallback message to stderr");
            }
        }
        let _ = stderr.flush().await;
    });

    let fallback: Fallback = Arc::new(move |message: Message| {
        if tx.send(message).is_err() {
            error!("fallback writer stopped, message lost");
        }
    });
    (fallback, task)
}

#[cfg(unix)]
fn spawn_rotate_on_hangup(handle: FileSinkHandle) -> Result<()> {
    let mut hangup = signal::unix::signal(signal::unix::SignalKind::hangup())
        .context("failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!(sink = handle.name(), "SIGHUP: rotating files");
            handle.rotate();
        }
    });
    info!("SIGHUP handler installed for forced rotation");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
