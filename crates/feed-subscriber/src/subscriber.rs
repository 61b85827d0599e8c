//! # Feed Subscriber
//!
//! Dials publishers over TCP and turns their line-oriented message stream
//! into channels of split messages.

use crate::topics::{split_message, TopicFilter};
use crate::{DEFAULT_CHANNEL_CAPACITY, MAX_LINE_LENGTH, RETRY_INTERVAL};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Errors from subscription operations.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// The publisher could not be reached and retrying was disabled.
    #[error("Can't dial publisher {host}: {source}")]
    Dial {
        /// Publisher address.
        host: String,
        /// Underlying connection error.
        #[source]
        source: std::io::Error,
    },

    /// Shutdown was signalled before the connection was established.
    #[error("Subscription to {host} cancelled")]
    Cancelled {
        /// Publisher address.
        host: String,
    },
}

/// A message tagged with the publisher it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostMessage {
    /// Publisher address.
    pub sender: String,
    /// Message fields.
    pub message: Vec<String>,
}

/// Subscribe to `topics` on the publisher at `host`.
///
/// With `keep_trying`, dialing is retried every [`RETRY_INTERVAL`] until it
/// succeeds or `shutdown` fires; otherwise the first failure is returned.
///
/// The returned channel yields each matching message split into fields and
/// closes when the publisher disconnects or `shutdown` fires.
pub async fn subscribe(
    host: &str,
    topics: TopicFilter,
    keep_trying: bool,
    mut shutdown: watch::Receiver<bool>,
) -> Result<mpsc::Receiver<Vec<String>>, SubscribeError> {
    let stream = dial(host, keep_trying, &mut shutdown).await?;
    info!(host, topics = ?topics.topics, "Subscribed to publisher");

    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    tokio::spawn(read_loop(stream, host.to_string(), topics, tx, shutdown));
    Ok(rx)
}

/// Subscribe to `topics` on every host and merge the streams.
///
/// Each message is tagged with its origin host. Dialing is attempted once per
/// host; the first failure aborts the whole subscription and closes the
/// connections already made. Firing `shutdown` tears down every connection
/// and closes the returned channel.
pub async fn subscribe_multi(
    hosts: &[String],
    topics: TopicFilter,
    mut shutdown: watch::Receiver<bool>,
) -> Result<mpsc::Receiver<HostMessage>, SubscribeError> {
    // Read loops watch `teardown`, which follows `shutdown` once every host
    // is connected and fires on its own if a later dial fails.
    let (teardown_tx, teardown_rx) = watch::channel(false);
    let mut streams = Vec::with_capacity(hosts.len());
    for host in hosts {
        let subscribed = if *shutdown.borrow() {
            Err(SubscribeError::Cancelled { host: host.clone() })
        } else {
            subscribe(host, topics.clone(), false, teardown_rx.clone()).await
        };
        match subscribed {
            Ok(stream) => streams.push((host.clone(), stream)),
            Err(e) => {
                let _ = teardown_tx.send(true);
                debug!(connected = streams.len(), "Closing partial subscription");
                return Err(e);
            }
        }
    }
    drop(teardown_rx);

    tokio::spawn(async move {
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = teardown_tx.closed() => return,
            }
        }
        let _ = teardown_tx.send(true);
    });

    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    for (host, mut stream) in streams {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(message) = stream.recv().await {
                let tagged = HostMessage {
                    sender: host.clone(),
                    message,
                };
                if tx.send(tagged).await.is_err() {
                    break;
                }
            }
            debug!(host = %host, "Host stream ended");
        });
    }
    Ok(rx)
}

async fn dial(
    host: &str,
    keep_trying: bool,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<TcpStream, SubscribeError> {
    loop {
        if *shutdown.borrow() {
            return Err(SubscribeError::Cancelled {
                host: host.to_string(),
            });
        }
        match TcpStream::connect(host).await {
            Ok(stream) => return Ok(stream),
            Err(source) if !keep_trying => {
                return Err(SubscribeError::Dial {
                    host: host.to_string(),
                    source,
                });
            }
            Err(e) => {
                debug!(host, error = %e, "Dial failed, retrying");
                tokio::select! {
                    _ = tokio::time::sleep(RETRY_INTERVAL) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            return Err(SubscribeError::Cancelled { host: host.to_string() });
                        }
                    }
                }
            }
        }
    }
}

/// Read one newline-terminated line into `buf`, terminator excluded.
///
/// At most [`MAX_LINE_LENGTH`] bytes are kept; the rest of the line is
/// consumed and `oversized` is set. A final line without terminator is still
/// returned. `Ok(false)` means the stream ended. Partial progress lives in
/// `buf` and `oversized`, so the future can be dropped and called again.
async fn read_line_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    oversized: &mut bool,
) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(!buf.is_empty());
        }
        let (end, used, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i, i + 1, true),
            None => (available.len(), available.len(), false),
        };
        let room = MAX_LINE_LENGTH.saturating_sub(buf.len());
        if end > room {
            *oversized = true;
        }
        buf.extend_from_slice(&available[..end.min(room)]);
        reader.consume(used);
        if complete {
            return Ok(true);
        }
    }
}

async fn read_loop(
    stream: TcpStream,
    host: String,
    topics: TopicFilter,
    tx: mpsc::Sender<Vec<String>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut oversized = false;
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            read = read_line_capped(&mut reader, &mut buf, &mut oversized) => match read {
                Ok(true) => {
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    buf.clear();
                    if std::mem::take(&mut oversized) {
                        warn!(host = %host, limit = MAX_LINE_LENGTH, "Dropping oversized line");
                        continue;
                    }
                    if line.is_empty() || !topics.matches(&line) {
                        continue;
                    }
                    if tx.send(split_message(&line)).await.is_err() {
                        break;
                    }
                }
                Ok(false) => {
                    debug!(host = %host, "Publisher closed the connection");
                    break;
                }
                Err(e) => {
                    warn!(host = %host, error = %e, "Receive failed");
                    break;
                }
            }
        }
    }
    debug!(host = %host, "Subscription closed");
}
