//! Publisher feed monitor.
//!
//! Subscribes to the configured publishers and logs every matching message
//! with its origin host. Messages on the ledger topics are decoded and, once
//! a dispatch handle is attached, submitted to the dispatch service.

use crate::container::config::FeedConfig;
use crate::wiring::ledger_feed::parse_ledger_event;
use cn_02_dispatcher::DispatchHandle;
use feed_subscriber::{subscribe_multi, HostMessage, SubscribeError, TopicFilter};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Running subscription to every configured publisher.
pub struct FeedMonitor {
    messages: mpsc::Receiver<HostMessage>,
    dispatch: Option<DispatchHandle>,
}

impl FeedMonitor {
    /// Dial every host in `config`; fails if any of them is unreachable.
    pub async fn connect(
        config: &FeedConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, SubscribeError> {
        let topics = TopicFilter::new(config.topics.iter().cloned());
        let messages = subscribe_multi(&config.hosts, topics, shutdown).await?;
        info!(hosts = ?config.hosts, "Feed monitor connected");
        Ok(Self {
            messages,
            dispatch: None,
        })
    }

    /// Submit decoded ledger events to the service behind `handle`.
    pub fn with_dispatch(mut self, handle: DispatchHandle) -> Self {
        self.dispatch = Some(handle);
        self
    }

    /// Process messages until every publisher disconnects or shutdown fires.
    ///
    /// Returns the number of messages seen.
    pub async fn run(mut self) -> u64 {
        let mut seen = 0u64;
        let mut forwarded = 0u64;
        while let Some(HostMessage { sender, message }) = self.messages.recv().await {
            seen += 1;
            let topic = message.first().map(String::as_str).unwrap_or_default();
            debug!(host = %sender, topic, fields = message.len().saturating_sub(1), "Feed message");

            let event = match parse_ledger_event(&message) {
                Ok(Some(event)) => event,
                Ok(None) => {
                    info!(host = %sender, topic, fields = ?message.get(1..).unwrap_or(&[]), "Feed message");
                    continue;
                }
                Err(e) => {
                    warn!(host = %sender, topic, error = %e, "Malformed ledger message");
                    continue;
                }
            };
            let Some(handle) = &self.dispatch else {
                debug!(kind = event.kind(), "No dispatch service, ledger event dropped");
                continue;
            };
            if let Err(e) = handle.submit(event).await {
                warn!(error = %e, "Dispatch service gone, ledger events no longer forwarded");
                self.dispatch = None;
                continue;
            }
            forwarded += 1;
        }
        info!(messages = seen, forwarded, "Feed monitor stopped");
        seen
    }
}
