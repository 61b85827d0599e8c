//! # Dispatch Service
//!
//! Drives a [`DispatchApi`] from a queue of ledger events. Each event is
//! handled on its own task; no event waits for another, and a per-service
//! semaphore bounds how many run at once.

use crate::domain::{DispatchConfig, DispatchError, LedgerEvent};
use crate::ports::inbound::DispatchApi;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Sending side of the event queue.
#[derive(Clone, Debug)]
pub struct DispatchHandle {
    sender: mpsc::Sender<LedgerEvent>,
}

impl DispatchHandle {
    /// Queue an event, waiting for room if the queue is full.
    pub async fn submit(&self, event: LedgerEvent) -> Result<(), DispatchError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| DispatchError::ServiceStopped)
    }

    /// Queue an event if there is room right now.
    pub fn try_submit(&self, event: LedgerEvent) -> Result<(), DispatchError> {
        self.sender
            .try_send(event)
            .map_err(|_| DispatchError::ServiceStopped)
    }
}

/// Event loop feeding ledger events to a dispatcher.
pub struct DispatchService<D: ?Sized> {
    dispatcher: Arc<D>,
    events: mpsc::Receiver<LedgerEvent>,
    shutdown: watch::Receiver<bool>,
    permits: Arc<Semaphore>,
}

impl<D: DispatchApi + ?Sized + 'static> DispatchService<D> {
    /// Create the service and the handle used to feed it.
    pub fn new(
        dispatcher: Arc<D>,
        config: &DispatchConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(Self, DispatchHandle), DispatchError> {
        config.validate()?;
        let (sender, events) = mpsc::channel(config.event_buffer);
        let service = Self {
            dispatcher,
            events,
            shutdown,
            permits: Arc::new(Semaphore::new(config.max_concurrent_events)),
        };
        Ok((service, DispatchHandle { sender }))
    }

    /// Run until every handle is dropped or shutdown is signalled.
    ///
    /// Dispatches already started finish before returning. An event still
    /// waiting for a permit when shutdown fires is dropped. Returns the
    /// number of events dispatched.
    pub async fn run(mut self) -> u64 {
        info!("Dispatch service started");
        let mut tasks = JoinSet::new();
        let mut accepted = 0u64;

        if *self.shutdown.borrow() {
            info!("Dispatch service stopped before start");
            return 0;
        }

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Dispatch task failed");
                    }
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        info!("Ledger event queue closed");
                        break;
                    };
                    let permit = tokio::select! {
                        permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break,
                        },
                        _ = wait_for_shutdown(&mut self.shutdown) => {
                            info!(kind = event.kind(), "Shutdown while waiting for a dispatch slot");
                            break;
                        }
                    };
                    accepted += 1;
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tasks.spawn(async move {
                        let kind = event.kind();
                        let outcome = dispatcher.dispatch(event);
                        debug!(kind, ?outcome, "Ledger event dispatched");
                        drop(permit);
                    });
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Dispatch task failed");
            }
        }
        info!(events = accepted, "Dispatch service stopped");
        accepted
    }
}

/// Resolves once shutdown is signalled or its sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
