use std::{sync::mpsc::Sender, sync::Arc, time::Duration};

use tokio::{
    runtime::Handle,
    sync::watch,
    time::{self, Instant, MissedTickBehavior},
};

use crate::domain::message::Message;

use super::load_messages::{load_messages, ConversationKey, LoadMessagesError, MessagesSource};

const THREAD_POLLER_STARTED: &str = "THREAD_POLLER_STARTED";
const THREAD_POLLER_STOPPED: &str = "THREAD_POLLER_STOPPED";
const THREAD_POLLER_RECEIVER_GONE: &str = "THREAD_POLLER_RECEIVER_GONE";

/// One poll result, tagged with the thread it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRefresh {
    pub generation: u64,
    pub other_user_email: String,
    pub result: Result<Vec<Message>, LoadMessagesError>,
}

/// The open thread a poller keeps fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub key: ConversationKey,
    pub generation: u64,
}

/// Stops the poller when cancelled or dropped.
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: Option<watch::Sender<bool>>,
}

impl PollHandle {
    pub fn cancel(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }

    /// True until cancelled or until the poll task has exited on its own.
    pub fn is_active(&self) -> bool {
        self.stop_tx
            .as_ref()
            .is_some_and(|stop_tx| !stop_tx.is_closed())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Re-fetches the thread every `interval` and reports over `refresh_tx`.
/// The first fetch happens one interval after start; opening a thread already
/// loads it once.
pub struct ThreadPoller;

impl ThreadPoller {
    pub fn start<S>(
        runtime: &Handle,
        source: Arc<S>,
        target: PollTarget,
        interval: Duration,
        refresh_tx: Sender<ThreadRefresh>,
    ) -> PollHandle
    where
        S: MessagesSource + Send + Sync + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);

        tracing::debug!(
            code = THREAD_POLLER_STARTED,
            generation = target.generation,
            interval_ms = interval.as_millis() as u64,
            "thread poller started"
        );
        runtime.spawn(run_poller(source, target, interval, refresh_tx, stop_rx));

        PollHandle {
            stop_tx: Some(stop_tx),
        }
    }
}

async fn run_poller<S>(
    source: Arc<S>,
    target: PollTarget,
    interval: Duration,
    refresh_tx: Sender<ThreadRefresh>,
    mut stop_rx: watch::Receiver<bool>,
) where
    S: MessagesSource + Send + Sync + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let result = load_messages(source.as_ref(), &target.key).await;
                if *stop_rx.borrow() {
                    break;
                }

                let refresh = ThreadRefresh {
                    generation: target.generation,
                    other_user_email: target.key.other_user_email.clone(),
                    result,
                };
                if refresh_tx.send(refresh).is_err() {
                    tracing::debug!(
                        code = THREAD_POLLER_RECEIVER_GONE,
                        "thread poller has no receiver left"
                    );
                    break;
                }
            }
        }
    }

    tracing::debug!(
        code = THREAD_POLLER_STOPPED,
        generation = target.generation,
        "thread poller stopped"
    );
}
