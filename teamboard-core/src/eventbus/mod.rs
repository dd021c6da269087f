//! src/eventbus/mod.rs
//!
//! Holds the live [`Snapshot`] and fans every new one out to the open
//! streaming clients.
//!
//! - Each subscriber owns an unbounded `mpsc` receiver. A send only fails
//!   once that receiver is closed or dropped, which is how a disconnected
//!   client is detected and removed.
//! - Snapshot replacement and fan-out happen under one lock, so a client
//!   subscribing concurrently with a publish sees either the old snapshot
//!   followed by the new one, or only the new one.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures_util::stream::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use teamboard_common::models::Snapshot;

pub type SubscriberId = u64;

/// Serialized snapshot as written to subscribers.
pub type Payload = Arc<str>;

struct HubState {
    snapshot: Arc<Snapshot>,
    payload: Option<Payload>,
    subscribers: HashMap<SubscriberId, UnboundedSender<Payload>>,
    next_id: SubscriberId,
}

#[derive(Clone)]
pub struct BroadcastHub {
    state: Arc<Mutex<HubState>>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                snapshot: Arc::new(Snapshot::default()),
                payload: None,
                subscribers: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Replaces the current snapshot and writes it to every subscriber,
    /// dropping the ones whose write fails.
    pub fn publish(&self, snapshot: Snapshot) {
        let payload: Option<Payload> = match serde_json::to_string(&snapshot) {
            Ok(json) => Some(json.into()),
            Err(e) => {
                error!("(BroadcastHub) failed to serialize snapshot: {e}");
                None
            }
        };

        let mut state = self.state.lock();
        state.snapshot = Arc::new(snapshot);
        state.payload = payload.clone();

        let Some(payload) = payload else {
            return;
        };
        state.subscribers.retain(|id, tx| match tx.send(payload.clone()) {
            Ok(()) => true,
            Err(_) => {
                debug!("(BroadcastHub) subscriber {id} disconnected, dropping");
                false
            }
        });
    }

    /// Registers a new subscriber. If something has been published already,
    /// the current snapshot is queued for it straight away.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();

        let id = state.next_id;
        state.next_id += 1;

        if state.snapshot.is_published() {
            if let Some(payload) = state.payload.clone() {
                let _ = tx.send(payload);
            }
        }
        state.subscribers.insert(id, tx);
        debug!("(BroadcastHub) subscriber {id} connected ({} open)", state.subscribers.len());

        Subscription {
            id,
            receiver: rx,
            hub: Arc::downgrade(&self.state),
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        remove_subscriber(&self.state, id);
    }

    /// Last published snapshot, or the empty default before the first publish.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.state.lock().snapshot.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }
}

fn remove_subscriber(state: &Mutex<HubState>, id: SubscriberId) {
    if state.lock().subscribers.remove(&id).is_some() {
        debug!("(BroadcastHub) subscriber {id} unsubscribed");
    }
}

/// Receiving side of one subscriber handle.
///
/// Dropping it unsubscribes from the hub.
pub struct Subscription {
    id: SubscriberId,
    receiver: UnboundedReceiver<Payload>,
    hub: Weak<Mutex<HubState>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<Payload> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Payload> {
        self.receiver.try_recv().ok()
    }

    /// Stops accepting writes without unsubscribing; the hub notices on its
    /// next publish.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Stream for Subscription {
    type Item = Payload;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            remove_subscriber(&state, self.id);
        }
    }
}
