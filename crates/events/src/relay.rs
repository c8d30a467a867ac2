//! In-process fan-out of order events to connected displays.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::message::{ClientMessage, OrderEvent};
use crate::topic::Topic;

/// Serialized outbound text frame.
pub type Frame = String;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl core::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Receiving half handed to the task that owns the socket.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub frames: mpsc::UnboundedReceiver<Frame>,
}

#[derive(Debug, Default)]
struct Registry {
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<Frame>>,
    groups: HashMap<Topic, BTreeSet<ConnectionId>>,
}

impl Registry {
    fn join(&mut self, id: ConnectionId, topic: Topic) -> bool {
        if !self.senders.contains_key(&id) {
            return false;
        }
        self.groups.entry(topic).or_default().insert(id)
    }

    /// Join a specific group. The first specific subscription takes the
    /// connection out of the shared group, so it only hears its own orders.
    fn narrow(&mut self, id: ConnectionId, topic: Topic) -> bool {
        if !self.join(id, topic) {
            return false;
        }
        if let Some(shared) = self.groups.get_mut(&Topic::Orders) {
            shared.remove(&id);
            if shared.is_empty() {
                self.groups.remove(&Topic::Orders);
            }
        }
        true
    }

    fn remove(&mut self, id: ConnectionId) {
        self.senders.remove(&id);
        self.groups.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
    }
}

/// Group registry plus per-connection channels.
///
/// - No persistence and no replay
/// - A publish reaches each connection at most once, however many of the
///   target groups it belongs to
/// - Per-connection delivery order equals publish order
/// - Lock poisoning degrades to "nothing delivered"
/// - A specific order or payment subscription leaves the shared `orders` group
#[derive(Debug)]
pub struct OrderRelay {
    enabled: AtomicBool,
    next_id: AtomicU64,
    registry: Mutex<Registry>,
}

impl Default for OrderRelay {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OrderRelay {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            next_id: AtomicU64::new(1),
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Register a connection; it joins [`Topic::Orders`] immediately.
    pub fn connect(&self) -> Connection {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();

        if let Ok(mut registry) = self.registry.lock() {
            registry.senders.insert(id, tx);
            registry.join(id, Topic::Orders);
        }

        tracing::info!(connection = %id, "relay connection opened");
        Connection { id, frames: rx }
    }

    /// Handle a text frame from a client. Returns the group joined, if any.
    pub fn handle_client_text(&self, id: ConnectionId, text: &str) -> Option<Topic> {
        let topic = ClientMessage::parse(text)?.topic()?;
        self.subscribe(id, topic.clone()).then_some(topic)
    }

    /// Add a connection to a group. `false` for unknown connections.
    ///
    /// Joining an order or payment group leaves [`Topic::Orders`].
    pub fn subscribe(&self, id: ConnectionId, topic: Topic) -> bool {
        let Ok(mut registry) = self.registry.lock() else {
            return false;
        };
        if !registry.senders.contains_key(&id) {
            return false;
        }
        if topic == Topic::Orders {
            registry.join(id, Topic::Orders);
        } else {
            registry.narrow(id, topic.clone());
        }
        tracing::debug!(connection = %id, topic = %topic, "relay subscription added");
        true
    }

    /// Remove a connection from every group it joined.
    pub fn disconnect(&self, id: ConnectionId) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.remove(id);
        }
        tracing::info!(connection = %id, "relay connection closed");
    }

    /// Fan an event out to its groups. Returns the number of connections
    /// the frame was handed to.
    pub fn publish(&self, event: &OrderEvent) -> usize {
        if !self.is_enabled() {
            return 0;
        }

        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(error = %err, kind = event.kind(), "failed to encode order event");
                return 0;
            }
        };

        let delivered = self.publish_to(&event.topics(), frame);
        tracing::debug!(
            kind = event.kind(),
            order = event.order_key().as_deref().unwrap_or("-"),
            delivered,
            "order event published"
        );
        delivered
    }

    /// Deliver a raw frame to the union of the given groups.
    pub fn publish_to(&self, topics: &[Topic], frame: Frame) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        let Ok(mut registry) = self.registry.lock() else {
            return 0;
        };

        let targets: BTreeSet<ConnectionId> = topics
            .iter()
            .filter_map(|topic| registry.groups.get(topic))
            .flatten()
            .copied()
            .collect();

        let mut delivered = 0;
        let mut dead = Vec::new();
        for id in targets {
            match registry.senders.get(&id) {
                Some(tx) if tx.send(frame.clone()).is_ok() => delivered += 1,
                _ => dead.push(id),
            }
        }

        for id in dead {
            tracing::debug!(connection = %id, "pruning closed relay connection");
            registry.remove(id);
        }

        delivered
    }

    pub fn connection_count(&self) -> usize {
        self.registry.lock().map(|r| r.senders.len()).unwrap_or(0)
    }

    /// Current members of a group, in connection order.
    pub fn members(&self, topic: &Topic) -> Vec<ConnectionId> {
        match self.registry.lock() {
            Ok(registry) => registry
                .groups
                .get(topic)
                .map(|m| m.iter().copied().collect())
                .unwrap_or_default(),
            Err(_) => vec![],
        }
    }
}
