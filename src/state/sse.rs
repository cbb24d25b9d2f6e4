use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::sse::ServerEvent;

/// Per-session registry of realtime hubs.
///
/// Each session gets its own broadcast channel, created lazily on the first
/// subscribe or publish and dropped when the session is purged. Publishing to
/// a session nobody listens to is a silent no-op.
pub struct SseState {
    hubs: DashMap<Uuid, Arc<SseHub>>,
    capacity: usize,
}

impl SseState {
    /// Build the registry with a per-hub channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            hubs: DashMap::new(),
            capacity,
        }
    }

    /// Hub for the given session, created on demand.
    pub fn hub(&self, session_id: Uuid) -> Arc<SseHub> {
        self.hubs
            .entry(session_id)
            .or_insert_with(|| Arc::new(SseHub::new(self.capacity)))
            .clone()
    }

    /// Drop the hub for a purged session, disconnecting its subscribers.
    pub fn remove(&self, session_id: Uuid) {
        self.hubs.remove(&session_id);
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
