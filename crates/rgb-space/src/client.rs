//! Client notification surface.
//!
//! Notifications are fire-and-forget: a sink queues or forwards them and
//! never reports back. The wire format belongs to the transport layer.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::entity::{ClientId, EntityId};

/// A visibility change a client should apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The client should create its view of `entity`.
    ///
    /// `is_initial` is set only for the client's own entity.
    Create { entity: EntityId, is_initial: bool },
    /// The client should drop its view of `entity`.
    Destroy { entity: EntityId },
}

/// Outgoing side of client replication.
pub trait ClientSink: Send + Sync {
    /// Tell `client` that `entity` appeared.
    fn notify_create(&self, client: ClientId, entity: EntityId, is_initial: bool);

    /// Tell `client` that `entity` disappeared.
    fn notify_destroy(&self, client: ClientId, entity: EntityId);
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClientSink;

impl ClientSink for NullClientSink {
    fn notify_create(&self, _client: ClientId, _entity: EntityId, _is_initial: bool) {}

    fn notify_destroy(&self, _client: ClientId, _entity: EntityId) {}
}

/// In-process per-client queue of pending notifications.
///
/// Cloning shares the queue, so the transport can keep a handle and drain
/// what the world produced.
#[derive(Clone, Default)]
pub struct ClientOutbox {
    inner: Arc<Mutex<HashMap<ClientId, Vec<Notification>>>>,
}

impl ClientOutbox {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending notification for a client.
    pub fn drain(&self, client: ClientId) -> Vec<Notification> {
        self.inner.lock().remove(&client).unwrap_or_default()
    }

    /// Copy of the pending notifications for a client.
    #[must_use]
    pub fn pending(&self, client: ClientId) -> Vec<Notification> {
        self.inner.lock().get(&client).cloned().unwrap_or_default()
    }

    /// Total number of queued notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().values().map(Vec::len).sum()
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, client: ClientId, notification: Notification) {
        self.inner
            .lock()
            .entry(client)
            .or_default()
            .push(notification);
    }
}

impl ClientSink for ClientOutbox {
    fn notify_create(&self, client: ClientId, entity: EntityId, is_initial: bool) {
        self.push(client, Notification::Create { entity, is_initial });
    }

    fn notify_destroy(&self, client: ClientId, entity: EntityId) {
        self.push(client, Notification::Destroy { entity });
    }
}

impl std::fmt::Debug for ClientOutbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOutbox")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_queues_per_client() {
        let outbox = ClientOutbox::new();
        let shared = outbox.clone();

        outbox.notify_create(ClientId(1), EntityId::new(10), false);
        outbox.notify_destroy(ClientId(1), EntityId::new(10));
        outbox.notify_create(ClientId(2), EntityId::new(11), true);

        assert_eq!(shared.len(), 3);
        assert_eq!(
            shared.drain(ClientId(1)),
            vec![
                Notification::Create {
                    entity: EntityId::new(10),
                    is_initial: false,
                },
                Notification::Destroy {
                    entity: EntityId::new(10),
                },
            ]
        );
        assert!(shared.drain(ClientId(1)).is_empty());
        assert_eq!(shared.pending(ClientId(2)).len(), 1);
    }
}
