//! Registry of open client connections.
//!
//! The server registers every accepted socket here and unregisters it when
//! the connection task finishes. A fatal fault drains the registry with
//! [`ConnectionManager::destroy_all`], which cancels each connection's
//! [`CancellationToken`] so its task drops the socket.
//!
//! Every open connection has exactly one entry until it is unregistered or
//! destroyed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Locally generated identifier of a tracked connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl core::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct TrackedConnection {
    peer: Option<SocketAddr>,
    token: CancellationToken,
}

/// Tracks open connections for the lifetime of one server.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    next_id: AtomicU64,
    open: Mutex<HashMap<ConnectionId, TrackedConnection>>,
    drained: Notify,
}

impl ConnectionManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly opened connection. Cancelling `token` must close it.
    pub fn register(&self, peer: Option<SocketAddr>, token: CancellationToken) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.open
            .lock()
            .insert(id, TrackedConnection { peer, token });
        debug!(connection = %id, ?peer, "socket opened");
        id
    }

    /// Stop tracking a closed connection. Returns `false` if it was already
    /// gone (for instance, destroyed).
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, now_empty) = {
            let mut open = self.open.lock();
            let removed = open.remove(&id).is_some();
            (removed, open.is_empty())
        };
        if removed {
            debug!(connection = %id, "socket closed");
        }
        if now_empty {
            self.drained.notify_waiters();
        }
        removed
    }

    /// Forcibly close every tracked connection. Returns how many were
    /// destroyed.
    pub fn destroy_all(&self) -> usize {
        let drained: Vec<_> = self.open.lock().drain().collect();
        for (id, conn) in &drained {
            conn.token.cancel();
            debug!(connection = %id, peer = ?conn.peer, "socket destroyed");
        }
        self.drained.notify_waiters();
        drained.len()
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.open.lock().len()
    }

    /// Whether no connections are open.
    pub fn is_empty(&self) -> bool {
        self.open.lock().is_empty()
    }

    /// Wait until every connection has closed, or `timeout` elapses.
    /// Returns whether the registry drained in time.
    pub async fn wait_until_empty(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(tokio::time::Instant::now);
        loop {
            let notified = self.drained.notified();
            if self.is_empty() {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.is_empty();
            }
        }
    }
}
