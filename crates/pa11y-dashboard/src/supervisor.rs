//! Shutdown requests from the fault handler to the serve loop.
//!
//! The fault handler never stops the process itself. It files a
//! [`ShutdownRequest`] here and the serve loop in [`crate::server`] decides
//! how to wind down. Requests only ever escalate: a teardown is never
//! replaced by a restart.

use tokio::sync::watch;

/// What the serve loop should do after a fatal route failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownRequest {
    /// Stop accepting, let open connections drain briefly, then exit
    /// non-zero so a process supervisor restarts the dashboard.
    Restart {
        /// Message of the failure that triggered the request.
        reason: String,
    },
    /// Stop accepting, destroy every open connection immediately, then exit
    /// non-zero.
    Teardown {
        /// Message of the failure that triggered the request.
        reason: String,
    },
}

impl ShutdownRequest {
    const fn severity(&self) -> u8 {
        match self {
            Self::Restart { .. } => 1,
            Self::Teardown { .. } => 2,
        }
    }

    /// Message of the failure that triggered the request.
    pub fn reason(&self) -> &str {
        match self {
            Self::Restart { reason } | Self::Teardown { reason } => reason,
        }
    }
}

/// Holds the most severe pending [`ShutdownRequest`].
#[derive(Debug)]
pub struct Supervisor {
    tx: watch::Sender<Option<ShutdownRequest>>,
}

impl Supervisor {
    /// Create a supervisor with nothing requested.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// File a request. Ignored if an equal or more severe one is pending.
    pub fn request(&self, request: ShutdownRequest) {
        self.tx.send_if_modified(|current| {
            if current
                .as_ref()
                .is_some_and(|pending| pending.severity() >= request.severity())
            {
                return false;
            }
            *current = Some(request);
            true
        });
    }

    /// The pending request, if any.
    pub fn requested(&self) -> Option<ShutdownRequest> {
        self.tx.borrow().clone()
    }

    /// Watch for requests.
    pub fn subscribe(&self) -> watch::Receiver<Option<ShutdownRequest>> {
        self.tx.subscribe()
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restart() -> ShutdownRequest {
        ShutdownRequest::Restart {
            reason: "boom".to_owned(),
        }
    }

    fn teardown() -> ShutdownRequest {
        ShutdownRequest::Teardown {
            reason: "socket hang up".to_owned(),
        }
    }

    #[test]
    fn starts_empty() {
        assert_eq!(Supervisor::new().requested(), None);
    }

    #[test]
    fn teardown_overrides_restart() {
        let supervisor = Supervisor::new();
        supervisor.request(restart());
        supervisor.request(teardown());
        assert_eq!(supervisor.requested(), Some(teardown()));
    }

    #[test]
    fn restart_never_downgrades_teardown() {
        let supervisor = Supervisor::new();
        supervisor.request(teardown());
        supervisor.request(restart());
        assert_eq!(supervisor.requested(), Some(teardown()));
        assert_eq!(
            supervisor.requested().map(|r| r.reason().to_owned()).as_deref(),
            Some("socket hang up")
        );
    }

    #[tokio::test]
    async fn subscribers_are_woken() {
        let supervisor = Supervisor::new();
        let mut rx = supervisor.subscribe();
        supervisor.request(restart());
        assert!(rx.changed().await.is_ok());
        assert_eq!(*rx.borrow_and_update(), Some(restart()));
    }
}
