//! Shutdown coordination.
//!
//! The first trigger wins and its reason is latched. Waiters that subscribe
//! after the trigger still observe it, so a signal arriving while the
//! listener is being bound is not lost.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Why the service is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM, sent by the host when recycling the instance.
    Terminate,
    /// Triggered from code.
    Requested,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => write!(f, "interrupt"),
            ShutdownReason::Terminate => write!(f, "terminate"),
            ShutdownReason::Requested => write!(f, "requested"),
        }
    }
}

/// Coordinator for graceful shutdown. Clones share the same state.
#[derive(Debug, Clone)]
pub struct Shutdown {
    state: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
        }
    }

    /// Latch `reason`. Returns false when shutdown was already triggered.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    /// The latched reason, if shutdown has been triggered.
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.state.borrow()
    }

    /// Resolve once shutdown is triggered, immediately if it already was.
    pub async fn wait(&self) -> ShutdownReason {
        let mut rx = self.state.subscribe();
        let latched = match rx.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        latched.unwrap_or(ShutdownReason::Requested)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
