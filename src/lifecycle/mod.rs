//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Metrics → Credential probe → Engine → Listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown (reason latched)
//! ```
//!
//! # Design Decisions
//! - Fail fast: a credential that cannot produce a token is fatal
//! - Listener binds last (traffic only when ready)
//! - Detached decision cycles are not awaited on shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownReason};
pub use startup::{run, StartupError};
