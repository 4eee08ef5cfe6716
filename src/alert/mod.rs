//! Inbound alert subsystem.
//!
//! # Data Flow
//! ```text
//! POST body (common alert schema JSON)
//!     → model.rs (serde decode into AlertPayload)
//!     → parser.rs (monitorCondition must be "Fired")
//!     → identity.rs (first alertTargetIDs entry → ResourceIdentity)
//!     → handed to the breaker subsystem
//! ```
//!
//! # Design Decisions
//! - Only the first target ID is authoritative
//! - A resolved alert is a no-op, reported distinctly from a decode failure
//! - The alert context is decoded but never inspected

pub mod identity;
pub mod model;
pub mod parser;

pub use identity::{IdentityFormatError, ResourceIdentity};
pub use model::AlertPayload;
pub use parser::{parse_alert, AlertRejection};
