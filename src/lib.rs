//! Automated failover breaker for priority-routed Traffic Manager profiles.
//!
//! An alert webhook names a profile; a detached decision cycle reads the
//! profile, ranks its endpoints by priority and disables every enabled,
//! unhealthy endpoint ranked above the first healthy one.

pub mod alert;
pub mod breaker;
pub mod config;
pub mod control_plane;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::BreakerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
