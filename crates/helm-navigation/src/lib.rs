//! Helm Navigation Bridge
//!
//! Two-way translation between browser navigation primitives and the
//! application event bus:
//! - inbound: back/forward travel and hash changes are republished as
//!   bus events carrying the current normalized fragment;
//! - outbound: route-change requests on the bus are reflected into the
//!   address bar and history stack, by push-state when the platform
//!   supports it or by hash assignment otherwise.
//!
//! The browser itself is reached through the [`Platform`] trait, so the
//! bridge never touches a process-wide global and is fully testable
//! against [`MemoryPlatform`].

mod bridge;
mod config;
mod error;
mod fragment;
mod memory;
mod platform;

pub use bridge::NavigationBridge;
pub use config::BridgeConfig;
pub use error::NavigationError;
pub use memory::{HistoryEntry, MemoryPlatform};
pub use platform::{NavigationSignal, Platform, SignalListener};

// Re-export the event model so hosts depend on one crate.
pub use helm_events::{BusEvent, Dispatcher, EventHandler, EventOptions, PlatformEvent, ROUTE_CHANGE};

pub type Result<T> = std::result::Result<T, NavigationError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
