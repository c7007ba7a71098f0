//! Dispatch contract
//!
//! The minimal capability set the bridge requires from the host's event
//! bus. Dispatch is synchronous fan-out: every registered handler sees
//! every event, and handlers filter for themselves.

use std::sync::Arc;

use crate::event::BusEvent;

/// Handler invoked for every event published on the bus.
pub type EventHandler = Arc<dyn Fn(&BusEvent) + Send + Sync>;

/// Registrar/publish contract implemented by the host's event bus.
pub trait Dispatcher: Send + Sync {
    /// Subscribe `handler` to all bus events under a stable name.
    ///
    /// Registration lasts for the lifetime of the bus; there is no
    /// unregister operation in this contract.
    fn register(&self, name: &str, handler: EventHandler);

    /// Publish an event synchronously to every registered handler.
    fn dispatch(&self, event: BusEvent);
}
