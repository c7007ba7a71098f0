//! Helm Event Model
//!
//! Shared event types and the dispatch contract the navigation bridge
//! plugs into. The bus implementation itself lives in the host
//! application; this crate only defines what the bridge needs from it:
//! a named registrar and a synchronous publish.

mod dispatcher;
mod event;

pub use dispatcher::{Dispatcher, EventHandler};
pub use event::{BusEvent, EventOptions, PlatformEvent, ROUTE_CHANGE};
