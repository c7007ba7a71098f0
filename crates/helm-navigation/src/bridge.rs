//! Navigation bridge
//!
//! Translates browser navigation signals into bus events and bus
//! route-change requests into address/history mutations. The bridge
//! registers with the bus at construction and stays registered for its
//! lifetime; it only *acts* on requests between `start()` and `stop()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};
use tracing::{debug, info, trace};

use helm_events::{BusEvent, Dispatcher, EventOptions, PlatformEvent, ROUTE_CHANGE};

use crate::config::BridgeConfig;
use crate::error::NavigationError;
use crate::fragment;
use crate::platform::{NavigationSignal, Platform};
use crate::Result;

/// Name the bridge registers under on the event bus.
const HANDLER_NAME: &str = "NavigationBridge";

/// Two-way adapter between the platform's navigation surface and the
/// application event bus.
pub struct NavigationBridge {
    inner: Arc<Inner>,
}

struct Inner {
    root: String,
    wants_hash_change: bool,
    event_type: String,
    /// Scheme + host, cached at construction.
    base_url: String,
    /// Capability probe result, taken once at construction.
    has_push_state: bool,
    started: AtomicBool,
    platform: Arc<dyn Platform>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl NavigationBridge {
    /// Build a bridge over the given platform and register it with the
    /// configured bus.
    ///
    /// Fails when the config carries no dispatcher, or when the root
    /// prefix is not slash-delimited.
    pub fn new(config: BridgeConfig, platform: Arc<dyn Platform>) -> Result<Self> {
        let dispatcher = config
            .dispatcher
            .ok_or(NavigationError::MissingDispatcher)?;

        if !config.root.starts_with('/') || !config.root.ends_with('/') {
            return Err(NavigationError::InvalidRoot(config.root));
        }

        let has_push_state = platform.has_push_state();
        let base_url = format!("{}//{}", platform.protocol(), platform.host());

        let inner = Arc::new(Inner {
            root: config.root,
            wants_hash_change: config.hash_change,
            event_type: config.event_type,
            base_url,
            has_push_state,
            started: AtomicBool::new(false),
            platform,
            dispatcher,
        });

        // Registration is for the bridge's lifetime and is decoupled from
        // start/stop: requests are always received, but only acted upon
        // while started. The Weak capture lets a dropped bridge degrade
        // to a no-op handler.
        let weak: Weak<Inner> = Arc::downgrade(&inner);
        inner.dispatcher.register(
            HANDLER_NAME,
            Arc::new(move |event: &BusEvent| {
                if let Some(inner) = weak.upgrade() {
                    if inner.started.load(Ordering::SeqCst) {
                        inner.update(event);
                    }
                }
            }),
        );

        debug!(
            base_url = %inner.base_url,
            push_state = inner.has_push_state,
            "navigation bridge registered"
        );

        Ok(Self { inner })
    }

    /// Subscribe to the capability-appropriate navigation signal and
    /// begin acting on route-change requests. Guarded: a second call is
    /// a logged no-op.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("navigation bridge already started");
            return;
        }

        let signal = self.inner.signal();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.platform.subscribe(
            signal,
            Arc::new(move |event: &PlatformEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_history_event(event);
                }
            }),
        );

        info!(signal = %signal, "navigation bridge started");
    }

    /// Unsubscribe from the navigation signal and stop acting on
    /// route-change requests. Guarded like `start()`.
    pub fn stop(&self) {
        if !self.inner.started.swap(false, Ordering::SeqCst) {
            debug!("navigation bridge already stopped");
            return;
        }

        self.inner.platform.unsubscribe(self.inner.signal());
        info!("navigation bridge stopped");
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// The current normalized route fragment observed on the platform.
    pub fn fragment(&self) -> String {
        self.inner.fragment()
    }
}

impl Inner {
    /// Signal choice follows capability, not the hash-forcing config.
    fn signal(&self) -> NavigationSignal {
        if self.has_push_state {
            NavigationSignal::PopState
        } else {
            NavigationSignal::HashChange
        }
    }

    /// Outbound path: act on a route-change request from the bus.
    fn update(&self, event: &BusEvent) {
        if event.event_type != self.event_type {
            return;
        }

        // Feedback cutoff: a request for the route we are already on is
        // dropped, which also terminates signal → publish → request
        // loops.
        if fragment::strip(&event.route) == self.fragment() {
            trace!(route = %event.route, "route already current");
            return;
        }

        let url = format!("{}{}{}", self.base_url, self.root, event.route);

        if self.has_push_state && !self.wants_hash_change {
            let state = non_null_payload(&event.data);
            let title = self.platform.document_title();
            if event.options.replace {
                self.platform.replace_entry(state, &title, &url);
            } else {
                self.platform.push_entry(state, &title, &url);
            }
            debug!(url = %url, replace = event.options.replace, "history entry updated");
        } else {
            self.update_hash(&event.route, event.options.replace);
        }

        self.dispatcher.dispatch(BusEvent {
            event_type: ROUTE_CHANGE.to_string(),
            route: event.route.clone(),
            data: event.data.clone(),
            options: event.options.clone(),
        });
    }

    fn update_hash(&self, route: &str, replace: bool) {
        if replace {
            let href = self.platform.href();
            let stripped = fragment::strip_hash_or_js(&href);
            self.platform.replace_href(&format!("{}#{}", stripped, route));
        } else {
            // Some platforms require the hash to carry a leading #.
            self.platform.assign_hash(&format!("#/{}", route));
        }
        debug!(route = %route, replace, "location hash updated");
    }

    /// Derive the normalized fragment from the current location:
    /// path-based when push-state capable, hash-based otherwise.
    fn fragment(&self) -> String {
        let raw = if self.has_push_state {
            fragment::path(
                &self.platform.pathname(),
                &fragment::search(&self.platform.href()),
                &self.root,
            )
        } else {
            fragment::hash(&self.platform.href())
        };
        fragment::strip(&raw)
    }

    /// Inbound path: republish a platform navigation signal on the bus.
    fn handle_history_event(&self, event: &PlatformEvent) {
        let data = match event {
            PlatformEvent::PopState { state: Some(state) } => state.clone(),
            _ => Value::Object(Map::new()),
        };

        self.dispatcher.dispatch(BusEvent {
            event_type: self.event_type.clone(),
            route: self.fragment(),
            data,
            options: EventOptions {
                replace: false,
                original_event: Some(event.clone()),
            },
        });
    }
}

/// An absent payload becomes an empty object when attached to a history
/// entry, matching native pushState conventions.
fn non_null_payload(data: &Value) -> Value {
    if data.is_null() {
        Value::Object(Map::new())
    } else {
        data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPlatform;
    use helm_events::EventHandler;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Synchronous fan-out bus that records everything dispatched.
    #[derive(Default)]
    struct RecordingBus {
        handlers: Mutex<Vec<(String, EventHandler)>>,
        events: Mutex<Vec<BusEvent>>,
    }

    impl RecordingBus {
        fn events(&self) -> Vec<BusEvent> {
            self.events.lock().clone()
        }

        fn handler_names(&self) -> Vec<String> {
            self.handlers.lock().iter().map(|(n, _)| n.clone()).collect()
        }

        fn confirmations(&self) -> Vec<BusEvent> {
            self.events()
                .into_iter()
                .filter(|e| e.event_type == ROUTE_CHANGE)
                .collect()
        }
    }

    impl Dispatcher for RecordingBus {
        fn register(&self, name: &str, handler: EventHandler) {
            self.handlers.lock().push((name.to_string(), handler));
        }

        fn dispatch(&self, event: BusEvent) {
            self.events.lock().push(event.clone());
            // Handlers are invoked outside the lock so they may dispatch
            // again.
            let handlers: Vec<EventHandler> =
                self.handlers.lock().iter().map(|(_, h)| h.clone()).collect();
            for handler in handlers {
                handler(&event);
            }
        }
    }

    fn bridge_over(
        platform: &MemoryPlatform,
        configure: impl FnOnce(&mut BridgeConfig),
    ) -> (Arc<RecordingBus>, NavigationBridge) {
        let bus = Arc::new(RecordingBus::default());
        let mut config = BridgeConfig::new(bus.clone());
        configure(&mut config);
        let bridge = NavigationBridge::new(config, Arc::new(platform.clone())).unwrap();
        (bus, bridge)
    }

    #[test]
    fn test_construction_requires_dispatcher() {
        let result = NavigationBridge::new(
            BridgeConfig::default(),
            Arc::new(MemoryPlatform::new()),
        );
        assert!(matches!(result, Err(NavigationError::MissingDispatcher)));
    }

    #[test]
    fn test_construction_registers_immediately() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});

        assert!(!bridge.is_started());
        assert_eq!(bus.handler_names(), vec!["NavigationBridge"]);
    }

    #[test]
    fn test_construction_rejects_bad_root() {
        let bus = Arc::new(RecordingBus::default());
        let mut config = BridgeConfig::new(bus);
        config.root = "app/".to_string();

        let result = NavigationBridge::new(config, Arc::new(MemoryPlatform::new()));
        assert!(matches!(result, Err(NavigationError::InvalidRoot(_))));
    }

    #[test]
    fn test_start_subscribes_popstate_when_push_capable() {
        let platform = MemoryPlatform::new();
        let (_bus, bridge) = bridge_over(&platform, |_| {});

        bridge.start();
        assert!(bridge.is_started());
        assert_eq!(platform.listener_count(NavigationSignal::PopState), 1);
        assert_eq!(platform.listener_count(NavigationSignal::HashChange), 0);
    }

    #[test]
    fn test_start_subscribes_hashchange_without_push_state() {
        let platform = MemoryPlatform::new();
        platform.set_push_state(false);
        let (_bus, bridge) = bridge_over(&platform, |_| {});

        bridge.start();
        assert_eq!(platform.listener_count(NavigationSignal::HashChange), 1);
        assert_eq!(platform.listener_count(NavigationSignal::PopState), 0);
    }

    #[test]
    fn test_double_start_keeps_single_listener() {
        let platform = MemoryPlatform::new();
        let (_bus, bridge) = bridge_over(&platform, |_| {});

        bridge.start();
        bridge.start();
        assert_eq!(platform.listener_count(NavigationSignal::PopState), 1);
    }

    #[test]
    fn test_stop_unsubscribes() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});

        bridge.start();
        bridge.stop();
        assert!(!bridge.is_started());
        assert_eq!(platform.listener_count(NavigationSignal::PopState), 0);

        // Signals after stop() go nowhere
        platform.emit_pop_state(Some(json!({"example": "state"})));
        assert!(bus.events().is_empty());

        // Stopping again is a no-op
        bridge.stop();
        assert!(!bridge.is_started());
    }

    #[test]
    fn test_foreign_event_type_is_ignored() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        bus.dispatch(BusEvent::new("INCORRECT_TYPE", "some/url").with_data(json!({"test": "data"})));

        assert!(platform.entries().is_empty());
        assert!(bus.confirmations().is_empty());
    }

    #[test]
    fn test_unchanged_route_is_ignored() {
        let platform = MemoryPlatform::new();
        platform.set_pathname("/some/url");
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));
        // Comparison is against the normalized request, so a leading
        // slash makes no difference.
        bus.dispatch(BusEvent::new("ROUTE", "/some/url"));

        assert!(platform.entries().is_empty());
        assert!(bus.confirmations().is_empty());
    }

    #[test]
    fn test_requests_ignored_while_stopped() {
        let platform = MemoryPlatform::new();
        let (bus, _bridge) = bridge_over(&platform, |_| {});

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));

        assert!(platform.entries().is_empty());
        assert!(bus.confirmations().is_empty());
    }

    #[test]
    fn test_push_state_navigation() {
        let platform = MemoryPlatform::with_address("https://example.com/").unwrap();
        platform.set_title("Example");
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        let request = BusEvent::new("ROUTE", "some/url").with_data(json!({"test": "data"}));
        bus.dispatch(request.clone());

        let entries = platform.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/some/url");
        assert_eq!(entries[0].state, json!({"test": "data"}));
        assert_eq!(entries[0].title, "Example");

        let confirmations = bus.confirmations();
        assert_eq!(confirmations.len(), 1);
        assert_eq!(confirmations[0].route, request.route);
        assert_eq!(confirmations[0].data, request.data);
        assert_eq!(confirmations[0].options, request.options);
    }

    #[test]
    fn test_null_data_becomes_empty_state() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));
        assert_eq!(platform.entries()[0].state, json!({}));
    }

    #[test]
    fn test_replace_option_replaces_entry() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        bus.dispatch(BusEvent::new("ROUTE", "first"));
        bus.dispatch(BusEvent::new("ROUTE", "second").with_replace(true));

        let entries = platform.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/second");
    }

    #[test]
    fn test_custom_event_type_and_root() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |config| {
            config.event_type = "NAVIGATE".to_string();
            config.root = "/app/".to_string();
        });
        bridge.start();

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));
        assert!(platform.entries().is_empty());

        bus.dispatch(BusEvent::new("NAVIGATE", "some/url"));
        assert_eq!(platform.entries()[0].url, "https://example.com/app/some/url");
    }

    #[test]
    fn test_hash_forcing_assigns_hash() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |config| config.hash_change = true);
        bridge.start();

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));

        assert_eq!(platform.href(), "https://example.com/#/some/url");
        assert_eq!(bus.confirmations().len(), 1);
    }

    #[test]
    fn test_hash_replace_strips_existing_fragment() {
        let platform = MemoryPlatform::new();
        platform.set_href("https://example.com/#/old");
        let (bus, bridge) = bridge_over(&platform, |config| config.hash_change = true);
        bridge.start();

        bus.dispatch(BusEvent::new("ROUTE", "some/url").with_replace(true));

        assert_eq!(platform.href(), "https://example.com/#some/url");
        // Replace never grows the stack beyond the replaced entry
        assert!(platform.entries().len() <= 1);
    }

    #[test]
    fn test_popstate_republishes_state_payload() {
        let platform = MemoryPlatform::new();
        platform.set_pathname("/some/url");
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        platform.emit_pop_state(Some(json!({"example": "state"})));

        let events = bus.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "ROUTE");
        assert_eq!(events[0].route, "some/url");
        assert_eq!(events[0].data, json!({"example": "state"}));
        assert_eq!(
            events[0].options.original_event,
            Some(PlatformEvent::PopState {
                state: Some(json!({"example": "state"}))
            })
        );
    }

    #[test]
    fn test_popstate_null_state_publishes_empty_payload() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        platform.emit_pop_state(None);

        let events = bus.events();
        assert_eq!(events[0].data, json!({}));
    }

    #[test]
    fn test_hashchange_republishes_current_fragment() {
        let platform = MemoryPlatform::new();
        platform.set_push_state(false);
        platform.set_href("https://example.com/#/some/path");
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        platform.emit_hash_change();

        let events = bus.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].route, "some/path");
        assert_eq!(events[0].data, json!({}));
        assert_eq!(
            events[0].options.original_event,
            Some(PlatformEvent::HashChange)
        );
    }

    #[test]
    fn test_reentrant_request_is_cut_off() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();

        // An application handler that re-requests the confirmed route,
        // synchronously, from inside the confirmation dispatch.
        let echo_bus = bus.clone();
        bus.register(
            "echo",
            Arc::new(move |event: &BusEvent| {
                if event.event_type == ROUTE_CHANGE {
                    echo_bus.dispatch(BusEvent::new("ROUTE", event.route.clone()));
                }
            }),
        );

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));

        // One mutation, one confirmation: the echoed request hit the
        // route-unchanged guard instead of looping.
        assert_eq!(platform.entries().len(), 1);
        assert_eq!(bus.confirmations().len(), 1);
    }

    #[test]
    fn test_dropped_bridge_handler_is_inert() {
        let platform = MemoryPlatform::new();
        let (bus, bridge) = bridge_over(&platform, |_| {});
        bridge.start();
        drop(bridge);

        bus.dispatch(BusEvent::new("ROUTE", "some/url"));
        assert!(platform.entries().is_empty());
    }

    #[test]
    fn test_current_fragment_accessor() {
        let platform = MemoryPlatform::new();
        platform.set_pathname("/some/path");
        let (_bus, bridge) = bridge_over(&platform, |_| {});

        assert_eq!(bridge.fragment(), "some/path");
    }
}
