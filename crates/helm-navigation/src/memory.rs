//! In-memory platform
//!
//! A deterministic [`Platform`] implementation: scripted location fields,
//! a recorded history stack, and explicit signal emitters. Used by the
//! test suite and by headless hosts that want navigation semantics
//! without a real browsing context.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::platform::{NavigationSignal, Platform, SignalListener};
use crate::Result;

use helm_events::PlatformEvent;

/// One recorded history-stack mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// State payload attached to the entry.
    pub state: Value,
    /// Entry label (the document title at mutation time).
    pub title: String,
    /// Absolute address of the entry.
    pub url: String,
}

#[derive(Debug, Clone)]
struct LocationState {
    protocol: String,
    host: String,
    pathname: String,
    href: String,
    title: String,
    push_state: bool,
}

impl Default for LocationState {
    fn default() -> Self {
        Self {
            protocol: "https:".to_string(),
            host: "example.com".to_string(),
            pathname: "/".to_string(),
            href: "https://example.com/".to_string(),
            title: String::new(),
            push_state: true,
        }
    }
}

/// Keep `pathname` consistent with a freshly assigned absolute address,
/// the way a real location object would. Relative addresses are left as
/// scripted.
fn sync_pathname(location: &mut LocationState, url: &str) {
    if let Ok(parsed) = Url::parse(url) {
        location.pathname = parsed.path().to_string();
    }
}

struct Inner {
    location: Mutex<LocationState>,
    entries: Mutex<Vec<HistoryEntry>>,
    listeners: Mutex<HashMap<NavigationSignal, Vec<SignalListener>>>,
}

/// Shareable in-memory location/history singleton.
#[derive(Clone)]
pub struct MemoryPlatform {
    inner: Arc<Inner>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                location: Mutex::new(LocationState::default()),
                entries: Mutex::new(Vec::new()),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Create a platform positioned at an absolute address.
    pub fn with_address(address: &str) -> Result<Self> {
        let url = Url::parse(address)?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let platform = Self::new();
        {
            let mut location = platform.inner.location.lock();
            location.protocol = format!("{}:", url.scheme());
            location.host = host;
            location.pathname = url.path().to_string();
            location.href = address.to_string();
        }
        Ok(platform)
    }

    /// Set the full address verbatim (pathname and host are untouched).
    pub fn set_href(&self, href: &str) {
        self.inner.location.lock().href = href.to_string();
    }

    pub fn set_pathname(&self, pathname: &str) {
        self.inner.location.lock().pathname = pathname.to_string();
    }

    pub fn set_title(&self, title: &str) {
        self.inner.location.lock().title = title.to_string();
    }

    /// Script whether the platform reports push-state capability.
    pub fn set_push_state(&self, supported: bool) {
        self.inner.location.lock().push_state = supported;
    }

    /// Snapshot of all recorded history-stack mutations.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.entries.lock().clone()
    }

    pub fn listener_count(&self, signal: NavigationSignal) -> usize {
        self.inner
            .listeners
            .lock()
            .get(&signal)
            .map(|l| l.len())
            .unwrap_or(0)
    }

    /// Fire a history-position-change signal at subscribed listeners.
    pub fn emit_pop_state(&self, state: Option<Value>) {
        self.emit(
            NavigationSignal::PopState,
            &PlatformEvent::PopState { state },
        );
    }

    /// Fire a fragment-change signal at subscribed listeners.
    pub fn emit_hash_change(&self) {
        self.emit(NavigationSignal::HashChange, &PlatformEvent::HashChange);
    }

    fn emit(&self, signal: NavigationSignal, event: &PlatformEvent) {
        // Clone listeners out of the lock: a listener may re-enter the
        // platform (read location, mutate history) while handling the
        // signal.
        let listeners: Vec<SignalListener> = self
            .inner
            .listeners
            .lock()
            .get(&signal)
            .cloned()
            .unwrap_or_default();

        for listener in listeners {
            listener(event);
        }
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MemoryPlatform {
    fn has_push_state(&self) -> bool {
        self.inner.location.lock().push_state
    }

    fn protocol(&self) -> String {
        self.inner.location.lock().protocol.clone()
    }

    fn host(&self) -> String {
        self.inner.location.lock().host.clone()
    }

    fn href(&self) -> String {
        self.inner.location.lock().href.clone()
    }

    fn pathname(&self) -> String {
        self.inner.location.lock().pathname.clone()
    }

    fn document_title(&self) -> String {
        self.inner.location.lock().title.clone()
    }

    fn push_entry(&self, state: Value, title: &str, url: &str) {
        {
            let mut location = self.inner.location.lock();
            location.href = url.to_string();
            sync_pathname(&mut location, url);
        }
        self.inner.entries.lock().push(HistoryEntry {
            state,
            title: title.to_string(),
            url: url.to_string(),
        });
    }

    fn replace_entry(&self, state: Value, title: &str, url: &str) {
        {
            let mut location = self.inner.location.lock();
            location.href = url.to_string();
            sync_pathname(&mut location, url);
        }

        let entry = HistoryEntry {
            state,
            title: title.to_string(),
            url: url.to_string(),
        };
        let mut entries = self.inner.entries.lock();
        match entries.last_mut() {
            Some(last) => *last = entry,
            None => entries.push(entry),
        }
    }

    fn assign_hash(&self, hash: &str) {
        let (href, title) = {
            let mut location = self.inner.location.lock();
            let base = match location.href.find('#') {
                Some(index) => location.href[..index].to_string(),
                None => location.href.clone(),
            };
            location.href = format!("{}{}", base, hash);
            (location.href.clone(), location.title.clone())
        };

        // Native hash assignment creates a history entry with no state.
        self.inner.entries.lock().push(HistoryEntry {
            state: Value::Null,
            title,
            url: href,
        });
    }

    fn replace_href(&self, href: &str) {
        let title = {
            let mut location = self.inner.location.lock();
            location.href = href.to_string();
            sync_pathname(&mut location, href);
            location.title.clone()
        };

        let entry = HistoryEntry {
            state: Value::Null,
            title,
            url: href.to_string(),
        };
        let mut entries = self.inner.entries.lock();
        match entries.last_mut() {
            Some(last) => *last = entry,
            None => entries.push(entry),
        }
    }

    fn subscribe(&self, signal: NavigationSignal, listener: SignalListener) {
        self.inner
            .listeners
            .lock()
            .entry(signal)
            .or_default()
            .push(listener);
    }

    fn unsubscribe(&self, signal: NavigationSignal) {
        self.inner.listeners.lock().remove(&signal);
    }
}
