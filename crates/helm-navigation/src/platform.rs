//! Platform seam
//!
//! The browser's location/history surface, abstracted behind a trait so
//! the bridge observes and mutates an injected handle instead of a
//! process-wide global. Hosts bind this to their windowing layer;
//! [`MemoryPlatform`](crate::MemoryPlatform) provides a deterministic
//! implementation for tests and headless embedding.

use std::sync::Arc;

use helm_events::PlatformEvent;

/// Listener invoked for every emission of a subscribed navigation signal.
pub type SignalListener = Arc<dyn Fn(&PlatformEvent) + Send + Sync>;

/// The platform's navigation-transition signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationSignal {
    /// History position changed without a page load.
    PopState,
    /// The fragment portion of the address changed.
    HashChange,
}

impl NavigationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationSignal::PopState => "popstate",
            NavigationSignal::HashChange => "hashchange",
        }
    }
}

impl std::fmt::Display for NavigationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NavigationSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popstate" => Ok(NavigationSignal::PopState),
            "hashchange" => Ok(NavigationSignal::HashChange),
            other => Err(format!("Unknown navigation signal: {}", other)),
        }
    }
}

/// Browser location/history surface consumed by the bridge.
///
/// The platform owns the real mutable state (current address, history
/// stack); the bridge only reads and mutates it through this handle.
/// Implementations are expected to be internally synchronized.
pub trait Platform: Send + Sync {
    /// Whether the history stack supports push/replace without a page
    /// load. Probed once at bridge construction.
    fn has_push_state(&self) -> bool;

    /// Address scheme including the trailing colon, e.g. `"https:"`.
    fn protocol(&self) -> String;

    /// Host, including the port when present.
    fn host(&self) -> String;

    /// The full current address.
    fn href(&self) -> String;

    /// Path portion of the current address.
    fn pathname(&self) -> String;

    /// Current document title, used as the history-entry label.
    fn document_title(&self) -> String;

    /// Push a new history entry with the given state payload, label and
    /// address.
    fn push_entry(&self, state: serde_json::Value, title: &str, url: &str);

    /// Replace the current history entry in place.
    fn replace_entry(&self, state: serde_json::Value, title: &str, url: &str);

    /// Assign the location hash. Native assignment semantics: creates a
    /// new history entry as a side effect.
    fn assign_hash(&self, hash: &str);

    /// Replace the full address of the current browsing-context entry
    /// without creating a new one.
    fn replace_href(&self, href: &str);

    /// Subscribe a listener to a navigation signal.
    fn subscribe(&self, signal: NavigationSignal, listener: SignalListener);

    /// Drop all listeners subscribed to a navigation signal.
    fn unsubscribe(&self, signal: NavigationSignal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(NavigationSignal::PopState.as_str(), "popstate");
        assert_eq!(NavigationSignal::HashChange.as_str(), "hashchange");

        let parsed: NavigationSignal = "hashchange".parse().unwrap();
        assert_eq!(parsed, NavigationSignal::HashChange);
        assert!("pageshow".parse::<NavigationSignal>().is_err());
    }
}
