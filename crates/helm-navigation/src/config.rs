//! Bridge configuration

use std::sync::Arc;

use helm_events::Dispatcher;

/// Configuration consumed once at bridge construction, immutable for the
/// bridge's lifetime.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Root path prefix. Must begin and end with `/`.
    pub root: String,
    /// Force hash-based navigation even when push-state is available.
    pub hash_change: bool,
    /// Label of outbound route-change requests the bridge acts on.
    pub event_type: String,
    /// The application event bus. Required; construction fails without it.
    pub dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl BridgeConfig {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            dispatcher: Some(dispatcher),
            ..Self::default()
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            hash_change: false,
            event_type: "ROUTE".to_string(),
            dispatcher: None,
        }
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("root", &self.root)
            .field("hash_change", &self.hash_change)
            .field("event_type", &self.event_type)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.root, "/");
        assert!(!config.hash_change);
        assert_eq!(config.event_type, "ROUTE");
        assert!(config.dispatcher.is_none());
    }
}
