//! Bus event model
//!
//! Wire shape matches the application contract: the discriminating label
//! is serialized as `type`, option fields use camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label of the confirmation event published after every navigation
/// mutation, regardless of strategy.
pub const ROUTE_CHANGE: &str = "ROUTE_CHANGE";

/// A single event on the application bus.
///
/// The bridge only acts on events whose `event_type` equals its configured
/// request label; everything else flows past it untouched. The label is
/// runtime configuration, so events are keyed by string rather than a
/// closed enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Target route fragment, raw. Normalized by the bridge.
    pub route: String,
    /// Opaque payload attached to the resulting history entry.
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub options: EventOptions,
}

impl BusEvent {
    pub fn new(event_type: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            route: route.into(),
            data: Value::Null,
            options: EventOptions::default(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.options.replace = replace;
        self
    }
}

/// Option flags carried alongside a bus event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOptions {
    /// Replace the current history entry instead of pushing a new one.
    #[serde(default)]
    pub replace: bool,
    /// Raw platform signal, passed through on browser-originated
    /// observations for advanced consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event: Option<PlatformEvent>,
}

/// The raw browser navigation signal behind an observation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlatformEvent {
    /// History position changed (back/forward or programmatic travel),
    /// carrying the state payload of the entry landed on.
    #[serde(rename = "popstate")]
    PopState { state: Option<Value> },
    /// The fragment portion of the address changed.
    #[serde(rename = "hashchange")]
    HashChange,
}
