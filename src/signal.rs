//! A small signal dispatcher and the template-render notification it carries.
//!
//! Views under test announce each template render by sending a
//! [`RenderEvent`] on their application's `template_rendered` signal. The
//! view fixture subscribes a capturing receiver at setup and disconnects it
//! at teardown, so template and context assertions see exactly the renders of
//! one test.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use axum_fixture::signal::{RenderEvent, Signal};
//!
//! let signal: Signal<RenderEvent> = Signal::new();
//!
//! signal.connect("logger", Arc::new(|event: &RenderEvent| {
//!     println!("rendered {}", event.template);
//! }));
//!
//! signal.send(&RenderEvent::new("home.html", serde_json::json!({"x": 1})));
//! ```

use std::sync::{Arc, RwLock};

/// The type signature for a signal receiver callback.
///
/// Receivers must be `Send + Sync` so signals can be dispatched from any
/// thread.
pub type SignalReceiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A signal that receivers can be connected to and that senders dispatch on.
///
/// Receivers are called in the order they were connected. Connecting with an
/// already-used id replaces the previous receiver.
pub struct Signal<T: 'static> {
    receivers: RwLock<Vec<(String, SignalReceiver<T>)>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub fn new() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Connects a receiver under `receiver_id`.
    ///
    /// The id is used to identify the receiver for later disconnection. If a
    /// receiver with the same id is already connected, it is replaced.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.receivers.write().expect("signal lock poisoned");

        if let Some(entry) = receivers.iter_mut().find(|(rid, _)| *rid == id) {
            entry.1 = callback;
        } else {
            receivers.push((id, callback));
        }
    }

    /// Disconnects the receiver with the given id.
    ///
    /// Returns `true` if a receiver was found and removed.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        let len_before = receivers.len();
        receivers.retain(|(id, _)| id != receiver_id);
        receivers.len() < len_before
    }

    /// Sends the signal to all connected receivers, in connection order.
    ///
    /// Returns the number of receivers notified.
    pub fn send(&self, payload: &T) -> usize {
        let receivers = self.receivers.read().expect("signal lock poisoned");
        for (_, callback) in receivers.iter() {
            callback(payload);
        }
        receivers.len()
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().expect("signal lock poisoned").len()
    }
}

/// One captured template render: which template, with what context.
#[derive(Debug, Clone)]
pub struct RenderEvent {
    /// The template identifier, e.g. `"home.html"`.
    pub template: String,
    /// The context the template was rendered with.
    pub context: serde_json::Value,
}

impl RenderEvent {
    /// Creates a render event for the given template and context.
    pub fn new(template: impl Into<String>, context: serde_json::Value) -> Self {
        Self {
            template: template.into(),
            context,
        }
    }
}

/// The shared handle views use to announce renders and fixtures subscribe to.
pub type TemplateSignal = Arc<Signal<RenderEvent>>;
