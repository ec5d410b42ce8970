//! Message transport between the app frame and the host window
//!
//! Outbound messages are wrapped in an envelope identifying the app:
//!
//! ```json
//! { "name": "publish", "body": {..}, "source": "teleosClient",
//!   "fingerprints": { "appId": "..", "token": ".." } }
//! ```
//!
//! Inbound messages are accepted only when they come from the target origin,
//! carry the host source marker and this app's ID, and name a message.
//! Everything else is dropped with a debug message.

use crate::error::{Error, Result};
use crate::message::{ClientMessage, HostMessage, CLIENT_SOURCE, HOST_SOURCE};
use crate::settings::{Meta, Settings};
use miniserde::json::{self, Object, Value};
use std::sync::Arc;

/// The browser window hosting the app
///
/// Implemented over `window.top.postMessage` and friends in a browser
/// build, or over a recording stub in tests.
pub trait HostWindow: Send + Sync {
    /// Post a serialized message to the top-level window
    fn post_message(&self, message: &str, target_origin: &str);

    /// Query string of the app's location, including the leading `?`
    fn location_search(&self) -> String;

    /// Scroll height of the app's document in pixels
    fn document_height(&self) -> u64;
}

/// A `message` event delivered to the app's window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Origin of the sending window
    pub origin: String,
    /// Event data as JSON
    pub data: String,
}

impl MessageEvent {
    pub fn new(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: data.into(),
        }
    }
}

/// A host message that passed the inbound filter
pub(crate) struct InboundMessage {
    pub name: String,
    pub body: Value,
}

impl InboundMessage {
    pub fn kind(&self) -> Option<HostMessage> {
        HostMessage::parse(&self.name)
    }
}

pub(crate) struct Channel {
    window: Arc<dyn HostWindow>,
    settings: Settings,
}

impl Channel {
    pub fn new(window: Arc<dyn HostWindow>, settings: Settings) -> Self {
        Self { window, settings }
    }

    pub fn window(&self) -> &dyn HostWindow {
        self.window.as_ref()
    }

    /// Post a message to the host
    pub fn post(&self, name: ClientMessage, body: Option<Value>) {
        let mut fingerprints = Object::new();
        fingerprints.insert(
            "appId".into(),
            Value::String(self.settings.app_id().into()),
        );
        fingerprints.insert("token".into(), Value::String(self.settings.token().into()));

        let mut envelope = Object::new();
        envelope.insert("name".into(), Value::String(name.as_str().into()));
        if let Some(body) = body {
            envelope.insert("body".into(), body);
        }
        envelope.insert("source".into(), Value::String(CLIENT_SOURCE.into()));
        envelope.insert("fingerprints".into(), Value::Object(fingerprints));

        let message = json::to_string(&Value::Object(envelope));
        tracing::debug!(name = %name, "posting message to host");
        self.window
            .post_message(&message, self.settings.effective_origin());
    }

    /// Filter an incoming event
    ///
    /// Returns `None` for dropped messages and for `info` messages, which
    /// are forwarded to the debug sink instead.
    pub fn receive(&self, event: &MessageEvent) -> Option<InboundMessage> {
        let inbound = match self.accept(event) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::debug!(origin = %event.origin, "dropping message: {e}");
                self.debug(
                    "Received message not valid",
                    Some(&meta([("message", event.data.as_str())])),
                );
                return None;
            }
        };

        self.debug(
            "Received host message",
            Some(&meta([("payload", event.data.as_str())])),
        );

        if inbound.kind() == Some(HostMessage::Info) {
            self.debug(&inbound.name, info_meta(&inbound.body).as_ref());
            return None;
        }

        Some(inbound)
    }

    /// Check an event against the inbound filter
    pub fn accept(&self, event: &MessageEvent) -> Result<InboundMessage> {
        if event.origin != self.settings.effective_origin() {
            return Err(Error::InvalidMessage(format!(
                "unexpected origin '{}'",
                event.origin
            )));
        }

        let Ok(Value::Object(mut data)) = json::from_str::<Value>(&event.data) else {
            return Err(Error::InvalidMessage("data is not an object".into()));
        };

        if !is_string(data.get("source"), HOST_SOURCE) {
            return Err(Error::InvalidMessage("not sent by the host".into()));
        }
        if !is_string(data.get("appId"), self.settings.app_id()) {
            return Err(Error::InvalidMessage("addressed to another app".into()));
        }

        let Some(Value::String(name)) = data.remove("message") else {
            return Err(Error::InvalidMessage("message name missing".into()));
        };
        let body = data.remove("body").unwrap_or(Value::Null);

        Ok(InboundMessage { name, body })
    }

    /// Emit a debug message to `tracing` and the configured sink
    pub fn debug(&self, message: &str, meta: Option<&Meta>) {
        tracing::debug!(?meta, "{message}");
        if let Some(sink) = self.settings.debug_sink() {
            sink(message, meta);
        }
    }
}

fn is_string(value: Option<&Value>, expected: &str) -> bool {
    matches!(value, Some(Value::String(s)) if s == expected)
}

fn meta<const N: usize>(entries: [(&str, &str); N]) -> Meta {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

/// `body.meta` of an `info` message, non-string values as JSON
fn info_meta(body: &Value) -> Option<Meta> {
    let Value::Object(body) = body else {
        return None;
    };
    let Some(Value::Object(meta)) = body.get("meta") else {
        return None;
    };

    let meta = meta
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => json::to_string(other),
            };
            (key.clone(), value)
        })
        .collect();
    Some(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BASE_ORIGIN;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Window {
        posted: Mutex<Vec<(String, String)>>,
    }

    impl HostWindow for Window {
        fn post_message(&self, message: &str, target_origin: &str) {
            self.posted
                .lock()
                .unwrap()
                .push((message.to_owned(), target_origin.to_owned()));
        }

        fn location_search(&self) -> String {
            String::new()
        }

        fn document_height(&self) -> u64 {
            0
        }
    }

    fn channel(settings: Settings) -> (Arc<Window>, Channel) {
        let window = Arc::new(Window::default());
        let channel = Channel::new(window.clone(), settings);
        (window, channel)
    }

    fn host_event(data: &str) -> MessageEvent {
        MessageEvent::new(BASE_ORIGIN, data)
    }

    #[test]
    fn test_post_envelope() {
        let (window, channel) = channel(Settings::new("app", "token"));
        channel.post(ClientMessage::HideLoading, None);

        let posted = window.posted.lock().unwrap();
        assert_eq!(
            posted[0],
            (
                r#"{"fingerprints":{"appId":"app","token":"token"},"name":"hideLoading","source":"teleosClient"}"#.to_owned(),
                BASE_ORIGIN.to_owned()
            )
        );
    }

    #[test]
    fn test_post_uses_target_origin() {
        let settings = Settings::new("app", "token").target_origin("https://host.test");
        let (window, channel) = channel(settings);
        channel.post(ClientMessage::Complete, Some(Value::Null));

        let posted = window.posted.lock().unwrap();
        assert!(posted[0].0.contains(r#""body":null"#));
        assert_eq!(posted[0].1, "https://host.test");
    }

    #[test]
    fn test_accept() {
        let (_, channel) = channel(Settings::new("app", "token"));
        let inbound = channel
            .accept(&host_event(
                r#"{"source":"teleosHost","appId":"app","message":"readyReceived","body":{"jwt":"t"}}"#,
            ))
            .unwrap();

        assert_eq!(inbound.kind(), Some(HostMessage::ReadyReceived));
        assert!(matches!(inbound.body, Value::Object(_)));
    }

    #[test]
    fn test_accept_rejects() {
        let (_, channel) = channel(Settings::new("app", "token"));

        let cases = [
            (
                MessageEvent::new(
                    "https://evil.test",
                    r#"{"source":"teleosHost","appId":"app","message":"info"}"#,
                ),
                "unexpected origin",
            ),
            (host_event("not json"), "not an object"),
            (host_event("[]"), "not an object"),
            (
                host_event(r#"{"source":"teleosClient","appId":"app","message":"info"}"#),
                "not sent by the host",
            ),
            (
                host_event(r#"{"source":"teleosHost","appId":"other","message":"info"}"#),
                "another app",
            ),
            (
                host_event(r#"{"source":"teleosHost","appId":"app","message":7}"#),
                "name missing",
            ),
        ];

        for (event, reason) in cases {
            match channel.accept(&event) {
                Err(Error::InvalidMessage(message)) => {
                    assert!(message.contains(reason), "{message} / {reason}")
                }
                _ => panic!("expected rejection for {event:?}"),
            }
        }
    }

    #[test]
    fn test_info_goes_to_debug_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let settings = Settings::new("app", "token").debug(move |message, meta| {
            sink.lock()
                .unwrap()
                .push((message.to_owned(), meta.cloned()));
        });
        let (_, channel) = channel(settings);

        let received = channel.receive(&host_event(
            r#"{"source":"teleosHost","appId":"app","message":"info","body":{"meta":{"step":"upload","n":2}}}"#,
        ));
        assert!(received.is_none());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "Received host message");
        assert_eq!(seen[1].0, "info");
        let meta = seen[1].1.as_ref().unwrap();
        assert_eq!(meta["step"], "upload");
        assert_eq!(meta["n"], "2");
    }

    #[test]
    fn test_dropped_message_reported_to_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let settings = Settings::new("app", "token").debug(move |message, meta| {
            sink.lock()
                .unwrap()
                .push((message.to_owned(), meta.cloned()));
        });
        let (_, channel) = channel(settings);

        assert!(channel.receive(&host_event("{}")).is_none());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Received message not valid");
        assert_eq!(seen[0].1.as_ref().unwrap()["message"], "{}");
    }
}
