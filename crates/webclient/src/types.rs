//! Payloads carried in message bodies
//!
//! Outbound payloads are written as JSON objects that omit unset fields.
//! Inbound payloads are read with `miniserde`; unknown fields are ignored.

use miniserde::json::{Number, Object, Value};
use miniserde::Deserialize;

/// Entry to publish or revise
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishQuery {
    /// Page the entry points at
    pub url: String,
    /// Keep navigation inside the entry's URL scope
    ///
    /// Publishing sends `true` when unset.
    pub prevent_navigation: Option<bool>,
    /// Reload the page every given number of seconds
    pub reload_interval_sec: Option<u64>,
    /// CSS injected into the page
    pub inject_css: Option<String>,
    /// JavaScript injected into the page
    pub inject_js: Option<String>,
}

impl PublishQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn prevent_navigation(mut self, prevent: bool) -> Self {
        self.prevent_navigation = Some(prevent);
        self
    }

    pub fn reload_interval_sec(mut self, seconds: u64) -> Self {
        self.reload_interval_sec = Some(seconds);
        self
    }

    pub fn inject_css(mut self, css: impl Into<String>) -> Self {
        self.inject_css = Some(css.into());
        self
    }

    pub fn inject_js(mut self, js: impl Into<String>) -> Self {
        self.inject_js = Some(js.into());
        self
    }

    /// Message body, with `prevent_navigation` applied when the query has none
    pub(crate) fn to_body(&self, prevent_navigation: Option<bool>) -> Value {
        let mut body = Object::new();
        body.insert("url".into(), Value::String(self.url.clone()));
        if let Some(prevent) = self.prevent_navigation.or(prevent_navigation) {
            body.insert("preventNavigation".into(), Value::Bool(prevent));
        }
        if let Some(seconds) = self.reload_interval_sec {
            body.insert(
                "reloadIntervalSec".into(),
                Value::Number(Number::U64(seconds)),
            );
        }
        if let Some(css) = &self.inject_css {
            body.insert("injectCSS".into(), Value::String(css.clone()));
        }
        if let Some(js) = &self.inject_js {
            body.insert("injectJS".into(), Value::String(js.clone()));
        }
        Value::Object(body)
    }
}

/// How the host should present the app once it is ready
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadyOptions {
    /// Occupy the whole screen
    pub full_screen: Option<bool>,
    /// Frame height, e.g. `"480px"`; the document height when unset
    pub height: Option<String>,
}

impl ReadyOptions {
    pub fn full_screen(mut self, full_screen: bool) -> Self {
        self.full_screen = Some(full_screen);
        self
    }

    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub(crate) fn to_body(&self, document_height: u64) -> Value {
        let mut body = Object::new();
        let height = match &self.height {
            Some(height) => Value::String(height.clone()),
            None => Value::Number(Number::U64(document_height)),
        };
        body.insert("height".into(), height);
        if let Some(full_screen) = self.full_screen {
            body.insert("fullScreen".into(), Value::Bool(full_screen));
        }
        Value::Object(body)
    }
}

/// Body of `readyReceived`
///
/// In revise mode the host also names the entry being revised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadyTicket {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    /// Token the app server verifies
    pub jwt: String,
    #[serde(rename = "entryId")]
    pub entry_id: Option<String>,
    pub url: Option<String>,
}

/// Body of `publishEntrySuccess` and `reviseEntrySuccess`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuccessfulResponse {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    /// Publish or revise token for the app server
    pub jwt: String,
    pub url: String,
    #[serde(rename = "entryId")]
    pub entry_id: String,
}

/// Body of `publishEntryFailed` and `reviseEntryFailed`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FailedResponse {
    #[serde(rename = "appId")]
    pub app_id: Option<String>,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
    pub jwt: Option<String>,
    pub reason: Option<String>,
}
