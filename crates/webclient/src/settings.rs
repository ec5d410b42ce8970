//! Client configuration

use crate::message::BASE_ORIGIN;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Key/value details attached to a debug message
pub type Meta = BTreeMap<String, String>;

/// Receiver for the client's debug messages
pub type DebugSink = Arc<dyn Fn(&str, Option<&Meta>) + Send + Sync>;

/// Settings for a [`WebClient`](crate::WebClient)
///
/// # Example
/// ```
/// use teleos_webclient::Settings;
///
/// let settings = Settings::new("my-app", "app-token")
///     .target_origin("https://staging.teleos.io")
///     .debug(|message, _meta| eprintln!("{message}"));
///
/// assert_eq!(settings.effective_origin(), "https://staging.teleos.io");
/// ```
#[derive(Clone)]
pub struct Settings {
    app_id: String,
    token: String,
    target_origin: Option<String>,
    debug: Option<DebugSink>,
}

impl Settings {
    /// Settings for the app registered as `app_id` with its app `token`
    pub fn new(app_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            token: token.into(),
            target_origin: None,
            debug: None,
        }
    }

    /// Origin of the host window (defaults to [`BASE_ORIGIN`])
    pub fn target_origin(mut self, origin: impl Into<String>) -> Self {
        self.target_origin = Some(origin.into());
        self
    }

    /// Receive debug messages
    pub fn debug<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str, Option<&Meta>) + Send + Sync + 'static,
    {
        self.debug = Some(Arc::new(sink));
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Origin messages are sent to and accepted from
    pub fn effective_origin(&self) -> &str {
        self.target_origin.as_deref().unwrap_or(BASE_ORIGIN)
    }

    pub(crate) fn debug_sink(&self) -> Option<&DebugSink> {
        self.debug.as_ref()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_id", &self.app_id)
            .field("target_origin", &self.target_origin)
            .field("debug", &self.debug.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origin() {
        let settings = Settings::new("app", "token");
        assert_eq!(settings.effective_origin(), BASE_ORIGIN);
        assert_eq!(settings.app_id(), "app");
        assert_eq!(settings.token(), "token");
        assert!(settings.debug_sink().is_none());
    }

    #[test]
    fn test_debug_output_hides_token() {
        let settings = Settings::new("app", "secret-token").debug(|_, _| {});
        let output = format!("{settings:?}");
        assert!(output.contains("app"));
        assert!(!output.contains("secret-token"));
    }
}
