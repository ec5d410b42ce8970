//! Message names exchanged with the Teleos host
//!
//! ```text
//! client ──► host    appReady, publish | revise, showLoading, hideLoading,
//!                    complete, clientError
//! host   ──► client  readyReceived, publishEntry{Success,Failed},
//!                    reviseEntry{Success,Failed}, info
//! ```

use std::fmt;

/// Origin messages are posted to when no target origin is configured
pub const BASE_ORIGIN: &str = "https://my.teleos.io";

/// `source` marker on messages sent by the host
pub const HOST_SOURCE: &str = "teleosHost";

/// `source` marker on messages sent by this client
pub const CLIENT_SOURCE: &str = "teleosClient";

/// Messages the client posts to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMessage {
    AppReady,
    Publish,
    Revise,
    ShowLoading,
    HideLoading,
    Complete,
    ClientError,
}

impl ClientMessage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClientMessage::AppReady => "appReady",
            ClientMessage::Publish => "publish",
            ClientMessage::Revise => "revise",
            ClientMessage::ShowLoading => "showLoading",
            ClientMessage::HideLoading => "hideLoading",
            ClientMessage::Complete => "complete",
            ClientMessage::ClientError => "clientError",
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages the host posts to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMessage {
    ReadyReceived,
    PublishEntrySuccess,
    PublishEntryFailed,
    ReviseEntrySuccess,
    ReviseEntryFailed,
    /// Diagnostic message, routed to the debug sink only
    Info,
}

impl HostMessage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            HostMessage::ReadyReceived => "readyReceived",
            HostMessage::PublishEntrySuccess => "publishEntrySuccess",
            HostMessage::PublishEntryFailed => "publishEntryFailed",
            HostMessage::ReviseEntrySuccess => "reviseEntrySuccess",
            HostMessage::ReviseEntryFailed => "reviseEntryFailed",
            HostMessage::Info => "info",
        }
    }

    /// Parse a wire name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        let message = match name {
            "readyReceived" => HostMessage::ReadyReceived,
            "publishEntrySuccess" => HostMessage::PublishEntrySuccess,
            "publishEntryFailed" => HostMessage::PublishEntryFailed,
            "reviseEntrySuccess" => HostMessage::ReviseEntrySuccess,
            "reviseEntryFailed" => HostMessage::ReviseEntryFailed,
            "info" => HostMessage::Info,
            _ => return None,
        };
        Some(message)
    }
}

impl fmt::Display for HostMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which workflow the host opened the app for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMode {
    Publish,
    Revise,
}

impl ClientMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClientMode::Publish => "publish",
            ClientMode::Revise => "revise",
        }
    }

    /// Read the `mode` parameter of a location query string
    ///
    /// Accepts the string with or without its leading `?`. Missing or
    /// unrecognized values yield `None`.
    ///
    /// ```
    /// use teleos_webclient::ClientMode;
    ///
    /// assert_eq!(ClientMode::from_search("?mode=revise"), Some(ClientMode::Revise));
    /// assert_eq!(ClientMode::from_search("?mode=edit"), None);
    /// ```
    pub fn from_search(search: &str) -> Option<Self> {
        let query = search.strip_prefix('?').unwrap_or(search);
        let (_, mode) =
            url::form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == "mode")?;

        match mode.as_ref() {
            "publish" => Some(ClientMode::Publish),
            "revise" => Some(ClientMode::Revise),
            _ => None,
        }
    }

    /// Message tags used by actions in this mode
    pub const fn tags(&self) -> ActionTags {
        match self {
            ClientMode::Publish => ActionTags {
                action: ClientMessage::Publish,
                success: HostMessage::PublishEntrySuccess,
                failure: HostMessage::PublishEntryFailed,
                prevent_navigation: Some(true),
            },
            ClientMode::Revise => ActionTags {
                action: ClientMessage::Revise,
                success: HostMessage::ReviseEntrySuccess,
                failure: HostMessage::ReviseEntryFailed,
                prevent_navigation: None,
            },
        }
    }
}

impl fmt::Display for ClientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode-specific message tags for the single action a client performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTags {
    /// Message that starts the action
    pub action: ClientMessage,
    /// Host message resolving the action successfully
    pub success: HostMessage,
    /// Host message rejecting the action
    pub failure: HostMessage,
    /// `preventNavigation` sent when the query leaves it unset
    pub prevent_navigation: Option<bool>,
}
