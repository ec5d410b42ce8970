use crate::action::{ActionTracker, PendingAction, DEFAULT_ACTION_TIMEOUT};
use crate::channel::{Channel, HostWindow, InboundMessage, MessageEvent};
use crate::error::{Error, Result};
use crate::message::{ClientMessage, ClientMode, HostMessage};
use crate::settings::Settings;
use crate::types::{FailedResponse, PublishQuery, ReadyOptions, ReadyTicket, SuccessfulResponse};
use miniserde::json::{self, Object, Value};
use miniserde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type ReadyHandler = Arc<dyn Fn(ReadyTicket) + Send + Sync>;

/// Client for an app embedded in the Teleos host
///
/// A client is bound to one [`ClientMode`]: a publisher publishes entries, a
/// reviser revises them. Both share the same lifecycle:
///
/// 1. [`init`](Self::init) (or [`on_ready`](Self::on_ready)) tells the host the
///    app is ready to be shown
/// 2. [`publish`](Self::publish) / [`revise`](Self::revise) start the single
///    action; its handle resolves with the host's answer or times out
/// 3. [`complete`](Self::complete) or [`close_with_error`](Self::close_with_error)
///    ends the session
///
/// Events from the host window are fed in through
/// [`handle_message`](Self::handle_message).
pub struct WebClient {
    mode: ClientMode,
    channel: Channel,
    tracker: Arc<ActionTracker>,
    initialized: AtomicBool,
    ready_handler: Mutex<Option<ReadyHandler>>,
    timeout: Duration,
}

impl WebClient {
    pub fn new(mode: ClientMode, settings: Settings, window: Arc<dyn HostWindow>) -> Self {
        Self {
            mode,
            channel: Channel::new(window, settings),
            tracker: ActionTracker::new(),
            initialized: AtomicBool::new(false),
            ready_handler: Mutex::new(None),
            timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    /// Client for the publish workflow
    pub fn publisher(settings: Settings, window: Arc<dyn HostWindow>) -> Self {
        Self::new(ClientMode::Publish, settings, window)
    }

    /// Client for the revise workflow
    pub fn reviser(settings: Settings, window: Arc<dyn HostWindow>) -> Self {
        Self::new(ClientMode::Revise, settings, window)
    }

    /// Time the host has to answer an action (default 10 seconds)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mode(&self) -> ClientMode {
        self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Mode the host opened the page in, from its `?mode=` parameter
    pub fn page_mode(&self) -> Option<ClientMode> {
        ClientMode::from_search(&self.channel.window().location_search())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Whether no action is waiting for the host
    pub fn is_idle(&self) -> bool {
        self.tracker.is_idle()
    }

    /// Tell the host the app is ready for user interaction
    ///
    /// The host shows its loading animation until this is called. Fails when
    /// called twice, or when the page was opened in another mode than the
    /// client's.
    pub fn init(&self, options: Option<ReadyOptions>) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::AlreadyInitialized);
        }
        if self.page_mode() != Some(self.mode) {
            return Err(Error::WrongMode(self.mode));
        }
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyInitialized);
        }

        let height = self.channel.window().document_height();
        let body = options.unwrap_or_default().to_body(height);
        self.channel.post(ClientMessage::AppReady, Some(body));
        self.channel
            .debug("Host notified that the application is ready", None);

        Ok(())
    }

    /// Register the handler for the host's `readyReceived` message
    ///
    /// Initializes the client with default options first if needed.
    pub fn on_ready<F>(&self, handler: F) -> Result<&Self>
    where
        F: Fn(ReadyTicket) + Send + Sync + 'static,
    {
        if !self.is_initialized() {
            self.init(None)?;
        }

        *self
            .ready_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
        Ok(self)
    }

    /// Ask the host to publish an entry
    ///
    /// Navigation is prevented unless the query says otherwise. Fails
    /// immediately if another action is pending.
    pub fn publish(&self, query: PublishQuery) -> Result<PendingAction> {
        self.start_action(ClientMode::Publish, &query)
    }

    /// Ask the host to revise the entry it opened the app for
    pub fn revise(&self, query: PublishQuery) -> Result<PendingAction> {
        self.start_action(ClientMode::Revise, &query)
    }

    /// Show the host's loading indicator
    ///
    /// Leaving it shown for long makes the host close the app.
    pub fn show_loading(&self) {
        self.channel.post(ClientMessage::ShowLoading, None);
    }

    pub fn hide_loading(&self) {
        self.channel.post(ClientMessage::HideLoading, None);
    }

    /// Tell the host the interaction is over
    ///
    /// Optional after an action succeeded; the host then closes the app on
    /// its own.
    pub fn complete(&self) {
        self.channel.post(ClientMessage::Complete, None);
    }

    /// Report an unexpected error and close the app
    pub fn close_with_error(&self, message: Option<&str>) {
        let mut body = Object::new();
        if let Some(message) = message {
            body.insert("message".into(), Value::String(message.into()));
        }
        self.channel
            .post(ClientMessage::ClientError, Some(Value::Object(body)));
    }

    /// Process a `message` event received by the app's window
    ///
    /// Messages are ignored until the client is initialized.
    pub fn handle_message(&self, event: &MessageEvent) {
        if !self.is_initialized() {
            tracing::debug!("client not initialized, ignoring message");
            return;
        }

        if let Some(inbound) = self.channel.receive(event) {
            self.dispatch(inbound);
        }
    }

    fn start_action(&self, mode: ClientMode, query: &PublishQuery) -> Result<PendingAction> {
        if mode != self.mode {
            return Err(Error::WrongMode(self.mode));
        }

        let tags = self.mode.tags();
        let pending = self.tracker.start(self.timeout)?;
        self.channel
            .post(tags.action, Some(query.to_body(tags.prevent_navigation)));

        Ok(pending)
    }

    fn dispatch(&self, inbound: InboundMessage) {
        let tags = self.mode.tags();

        match inbound.kind() {
            Some(HostMessage::ReadyReceived) => {
                let Some(ticket) = self.read_body::<ReadyTicket>(&inbound) else {
                    return;
                };
                let handler = self
                    .ready_handler
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                match handler {
                    Some(handler) => handler(ticket),
                    None => tracing::debug!("no ready handler registered"),
                }
            }
            Some(kind) if kind == tags.success => {
                if let Some(response) = self.read_body::<SuccessfulResponse>(&inbound) {
                    self.tracker.resolve(Ok(response));
                }
            }
            Some(kind) if kind == tags.failure => {
                // A failure without a readable body still fails the action
                let failed = self
                    .read_body::<FailedResponse>(&inbound)
                    .unwrap_or_default();
                self.tracker.resolve(Err(failed));
            }
            _ => tracing::debug!(message = %inbound.name, "ignoring host message"),
        }
    }

    fn read_body<T: Deserialize>(&self, inbound: &InboundMessage) -> Option<T> {
        match json::from_str(&json::to_string(&inbound.body)) {
            Ok(body) => Some(body),
            Err(_) => {
                tracing::warn!(message = %inbound.name, "unreadable message body");
                None
            }
        }
    }
}

impl Drop for WebClient {
    fn drop(&mut self) {
        self.tracker.abort();
    }
}

impl std::fmt::Debug for WebClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebClient")
            .field("mode", &self.mode)
            .field("initialized", &self.is_initialized())
            .field("idle", &self.is_idle())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
