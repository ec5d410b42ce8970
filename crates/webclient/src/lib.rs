//! # teleos-webclient - Client side of the Teleos host protocol
//!
//! Apps embedded in the Teleos host talk to it through `postMessage`. This
//! crate implements the app's side: announcing readiness, asking the host to
//! publish or revise an entry, and waiting for the answer.
//!
//! The browser is reached through the [`HostWindow`] trait; inbound `message`
//! events are handed to [`WebClient::handle_message`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use teleos_webclient::{HostWindow, PublishQuery, Settings, WebClient};
//!
//! # async fn run(window: Arc<dyn HostWindow>) -> teleos_webclient::Result<()> {
//! let settings = Settings::new("my-app", "app-token");
//! let client = WebClient::publisher(settings, window);
//!
//! client.on_ready(|ticket| println!("ready for client {}", ticket.client_id))?;
//!
//! // Resolved by a later `publishEntrySuccess` or failed after the timeout
//! let response = client.publish(PublishQuery::new("https://example.com"))?.await?;
//! println!("published entry {}", response.entry_id);
//!
//! client.complete();
//! # Ok(())
//! # }
//! ```
//!
//! Only one action can be pending per client; starting a second one fails
//! with [`Error::ActionInProgress`] instead of queueing.

mod action;
mod channel;
mod client;
mod error;
mod message;
mod settings;
mod types;

pub use action::{PendingAction, DEFAULT_ACTION_TIMEOUT};
pub use channel::{HostWindow, MessageEvent};
pub use client::WebClient;
pub use error::{Error, Result};
pub use message::{
    ActionTags, ClientMessage, ClientMode, HostMessage, BASE_ORIGIN, CLIENT_SOURCE, HOST_SOURCE,
};
pub use settings::{DebugSink, Meta, Settings};
pub use types::{FailedResponse, PublishQuery, ReadyOptions, ReadyTicket, SuccessfulResponse};
