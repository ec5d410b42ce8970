//! Errors for teleos-webclient

use crate::message::ClientMode;
use crate::types::FailedResponse;
use thiserror::Error;

/// Web client errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Action Errors
    // ============================================================================
    #[error("Another action in progress")]
    ActionInProgress,

    #[error("Operation timeout")]
    OperationTimeout,

    /// The host answered with its failure message
    #[error("Action failed: {}", .0.reason.as_deref().unwrap_or("no reason given"))]
    ActionFailed(FailedResponse),

    /// The client was dropped while the action was pending
    #[error("Action aborted")]
    ActionAborted,

    // ============================================================================
    // Lifecycle Errors
    // ============================================================================
    #[error("App already initialized")]
    AlreadyInitialized,

    #[error("The class can only be used in {0} mode")]
    WrongMode(ClientMode),

    // ============================================================================
    // Message Errors
    // ============================================================================
    #[error("Received message not valid: {0}")]
    InvalidMessage(String),
}

/// Result type alias for web client operations
pub type Result<T> = std::result::Result<T, Error>;
