//! Errors for teleos-gateway
//!
//! The `Display` text of each variant is part of the public contract: callers
//! map these messages to API responses and compare against them.

use std::fmt;
use thiserror::Error;

/// Prefix shared by every assertion failure
pub const ASSERTION_FAILED: &str = "Assertion failed";

/// Claim names checked by the payload extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Claim {
    /// Application identifier (`aid`)
    Aid,
    /// Client identifier (`cid`)
    Cid,
    /// Issued-at timestamp (`iat`)
    Iat,
    /// Expiration timestamp (`exp`)
    Exp,
    /// Entry identifier (`eid`), revise tokens only
    Eid,
    /// Entry URL (`url`), revise tokens only
    Url,
}

impl Claim {
    /// Field name as it appears in the token payload
    pub const fn as_str(&self) -> &'static str {
        match self {
            Claim::Aid => "aid",
            Claim::Cid => "cid",
            Claim::Iat => "iat",
            Claim::Exp => "exp",
            Claim::Eid => "eid",
            Claim::Url => "url",
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway Errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Invalid JWT")]
    InvalidJwt,

    #[error("Invalid JWT: token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Invalid JWT signature")]
    InvalidJwtSignature,

    // ============================================================================
    // Payload Errors
    // ============================================================================
    #[error("Invalid JWT payload")]
    InvalidJwtPayload,

    #[error("Assertion failed: Token is not an object")]
    TokenIsNotObject,

    #[error("Assertion failed: {0} is missing")]
    ClaimMissing(Claim),

    #[error("Assertion failed{}", assertion_label(.0))]
    AssertionFailed(Option<String>),

    // ============================================================================
    // Token Errors
    // ============================================================================
    #[error("Token is expired")]
    TokenExpired,

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid public key: {0}")]
    KeyInvalid(String),
}

impl Error {
    /// Whether the error belongs to the assertion family
    /// (its message starts with "Assertion failed")
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Error::TokenIsNotObject | Error::ClaimMissing(_) | Error::AssertionFailed(_)
        )
    }
}

fn assertion_label(label: &Option<String>) -> String {
    label
        .as_deref()
        .map(|label| format!(": {label}"))
        .unwrap_or_default()
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;
