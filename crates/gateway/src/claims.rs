//! Token payload extraction
//!
//! Extraction narrows an untyped JSON value in two stages: first into a
//! [`TokenPayload`] holding the raw claims, then into the result handed to
//! callers ([`PublishToken`] or [`ReviseToken`]) with timestamps in
//! milliseconds.
//!
//! Presence follows the issuer's conventions: an empty string or a zero
//! number counts as missing.

use crate::error::{Claim, Error, Result};
use miniserde::json::{Number, Object, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Issuer tag carried by every Teleos token (`iss`)
pub const TOKEN_ISSUER: &str = "ToSv1";

/// Claims of a token as issued, before projection
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload {
    /// Application ID (`aid`)
    pub aid: String,
    /// Client ID (`cid`)
    pub cid: String,
    /// Issued-at, seconds since the Unix epoch (`iat`)
    pub iat: f64,
    /// Expiration, seconds since the Unix epoch (`exp`)
    pub exp: f64,
    /// Issuer tag (`iss`)
    pub iss: Option<String>,
    /// Entry ID (`eid`)
    pub eid: Option<String>,
    /// Entry URL (`url`)
    pub url: Option<String>,
}

/// A verified publish token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishToken {
    /// Application the token was issued for
    pub app_id: String,
    /// Customer the request belongs to
    pub client_id: String,
    /// Issue time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Expiration time in milliseconds since the Unix epoch
    pub expiration_at: i64,
    /// Whether `expiration_at` was in the past at extraction time
    pub is_expired: bool,
}

/// A verified revise token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseToken {
    /// Application the token was issued for
    pub app_id: String,
    /// Customer the request belongs to
    pub client_id: String,
    /// Issue time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Expiration time in milliseconds since the Unix epoch
    pub expiration_at: i64,
    /// Whether `expiration_at` was in the past at extraction time
    pub is_expired: bool,
    /// Entry being revised
    pub entry_id: String,
    /// URL of the entry being revised
    pub url: String,
}

/// A token shape that can be extracted from verified claims
///
/// Implemented by [`PublishToken`] and [`ReviseToken`]; the verifier is
/// generic over it.
pub trait TokenKind: Sized {
    /// Narrow claims into this token shape
    fn extract(claims: &Value) -> Result<Self>;

    /// Whether the token was expired when extracted
    fn is_expired(&self) -> bool;
}

impl TokenKind for PublishToken {
    fn extract(claims: &Value) -> Result<Self> {
        extract_publish(claims)
    }

    fn is_expired(&self) -> bool {
        self.is_expired
    }
}

impl TokenKind for ReviseToken {
    fn extract(claims: &Value) -> Result<Self> {
        extract_revise(claims)
    }

    fn is_expired(&self) -> bool {
        self.is_expired
    }
}

/// Validate the shared claims and build a [`TokenPayload`]
pub fn extract_payload(claims: &Value) -> Result<TokenPayload> {
    let Value::Object(object) = claims else {
        return Err(Error::TokenIsNotObject);
    };

    let aid = required_string(object, Claim::Aid)?;
    let cid = required_string(object, Claim::Cid)?;
    let exp = required_number(object, Claim::Exp)?;
    let iat = required_number(object, Claim::Iat)?;

    Ok(TokenPayload {
        aid,
        cid,
        iat,
        exp,
        iss: optional_string(object, "iss"),
        eid: optional_string(object, Claim::Eid.as_str()),
        url: optional_string(object, Claim::Url.as_str()),
    })
}

/// Extract a publish token from claims
pub fn extract_publish(claims: &Value) -> Result<PublishToken> {
    let payload = extract_payload(claims)?;
    Ok(project(&payload))
}

/// Extract a revise token from claims
///
/// Requires everything a publish token does, plus non-empty `eid` and `url`.
pub fn extract_revise(claims: &Value) -> Result<ReviseToken> {
    let payload = extract_payload(claims)?;
    let publish = project(&payload);

    let entry_id = payload
        .eid
        .filter(|eid| !eid.is_empty())
        .ok_or(Error::ClaimMissing(Claim::Eid))?;
    let url = payload
        .url
        .filter(|url| !url.is_empty())
        .ok_or(Error::ClaimMissing(Claim::Url))?;

    Ok(ReviseToken {
        app_id: publish.app_id,
        client_id: publish.client_id,
        created_at: publish.created_at,
        expiration_at: publish.expiration_at,
        is_expired: publish.is_expired,
        entry_id,
        url,
    })
}

/// Whether a token expiring at `exp` (seconds) has expired
///
/// Evaluated against the wall clock on every call.
pub fn is_expired(exp: f64) -> bool {
    to_millis(exp) < current_timestamp_millis()
}

fn project(payload: &TokenPayload) -> PublishToken {
    PublishToken {
        app_id: payload.aid.clone(),
        client_id: payload.cid.clone(),
        created_at: to_millis(payload.iat),
        expiration_at: to_millis(payload.exp),
        is_expired: is_expired(payload.exp),
    }
}

fn required_string(object: &Object, claim: Claim) -> Result<String> {
    let value = optional_string(object, claim.as_str()).filter(|s| !s.is_empty());
    value.ok_or(Error::ClaimMissing(claim))
}

fn required_number(object: &Object, claim: Claim) -> Result<f64> {
    let value = object
        .get(claim.as_str())
        .and_then(number)
        .filter(|n| *n != 0.0);
    value.ok_or(Error::ClaimMissing(claim))
}

fn optional_string(object: &Object, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Numeric value of a JSON number
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(Number::U64(n)) => Some(*n as f64),
        Value::Number(Number::I64(n)) => Some(*n as f64),
        Value::Number(Number::F64(n)) => Some(*n),
        _ => None,
    }
}

fn to_millis(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Get current Unix timestamp in milliseconds
fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_millis() as i64
}
