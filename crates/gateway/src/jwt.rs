//! Compact JWT serialization: `header.body.signature`

use crate::error::{Error, Result};

/// The three Base64URL segments of a compact JWT
///
/// Segments borrow from the token string; nothing is decoded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtParts<'a> {
    /// Encoded header segment
    pub header: &'a str,
    /// Encoded payload segment
    pub body: &'a str,
    /// Encoded signature segment
    pub signature: &'a str,
}

impl JwtParts<'_> {
    /// The bytes covered by the signature (`header.body`)
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.body)
    }
}

/// Split a JWT into header, body and signature
///
/// Fails with [`Error::InvalidJwt`] unless the token consists of exactly
/// three non-empty segments separated by `.`.
///
/// # Example
/// ```
/// use teleos_gateway::split_jwt;
///
/// let parts = split_jwt("111.222.333").unwrap();
/// assert_eq!((parts.header, parts.body, parts.signature), ("111", "222", "333"));
/// ```
pub fn split_jwt(token: &str) -> Result<JwtParts<'_>> {
    let mut parts = token.split('.');
    let header = parts.next().ok_or(Error::InvalidJwt)?;
    let body = parts.next().ok_or(Error::InvalidJwt)?;
    let signature = parts.next().ok_or(Error::InvalidJwt)?;
    if parts.next().is_some() {
        return Err(Error::InvalidJwt);
    }

    if header.is_empty() || body.is_empty() || signature.is_empty() {
        return Err(Error::InvalidJwt);
    }

    Ok(JwtParts {
        header,
        body,
        signature,
    })
}
