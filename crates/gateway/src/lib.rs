//! # teleos-gateway - Verification of Teleos publish and revise tokens
//!
//! The Teleos host hands embedded applications RS256-signed JWTs describing a
//! publish or revise request. This crate checks such a token on the
//! application's server and returns its claims in typed form.
//!
//! ## Quick Start
//!
//! ```no_run
//! use teleos_gateway::{verify_publish_token, VerifyOptions};
//!
//! # fn main() -> teleos_gateway::Result<()> {
//! # let token = "";
//! let publish = verify_publish_token(token, None)?;
//! println!("{} publishes for {}", publish.app_id, publish.client_id);
//!
//! // Inspect an expired token instead of rejecting it
//! let publish = verify_publish_token(token, Some(VerifyOptions::allow_expired()))?;
//! assert!(publish.is_expired);
//! # Ok(())
//! # }
//! ```
//!
//! ## Validation Flow
//!
//! ```text
//! token string
//!     │ split_jwt()          exactly three non-empty segments   → InvalidJwt
//!     │ signature check      RS256 against the verifier's key    → InvalidJwtSignature
//!     │ payload decode       JSON object with iat, exp, iss      → InvalidJwtPayload
//!     ▼
//! Claims
//!     │ TokenKind::extract   aid, cid, exp, iat (+ eid, url)     → Assertion failed: …
//!     ▼
//! PublishToken / ReviseToken
//!     │ expiry policy        VerifyOptions::error_if_expired    → TokenExpired
//!     ▼
//! result
//! ```
//!
//! The free functions use the embedded issuer key ([`TELEOS_PUBLIC_KEY`]). To
//! verify against another key, build a [`Verifier`] explicitly.

mod error;

pub(crate) mod claims;
pub(crate) mod jwt;
pub(crate) mod key;
pub(crate) mod limits;
pub(crate) mod utils;
pub(crate) mod verifier;

// Public Interface
pub use claims::{
    extract_payload, extract_publish, extract_revise, is_expired, PublishToken, ReviseToken,
    TokenKind, TokenPayload, TOKEN_ISSUER,
};
pub use error::{Claim, Error, Result, ASSERTION_FAILED};
pub use jwt::{split_jwt, JwtParts};
pub use key::{PublicKey, TELEOS_PUBLIC_KEY};
pub use utils::invariant::invariant;
pub use verifier::{Claims, Verifier, VerifyOptions};

use std::sync::OnceLock;

/// Verifier for the embedded key, parsed once
fn teleos_verifier() -> Result<&'static Verifier> {
    static VERIFIER: OnceLock<Result<Verifier>> = OnceLock::new();
    VERIFIER
        .get_or_init(Verifier::teleos)
        .as_ref()
        .map_err(Clone::clone)
}

/// Verify a publish token against the embedded Teleos key
///
/// `options` defaults to [`VerifyOptions::default`], which rejects expired
/// tokens.
pub fn verify_publish_token(token: &str, options: Option<VerifyOptions>) -> Result<PublishToken> {
    teleos_verifier()?.verify_publish_token(token, options)
}

/// Verify a revise token against the embedded Teleos key
///
/// Like [`verify_publish_token`], and additionally requires the `eid` and
/// `url` claims.
pub fn verify_revise_token(token: &str, options: Option<VerifyOptions>) -> Result<ReviseToken> {
    teleos_verifier()?.verify_revise_token(token, options)
}
