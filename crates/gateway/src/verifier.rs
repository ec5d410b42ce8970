use crate::claims::{self, PublishToken, ReviseToken, TokenKind};
use crate::error::{Error, Result};
use crate::jwt::{split_jwt, JwtParts};
use crate::key::PublicKey;
use crate::limits::{MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE, MAX_TOKEN_LENGTH};
use crate::utils::base64url;
use crate::utils::invariant::ensure;
use aws_lc_rs::signature::{UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA256};
use miniserde::json::{Object, Value};

/// Options for token verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Fail with [`Error::TokenExpired`] when the token is expired
    ///
    /// Defaults to `true`. When `false`, expired tokens are returned with
    /// `is_expired` set.
    pub error_if_expired: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            error_if_expired: true,
        }
    }
}

impl VerifyOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that return expired tokens instead of failing
    pub fn allow_expired() -> Self {
        Self::default().error_if_expired(false)
    }

    /// Set whether an expired token is an error
    pub fn error_if_expired(mut self, error_if_expired: bool) -> Self {
        self.error_if_expired = error_if_expired;
        self
    }
}

/// Claims of a token whose signature has been verified
///
/// Guaranteed to be a JSON object with numeric `iat` and `exp` and a string
/// `iss`; all other fields are unchecked until extracted.
pub struct Claims {
    value: Value,
}

impl Claims {
    /// Look up a claim by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.object().and_then(|object| object.get(name))
    }

    /// Issuer tag (`iss`)
    pub fn issuer(&self) -> Option<&str> {
        match self.get("iss") {
            Some(Value::String(iss)) => Some(iss),
            _ => None,
        }
    }

    /// The claims as a JSON value
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consume into the underlying JSON value
    pub fn into_value(self) -> Value {
        self.value
    }

    fn object(&self) -> Option<&Object> {
        match &self.value {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Claims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Claims")
            .field(&miniserde::json::to_string(&self.value))
            .finish()
    }
}

/// JWT verifier bound to one RSA public key
///
/// Verification is stateless; a verifier can be shared across threads and
/// reused for any number of tokens. Rotating keys means building a new
/// verifier.
#[derive(Debug, Clone)]
pub struct Verifier {
    key: PublicKey,
}

impl Verifier {
    /// Create a verifier for the given key
    pub fn new(key: PublicKey) -> Self {
        Self { key }
    }

    /// Create a verifier from a PEM encoded public key
    pub fn from_pem(pem: &str) -> Result<Self> {
        PublicKey::from_pem(pem).map(Self::new)
    }

    /// Create a verifier from a DER encoded SubjectPublicKeyInfo
    pub fn from_der(der: &[u8]) -> Result<Self> {
        PublicKey::from_der(der).map(Self::new)
    }

    /// Create a verifier for the embedded Teleos issuer key
    pub fn teleos() -> Result<Self> {
        PublicKey::teleos().map(Self::new)
    }

    /// The key signatures are checked against
    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    /// Verify a JWT and return its claims
    ///
    /// The signature is checked before the payload is decoded; nothing in the
    /// payload is looked at for a token that is not signed by the key.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        // 1. Bound the input
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(Error::TokenTooLarge {
                size: token.len(),
                max: MAX_TOKEN_LENGTH,
            });
        }

        // 2. Check token format (header, body, signature)
        let parts = split_jwt(token)?;

        // 3. Verify signature
        self.verify_signature(&parts)?;

        // 4. Decode and parse payload
        let value = decode_payload(parts.body)?;

        // 5. Check registered claims
        ensure(has_registered_claims(&value), || Error::InvalidJwtPayload)?;

        Ok(Claims { value })
    }

    /// Verify a token and extract it as `T`
    ///
    /// Expiry is an error unless `options.error_if_expired` is `false`.
    pub fn verify_dry<T: TokenKind>(&self, token: &str, options: VerifyOptions) -> Result<T> {
        let claims = self.verify(token)?;
        let payload = T::extract(claims.as_value())?;

        if options.error_if_expired && payload.is_expired() {
            return Err(Error::TokenExpired);
        }

        Ok(payload)
    }

    /// Verify a publish token
    pub fn verify_publish_token(
        &self,
        token: &str,
        options: Option<VerifyOptions>,
    ) -> Result<PublishToken> {
        self.verify_dry(token, options.unwrap_or_default())
    }

    /// Verify a revise token
    pub fn verify_revise_token(
        &self,
        token: &str,
        options: Option<VerifyOptions>,
    ) -> Result<ReviseToken> {
        self.verify_dry(token, options.unwrap_or_default())
    }

    fn verify_signature(&self, parts: &JwtParts<'_>) -> Result<()> {
        let signature = base64url::decode_bytes(parts.signature, MAX_DECODED_SIGNATURE_SIZE)
            .ok_or(Error::InvalidJwtSignature)?;

        UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, self.key.as_pkcs1_der())
            .verify(parts.signing_input().as_bytes(), &signature)
            .map_err(|_| Error::InvalidJwtSignature)
    }
}

fn decode_payload(body: &str) -> Result<Value> {
    let json =
        base64url::decode_string(body, MAX_DECODED_PAYLOAD_SIZE).ok_or(Error::InvalidJwtPayload)?;

    miniserde::json::from_str(&json).map_err(|_| Error::InvalidJwtPayload)
}

/// Object with non-zero numeric `iat` and `exp` and a non-empty string `iss`
fn has_registered_claims(value: &Value) -> bool {
    let Value::Object(object) = value else {
        return false;
    };

    let timestamp = |name: &str| {
        object
            .get(name)
            .and_then(claims::number)
            .is_some_and(|n| n != 0.0)
    };
    let issuer = matches!(object.get("iss"), Some(Value::String(iss)) if !iss.is_empty());

    timestamp("iat") && issuer && timestamp("exp")
}
