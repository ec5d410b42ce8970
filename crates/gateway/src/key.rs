//! RSA public keys for token verification
//!
//! Keys are accepted as SubjectPublicKeyInfo (`PUBLIC KEY`) or PKCS#1
//! (`RSA PUBLIC KEY`), in PEM or DER form, and stored as the PKCS#1
//! `RSAPublicKey` structure the signature backend consumes.

use crate::error::{Error, Result};
use der::{asn1::UintRef, Decode, Document, Sequence};
use spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use std::sync::Arc;

/// Public key of the Teleos token issuer
///
/// Rotating this key requires a new release.
pub const TELEOS_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAqSMnLBuhWeTK+lgLhdUW
8mNtwl+YDkhFQHbYIMdgYOSEZ1DY9nB8TuIaPGp3cMLFLuslpvQodW8s9Mq29nCS
IlQcwEMya5mIE7lkK7l5W8Lx8kBZrJsbFWpfhlk0sosivCb4dA6eIGkNwMXgJmqa
9V26ASU+rBSjnXARRb08twhQE4zlwuMv36j+BfW7NcedKfo+LwtwXeZTD9VmM0zU
OAmz415Jx7gqKnqOyCVDWF1rUOIkTw27dyWKHu1sBdIkO7rpJPW/vU2eqFyeJ3e5
wGIkNT5HTg4U2CG6FFYXVxF4DzwHgF37jN+XUzLRnYPb77N7Z+a0foi3tiUNS0b7
FQIDAQAB
-----END PUBLIC KEY-----";

const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Modulus sizes accepted by the RS256 verifier
const MIN_MODULUS_BITS: usize = 2048;
const MAX_MODULUS_BITS: usize = 8192;

/// RSAPublicKey as defined in RFC 8017:
/// RSAPublicKey ::= SEQUENCE {
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER   -- e
/// }
#[derive(Sequence)]
struct RsaPublicKeyDer<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// An RSA public key used to check RS256 signatures
///
/// Cloning is cheap; the key bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pkcs1: Arc<[u8]>,
}

impl PublicKey {
    /// Parse a PEM encoded key (`PUBLIC KEY` or `RSA PUBLIC KEY`)
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, document) = Document::from_pem(pem.trim()).map_err(|e| key_error("pem", e))?;

        match label {
            "PUBLIC KEY" => Self::from_der(document.as_bytes()),
            "RSA PUBLIC KEY" => Self::from_pkcs1_der(document.as_bytes()),
            other => Err(Error::KeyInvalid(format!("unsupported PEM label '{other}'"))),
        }
    }

    /// Parse a DER encoded SubjectPublicKeyInfo
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(der).map_err(|e| key_error("spki", e))?;

        if spki.algorithm.oid != RSA_ENCRYPTION_OID {
            return Err(Error::KeyInvalid(format!(
                "expected an RSA key, found algorithm {}",
                spki.algorithm.oid
            )));
        }

        let pkcs1 = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::KeyInvalid("spki: unaligned key bit string".into()))?;

        Self::from_pkcs1_der(pkcs1)
    }

    /// Parse a DER encoded PKCS#1 RSAPublicKey
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let key = RsaPublicKeyDer::from_der(der).map_err(|e| key_error("pkcs1", e))?;

        let bits = modulus_bits(key.modulus.as_bytes());
        if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bits) {
            return Err(Error::KeyInvalid(format!(
                "RSA modulus is {bits} bits (supported: {MIN_MODULUS_BITS}-{MAX_MODULUS_BITS})"
            )));
        }
        if key.public_exponent.as_bytes().is_empty() {
            return Err(Error::KeyInvalid("RSA exponent is empty".into()));
        }

        Ok(Self { pkcs1: der.into() })
    }

    /// The embedded Teleos issuer key
    pub fn teleos() -> Result<Self> {
        Self::from_pem(TELEOS_PUBLIC_KEY)
    }

    /// PKCS#1 RSAPublicKey bytes
    pub fn as_pkcs1_der(&self) -> &[u8] {
        &self.pkcs1
    }

    /// Size of the modulus in bits
    pub fn modulus_bits(&self) -> usize {
        RsaPublicKeyDer::from_der(&self.pkcs1)
            .map(|key| modulus_bits(key.modulus.as_bytes()))
            .unwrap_or_default()
    }
}

fn modulus_bits(modulus: &[u8]) -> usize {
    match modulus.first() {
        Some(first) => modulus.len() * 8 - first.leading_zeros() as usize,
        None => 0,
    }
}

fn key_error(stage: &str, details: impl std::fmt::Display) -> Error {
    Error::KeyInvalid(format!("{stage}: {details}"))
}
