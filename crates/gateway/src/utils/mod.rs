//! Utility functions

pub(crate) mod base64url;
pub mod invariant;
