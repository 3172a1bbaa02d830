//! Identity assertions
//!
//! An assertion proves possession of the certified key to a relying
//! party. It carries no principal; the certificate supplies that.

use serde::{Deserialize, Serialize};

use crate::webtoken::{self, TokenOptions, Validity};
use crate::{KeyPair, Result};

/// Claims in an identity assertion
///
/// Field order is the serialized order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionPayload {
    pub iss: String,

    /// Issued at (milliseconds since the epoch)
    pub iat: i64,

    /// Expiration time (milliseconds since the epoch)
    pub exp: i64,

    /// Audience (the relying party origin this assertion is for)
    pub aud: String,
}

impl AssertionPayload {
    pub fn new(issuer: &str, audience: &str, validity: Validity) -> Result<Self> {
        let (iat, exp) = validity.to_millis()?;
        Ok(Self {
            iss: issuer.to_string(),
            iat,
            exp,
            aud: audience.to_string(),
        })
    }
}

/// Create an assertion signed by the subject's own key
///
/// The audience is passed through verbatim.
pub fn build_assertion(
    subject: &KeyPair,
    audience: &str,
    issuer: &str,
    validity: Validity,
    options: &TokenOptions,
) -> Result<String> {
    let payload = AssertionPayload::new(issuer, audience, validity)?;
    webtoken::encode(&payload, subject, options)
}
