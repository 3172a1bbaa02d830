//! Identity certificates
//!
//! A certificate binds a user's public key to their email address,
//! signed by the domain's key.

use serde::{Deserialize, Serialize};

use crate::webtoken::{self, TokenOptions, Validity};
use crate::{KeyPair, PublicKey, Result};

/// Principal identifier in a certificate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Principal {
    /// Email address principal
    Email { email: String },
}

impl Principal {
    /// Create an email principal
    pub fn email(email: impl Into<String>) -> Self {
        Principal::Email {
            email: email.into(),
        }
    }

    /// Get the email address if this is an email principal
    pub fn as_email(&self) -> Option<&str> {
        match self {
            Principal::Email { email } => Some(email),
        }
    }
}

/// Claims in an identity certificate
///
/// Field order is the serialized order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificatePayload {
    /// The principal (email address)
    pub principal: Principal,

    /// The user's public key
    #[serde(rename = "public-key")]
    pub public_key: PublicKey,

    /// Issuer (the domain that signed this certificate)
    pub iss: String,

    /// Issued at (milliseconds since the epoch)
    pub iat: i64,

    /// Always empty for certificates
    pub aud: String,

    /// Expiration time (milliseconds since the epoch)
    pub exp: i64,
}

impl CertificatePayload {
    pub fn new(
        public_key: &PublicKey,
        email: &str,
        issuer: &str,
        validity: Validity,
    ) -> Result<Self> {
        let (iat, exp) = validity.to_millis()?;
        Ok(Self {
            principal: Principal::email(email),
            public_key: public_key.clone(),
            iss: issuer.to_string(),
            iat,
            aud: String::new(),
            exp,
        })
    }
}

/// Append `@domain` unless the address already ends with it
pub fn qualify_email(email: &str, domain: &str) -> String {
    let suffix = format!("@{}", domain);
    if email.ends_with(&suffix) {
        email.to_string()
    } else {
        format!("{}{}", email, suffix)
    }
}

/// Create and sign a certificate
///
/// # Arguments
/// * `subject` - The user's keypair; only its public half is embedded
/// * `email` - The user's address, qualified with `domain` if needed
/// * `domain` - The email domain this provider speaks for
/// * `issuer` - The issuer written into `iss`
/// * `validity` - The certificate's `iat`/`exp` window
/// * `authority` - The domain key that vouches for the binding
pub fn build_certificate(
    subject: &KeyPair,
    email: &str,
    domain: &str,
    issuer: &str,
    validity: Validity,
    authority: &KeyPair,
    options: &TokenOptions,
) -> Result<String> {
    let email = qualify_email(email, domain);
    let payload = CertificatePayload::new(subject.public_key(), &email, issuer, validity)?;
    webtoken::encode(&payload, authority, options)
}
