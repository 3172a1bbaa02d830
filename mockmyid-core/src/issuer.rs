//! Backed assertion issuance for the mock provider
//!
//! Format: `<certificate>~<assertion>`

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::webtoken::{TokenOptions, Validity};
use crate::{build_assertion, build_certificate, KeyPair, Result};

/// The email domain the mock provider speaks for
pub const MOCKMYID_DOMAIN: &str = "mockmyid.com";

/// Issuer written into assertions
pub const DEFAULT_ASSERTION_ISSUER: &str = "127.0.0.1";

/// How far certificates and assertions are backdated, so that a verifier
/// with a slightly slower clock already sees them as valid
const CERTIFICATE_ISSUED_OFFSET_SECS: i64 = 30;
const ASSERTION_ISSUED_OFFSET_SECS: i64 = 15;

const CERTIFICATE_VALIDITY_SECS: i64 = 60 * 60;
const ASSERTION_VALIDITY_SECS: i64 = 60 * 60;

/// Join a certificate and an assertion into a backed assertion
pub fn bundle(certificate: &str, assertion: &str) -> String {
    format!("{}~{}", certificate, assertion)
}

/// Issues backed assertions on behalf of one domain
///
/// Holds configuration only. The subject key is passed to every call.
#[derive(Debug, Clone)]
pub struct Issuer {
    domain: String,
    certificate_issuer: String,
    assertion_issuer: String,
    authority: Arc<KeyPair>,
    options: TokenOptions,
    certificate_offset: Duration,
    certificate_validity: Duration,
    assertion_offset: Duration,
    assertion_validity: Duration,
}

impl Issuer {
    /// An issuer for mockmyid.com signing certificates with `authority`
    pub fn new(authority: Arc<KeyPair>) -> Self {
        Self {
            domain: MOCKMYID_DOMAIN.to_string(),
            certificate_issuer: MOCKMYID_DOMAIN.to_string(),
            assertion_issuer: DEFAULT_ASSERTION_ISSUER.to_string(),
            authority,
            options: TokenOptions::default(),
            certificate_offset: Duration::seconds(CERTIFICATE_ISSUED_OFFSET_SECS),
            certificate_validity: Duration::seconds(CERTIFICATE_VALIDITY_SECS),
            assertion_offset: Duration::seconds(ASSERTION_ISSUED_OFFSET_SECS),
            assertion_validity: Duration::seconds(ASSERTION_VALIDITY_SECS),
        }
    }

    /// Speak for another email domain; the certificate issuer follows it
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self.certificate_issuer = self.domain.clone();
        self
    }

    /// Override the `iss` written into certificates
    pub fn with_certificate_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.certificate_issuer = issuer.into();
        self
    }

    pub fn with_assertion_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.assertion_issuer = issuer.into();
        self
    }

    pub fn with_options(mut self, options: TokenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn certificate_issuer(&self) -> &str {
        &self.certificate_issuer
    }

    pub fn authority(&self) -> &KeyPair {
        &self.authority
    }

    pub fn options(&self) -> &TokenOptions {
        &self.options
    }

    /// Issue a backed assertion with explicit validity windows
    pub fn issue_assertion(
        &self,
        subject: &KeyPair,
        email: &str,
        audience: &str,
        certificate_validity: Validity,
        assertion_validity: Validity,
    ) -> Result<String> {
        let certificate = build_certificate(
            subject,
            email,
            &self.domain,
            &self.certificate_issuer,
            certificate_validity,
            &self.authority,
            &self.options,
        )?;
        let assertion = build_assertion(
            subject,
            audience,
            &self.assertion_issuer,
            assertion_validity,
            &self.options,
        )?;

        Ok(bundle(&certificate, &assertion))
    }

    /// Issue a backed assertion valid for an hour from now
    ///
    /// Both halves are backdated slightly to absorb verifier clock skew.
    pub fn issue_short_lived_assertion(
        &self,
        subject: &KeyPair,
        email: &str,
        audience: &str,
    ) -> Result<String> {
        self.issue_short_lived_assertion_at(subject, email, audience, Utc::now())
    }

    fn issue_short_lived_assertion_at(
        &self,
        subject: &KeyPair,
        email: &str,
        audience: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let certificate_validity =
            Validity::starting_at(now - self.certificate_offset, self.certificate_validity);
        let assertion_validity =
            Validity::starting_at(now - self.assertion_offset, self.assertion_validity);

        self.issue_assertion(
            subject,
            email,
            audience,
            certificate_validity,
            assertion_validity,
        )
    }
}
