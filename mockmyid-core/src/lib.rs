//! MockMyID Core Library
//!
//! Issues BrowserID tokens on behalf of the mockmyid.com test domain:
//! - Certificates bind an email to a user's DSA public key, signed by the domain key
//! - Assertions bind a relying party audience to a time window, signed by the user key
//! - Backed assertions join the two with `~` so a verifier can check them offline

pub mod assertion;
pub mod certificate;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod webtoken;

pub use assertion::{build_assertion, AssertionPayload};
pub use certificate::{build_certificate, qualify_email, CertificatePayload, Principal};
pub use error::Error;
pub use issuer::{bundle, Issuer};
pub use keys::{KeyPair, PublicKey, SecurityLevel};
pub use webtoken::{Base64Padding, DigestAlgorithm, TokenOptions, Validity};

/// Result type for mockmyid-core operations
pub type Result<T> = std::result::Result<T, Error>;
