//! DSA key types for MockMyID
//!
//! BrowserID's `DS` algorithm family is plain DSA. The header algorithm
//! tag carries the modulus size in bytes (`DS128` for 1024-bit keys) and
//! the signature halves are as wide as the subgroup order.

use std::fmt;
use std::str::FromStr;

use dsa::{Components, KeySize, SigningKey, VerifyingKey};
use num_bigint_dig::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// mockmyid.com's published domain key. Verifiers fetch the public half
/// from mockmyid.com, so certificates signed with it check out remotely.
const MOCKMYID_P: &str = "ff600483db6abfc5b45eab78594b3533d550d9f1bf2a992a7a8daa6dc34f8045ad4e6e0c429d334eeeaaefd7e23d4810be00e4cc1492cba325ba81ff2d5a5b305a8d17eb3bf4a06a349d392e00d329744a5179380344e82a18c47933438f891e22aeef812d69c8f75e326cb70ea000c3f776dfdbd604638c2ef717fc26d02e17";
const MOCKMYID_Q: &str = "e21e04f911d1ed7991008ecaab3bf775984309c3";
const MOCKMYID_G: &str = "c52a4a0ff3b7e61fdf1867ce84138369a6154f4afa92966e3c827e25cfa6cf508b90e5de419e1337e07a2e9e2a3cd5dea704d175f8ebf6af397d69e110b96afb17c7a03259329e4829b0d03bbc7896b15b4ade53e130858cc34d96269aa89041f409136c7242a38895c9d5bccad4f389af1d7a4bd1398bd072dffa896233397a";
const MOCKMYID_Y: &str = "738ec929b559b604a232a9b55a5295afc368063bb9c20fac4e53a74970a4db7956d48e4c7ed523405f629b4cc83062f13029c4d615bbacb8b97f5e56f0c7ac9bc1d4e23809889fa061425c984061fca1826040c399715ce7ed385c4dd0d402256912451e03452d3c961614eb458f188e3e8d2782916c43dbe2e571251ce38262";
const MOCKMYID_X: &str = "385cb3509f086e110c5e24bdd395a84b335a09ae";

/// DSA domain parameter sizes (modulus bits / subgroup order bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityLevel {
    /// 1024/160, what BrowserID verifiers historically expect (`DS128`)
    #[default]
    L1024N160,
    L2048N224,
    L2048N256,
    L3072N256,
}

impl SecurityLevel {
    #[allow(deprecated)]
    fn key_size(self) -> KeySize {
        match self {
            SecurityLevel::L1024N160 => KeySize::DSA_1024_160,
            SecurityLevel::L2048N224 => KeySize::DSA_2048_224,
            SecurityLevel::L2048N256 => KeySize::DSA_2048_256,
            SecurityLevel::L3072N256 => KeySize::DSA_3072_256,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::L1024N160 => "l1024-n160",
            SecurityLevel::L2048N224 => "l2048-n224",
            SecurityLevel::L2048N256 => "l2048-n256",
            SecurityLevel::L3072N256 => "l3072-n256",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l1024-n160" | "1024" => Ok(SecurityLevel::L1024N160),
            "l2048-n224" => Ok(SecurityLevel::L2048N224),
            "l2048-n256" | "2048" => Ok(SecurityLevel::L2048N256),
            "l3072-n256" | "3072" => Ok(SecurityLevel::L3072N256),
            other => Err(format!("unknown security level: {}", other)),
        }
    }
}

/// The public half of a DSA key as BrowserID publishes it
///
/// All numbers are lowercase hex without leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub algorithm: String,
    pub y: String,
    pub p: String,
    pub q: String,
    pub g: String,
}

impl PublicKey {
    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let components = key.components();
        Self {
            algorithm: "DS".to_string(),
            y: key.y().to_str_radix(16),
            p: components.p().to_str_radix(16),
            q: components.q().to_str_radix(16),
            g: components.g().to_str_radix(16),
        }
    }
}

/// A DSA keypair that can sign BrowserID tokens
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate fresh domain parameters and a keypair under them
    ///
    /// Parameter search is probabilistic and can take a noticeable amount
    /// of CPU time at the larger sizes.
    pub fn generate(level: SecurityLevel) -> Result<Self> {
        let mut rng = OsRng;

        // Components::generate cannot report an RNG failure, so probe first
        let mut probe = [0u8; 32];
        rng.try_fill_bytes(&mut probe)
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;

        let components = Components::generate(&mut rng, level.key_size());
        let signing_key = SigningKey::generate(&mut rng, components);
        tracing::debug!(%level, "Generated DSA keypair");

        Ok(Self::from_signing_key(signing_key))
    }

    /// Rebuild a keypair from hex encoded components
    pub fn from_hex(p: &str, q: &str, g: &str, y: &str, x: &str) -> Result<Self> {
        let components = Components::from_components(
            parse_hex("p", p)?,
            parse_hex("q", q)?,
            parse_hex("g", g)?,
        )
        .map_err(|e| Error::InvalidKey(format!("domain parameters rejected: {}", e)))?;
        let verifying_key = VerifyingKey::from_components(components, parse_hex("y", y)?)
            .map_err(|e| Error::InvalidKey(format!("public value rejected: {}", e)))?;
        let signing_key = SigningKey::from_components(verifying_key, parse_hex("x", x)?)
            .map_err(|e| Error::InvalidKey(format!("private exponent rejected: {}", e)))?;

        Ok(Self::from_signing_key(signing_key))
    }

    /// The mockmyid.com domain key
    pub fn mockmyid() -> Result<Self> {
        Self::from_hex(MOCKMYID_P, MOCKMYID_Q, MOCKMYID_G, MOCKMYID_Y, MOCKMYID_X)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Get the public key document
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Byte length of the prime modulus p
    pub fn modulus_len(&self) -> usize {
        (self.components().p().bits() + 7) / 8
    }

    /// Byte length of the subgroup order q, the width of each signature half
    pub fn subgroup_len(&self) -> usize {
        (self.components().q().bits() + 7) / 8
    }

    /// The JWS algorithm tag for tokens signed by this key, e.g. `DS128`
    pub fn algorithm(&self) -> String {
        format!("DS{}", self.modulus_len())
    }

    /// Get the underlying DSA verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    fn components(&self) -> &Components {
        self.signing_key.verifying_key().components()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

fn parse_hex(name: &str, value: &str) -> Result<BigUint> {
    BigUint::parse_bytes(value.as_bytes(), 16)
        .ok_or_else(|| Error::InvalidKey(format!("{} is not valid hex", name)))
}
