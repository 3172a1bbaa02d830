//! Web token encoding
//!
//! A token is `base64(header).base64(payload).base64(signature)`. The
//! signature is DSA over a digest of the first two segments, serialized as
//! `r || s` with each half left-padded to the byte width of the subgroup
//! order. Verifiers split the buffer at the midpoint, so a short `r` or `s`
//! must never shift the other half.

use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, Duration, Utc};
use num_bigint_dig::BigUint;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use signature::hazmat::PrehashSigner;

use crate::{Error, KeyPair, Result};

/// Hash applied to `header.payload` before signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1, what DS128 verifiers compute
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    pub fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha1 => sha1::Sha1::digest(message).to_vec(),
            DigestAlgorithm::Sha256 => sha2::Sha256::digest(message).to_vec(),
        }
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            other => Err(format!("unknown digest algorithm: {}", other)),
        }
    }
}

/// Whether base64url segments carry `=` padding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base64Padding {
    #[default]
    Padded,
    Unpadded,
}

impl Base64Padding {
    pub fn encode(self, data: impl AsRef<[u8]>) -> String {
        match self {
            Base64Padding::Padded => URL_SAFE.encode(data),
            Base64Padding::Unpadded => URL_SAFE_NO_PAD.encode(data),
        }
    }

    pub fn decode(self, segment: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        match self {
            Base64Padding::Padded => URL_SAFE.decode(segment),
            Base64Padding::Unpadded => URL_SAFE_NO_PAD.decode(segment),
        }
    }
}

impl std::str::FromStr for Base64Padding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "padded" => Ok(Base64Padding::Padded),
            "unpadded" => Ok(Base64Padding::Unpadded),
            other => Err(format!("unknown padding mode: {}", other)),
        }
    }
}

/// Encoding choices shared by every token an issuer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenOptions {
    pub digest: DigestAlgorithm,
    pub padding: Base64Padding,
}

/// The `iat`/`exp` pair carried by every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Validity {
    /// A window starting at `issued_at` and lasting `duration`
    pub fn starting_at(issued_at: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            issued_at,
            expires_at: issued_at + duration,
        }
    }

    /// Milliseconds since the epoch, as BrowserID timestamps are written
    ///
    /// Fails unless `expires_at` is strictly after `issued_at`.
    pub fn to_millis(&self) -> Result<(i64, i64)> {
        let issued_at = self.issued_at.timestamp_millis();
        let expires_at = self.expires_at.timestamp_millis();
        if expires_at <= issued_at {
            return Err(Error::InvalidValidity {
                issued_at,
                expires_at,
            });
        }
        Ok((issued_at, expires_at))
    }
}

/// Token header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
}

/// Encode and sign a payload
///
/// The payload's serde field order is the order that lands on the wire.
pub fn encode<P>(payload: &P, key: &KeyPair, options: &TokenOptions) -> Result<String>
where
    P: Serialize,
{
    let header = Header {
        alg: key.algorithm(),
    };
    let header_json = serde_json::to_vec(&header)?;
    let payload_json = serde_json::to_vec(payload)?;

    let message = format!(
        "{}.{}",
        options.padding.encode(&header_json),
        options.padding.encode(&payload_json)
    );

    let signature = sign(message.as_bytes(), key, options.digest)?;
    let signature_bytes = encode_signature(signature.r(), signature.s(), key.subgroup_len())?;

    Ok(format!("{}.{}", message, options.padding.encode(&signature_bytes)))
}

/// Sign the digest of a message
pub fn sign(message: &[u8], key: &KeyPair, digest: DigestAlgorithm) -> Result<dsa::Signature> {
    let hash = fit_to_width(digest.digest(message), key.subgroup_len());
    key.signing_key()
        .sign_prehash(&hash)
        .map_err(|e| Error::Signing(e.to_string()))
}

// DSA uses the leftmost N bytes of the digest; a shorter digest keeps its
// integer value when left-padded, which is what verifiers compute
fn fit_to_width(mut hash: Vec<u8>, width: usize) -> Vec<u8> {
    if hash.len() >= width {
        hash.truncate(width);
        return hash;
    }
    let mut padded = vec![0u8; width - hash.len()];
    padded.append(&mut hash);
    padded
}

/// Serialize `(r, s)` into a fixed `2 * width` byte buffer
pub fn encode_signature(r: &BigUint, s: &BigUint, width: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; 2 * width];
    let (r_half, s_half) = buf.split_at_mut(width);
    write_right_aligned(r_half, r, "r")?;
    write_right_aligned(s_half, s, "s")?;
    Ok(buf)
}

fn write_right_aligned(dst: &mut [u8], value: &BigUint, name: &str) -> Result<()> {
    let bytes = value.to_bytes_be();
    if bytes.len() > dst.len() {
        return Err(Error::Signing(format!(
            "{} is {} bytes, wider than the {} byte subgroup order",
            name,
            bytes.len(),
            dst.len()
        )));
    }
    let offset = dst.len() - bytes.len();
    dst[offset..].copy_from_slice(&bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_halves_are_left_padded() {
        let r = BigUint::from(0x01u8);
        let s = BigUint::parse_bytes(b"00ff", 16).unwrap();

        let buf = encode_signature(&r, &s, 20).unwrap();

        assert_eq!(buf.len(), 40);
        assert!(buf[..19].iter().all(|b| *b == 0));
        assert_eq!(buf[19], 0x01);
        assert!(buf[20..39].iter().all(|b| *b == 0));
        assert_eq!(buf[39], 0xff);
    }

    #[test]
    fn test_full_width_halves_fill_buffer() {
        let r = BigUint::from_bytes_be(&[0xab; 20]);
        let s = BigUint::from_bytes_be(&[0xcd; 20]);

        let buf = encode_signature(&r, &s, 20).unwrap();

        assert_eq!(&buf[..20], &[0xab; 20]);
        assert_eq!(&buf[20..], &[0xcd; 20]);
    }

    #[test]
    fn test_oversized_half_rejected() {
        let r = BigUint::from_bytes_be(&[0x01; 21]);
        let s = BigUint::from(7u8);

        let result = encode_signature(&r, &s, 20);
        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[test]
    fn test_validity_in_millis() {
        let issued_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let validity = Validity::starting_at(issued_at, Duration::hours(1));

        let (iat, exp) = validity.to_millis().unwrap();
        assert_eq!(iat, 1_700_000_000_000);
        assert_eq!(exp - iat, 3_600_000);
    }

    #[test]
    fn test_empty_validity_rejected() {
        let now = Utc::now();
        let validity = Validity {
            issued_at: now,
            expires_at: now,
        };
        assert!(matches!(validity.to_millis(), Err(Error::InvalidValidity { .. })));
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width(vec![1, 2, 3, 4], 2), vec![1, 2]);
        assert_eq!(fit_to_width(vec![1, 2], 4), vec![0, 0, 1, 2]);
        assert_eq!(fit_to_width(vec![1, 2], 2), vec![1, 2]);
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(DigestAlgorithm::Sha1.digest(b"abc").len(), 20);
        assert_eq!(DigestAlgorithm::Sha256.digest(b"abc").len(), 32);
    }

    #[test]
    fn test_padding_modes() {
        // 1 byte forces padding in standard base64
        assert_eq!(Base64Padding::Padded.encode([0xfb]), "-w==");
        assert_eq!(Base64Padding::Unpadded.encode([0xfb]), "-w");
        assert_eq!(Base64Padding::Unpadded.decode("-w").unwrap(), vec![0xfb]);
    }

    #[test]
    fn test_encode_has_three_segments() {
        let key = KeyPair::mockmyid().unwrap();
        let payload = serde_json::json!({ "aud": "http://example.test" });

        let token = encode(&payload, &key, &TokenOptions::default()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        assert_eq!(parts.len(), 3);
        let header: Header =
            serde_json::from_slice(&Base64Padding::Padded.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header.alg, "DS128");
        assert_eq!(Base64Padding::Padded.decode(parts[2]).unwrap().len(), 40);
    }
}
