//! Server configuration

use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;

use mockmyid_core::issuer::{DEFAULT_ASSERTION_ISSUER, MOCKMYID_DOMAIN};
use mockmyid_core::{Base64Padding, DigestAlgorithm, Issuer, KeyPair, SecurityLevel, TokenOptions};

/// Which key signs certificates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorityKey {
    /// mockmyid.com's published key, so remote verifiers accept the certificates
    #[default]
    Mockmyid,
    /// A fresh key per process, for verifiers that are handed the key directly
    Generated,
}

impl FromStr for AuthorityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mockmyid" => Ok(AuthorityKey::Mockmyid),
            "generated" => Ok(AuthorityKey::Generated),
            other => Err(format!("unknown authority key: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on
    pub address: String,

    /// Port to listen on
    pub port: u16,

    /// Application root (path prefix)
    pub root: String,

    /// Email domain the server speaks for
    pub domain: String,

    /// Issuer written into certificates; the domain when unset
    pub certificate_issuer: Option<String>,

    /// Issuer written into assertions
    pub assertion_issuer: String,

    /// DSA parameter size for generated keys
    pub security_level: SecurityLevel,

    pub digest: DigestAlgorithm,

    pub padding: Base64Padding,

    pub authority: AuthorityKey,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            root: "/".to_string(),
            domain: MOCKMYID_DOMAIN.to_string(),
            certificate_issuer: None,
            assertion_issuer: DEFAULT_ASSERTION_ISSUER.to_string(),
            security_level: SecurityLevel::default(),
            digest: DigestAlgorithm::default(),
            padding: Base64Padding::default(),
            authority: AuthorityKey::default(),
        }
    }
}

impl Config {
    /// The root with exactly one leading and one trailing slash
    pub fn prefix(&self) -> String {
        let root = self.root.trim_matches('/');
        if root.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", root)
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn token_options(&self) -> TokenOptions {
        TokenOptions {
            digest: self.digest,
            padding: self.padding,
        }
    }

    /// Load or generate the authority key and build the issuer around it
    pub fn build_issuer(&self) -> mockmyid_core::Result<Issuer> {
        let authority = match self.authority {
            AuthorityKey::Mockmyid => KeyPair::mockmyid()?,
            AuthorityKey::Generated => KeyPair::generate(self.security_level)?,
        };

        let mut issuer = Issuer::new(Arc::new(authority))
            .with_domain(self.domain.clone())
            .with_assertion_issuer(self.assertion_issuer.clone())
            .with_options(self.token_options());
        if let Some(certificate_issuer) = &self.certificate_issuer {
            issuer = issuer.with_certificate_issuer(certificate_issuer.clone());
        }
        Ok(issuer)
    }
}

/// Command line flags, each with an environment fallback
#[derive(Parser, Debug)]
#[command(name = "mockmyid-server", version, about = "Mock BrowserID identity provider")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "MOCKMYID_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    /// Port to listen on
    #[arg(long, env = "MOCKMYID_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Application root (path prefix)
    #[arg(long, env = "MOCKMYID_ROOT", default_value = "/")]
    pub root: String,

    /// Email domain to issue certificates for
    #[arg(long, env = "MOCKMYID_DOMAIN", default_value = MOCKMYID_DOMAIN)]
    pub domain: String,

    /// Issuer written into certificates [default: the domain]
    #[arg(long, env = "MOCKMYID_CERTIFICATE_ISSUER")]
    pub certificate_issuer: Option<String>,

    /// Issuer written into assertions
    #[arg(long, env = "MOCKMYID_ASSERTION_ISSUER", default_value = DEFAULT_ASSERTION_ISSUER)]
    pub assertion_issuer: String,

    /// DSA parameter size: l1024-n160, l2048-n224, l2048-n256 or l3072-n256
    #[arg(long, env = "MOCKMYID_SECURITY_LEVEL", default_value = "l1024-n160")]
    pub security_level: SecurityLevel,

    /// Digest signed over each token: sha1 or sha256
    #[arg(long, env = "MOCKMYID_DIGEST", default_value = "sha1")]
    pub digest: DigestAlgorithm,

    /// Base64 padding of token segments: padded or unpadded
    #[arg(long, env = "MOCKMYID_PADDING", default_value = "padded")]
    pub padding: Base64Padding,

    /// Certificate signing key: mockmyid or generated
    #[arg(long, env = "MOCKMYID_AUTHORITY", default_value = "mockmyid")]
    pub authority: AuthorityKey,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            address: cli.address,
            port: cli.port,
            root: cli.root,
            domain: cli.domain,
            certificate_issuer: cli.certificate_issuer,
            assertion_issuer: cli.assertion_issuer,
            security_level: cli.security_level,
            digest: cli.digest,
            padding: cli.padding,
            authority: cli.authority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_normalization() {
        let mut config = Config::default();
        assert_eq!(config.prefix(), "/");

        config.root = "/mock".to_string();
        assert_eq!(config.prefix(), "/mock/");

        config.root = "/mock/".to_string();
        assert_eq!(config.prefix(), "/mock/");

        config.root = "persona".to_string();
        assert_eq!(config.prefix(), "/persona/");

        config.root = "//persona//".to_string();
        assert_eq!(config.prefix(), "/persona/");

        config.root = String::new();
        assert_eq!(config.prefix(), "/");
    }

    #[test]
    fn test_relative_root_flag() {
        let config = Config::from(Cli::parse_from(["mockmyid-server", "--root", "persona"]));
        assert_eq!(config.prefix(), "/persona/");
    }

    #[test]
    fn test_cli_defaults_match_config_defaults() {
        let config = Config::from(Cli::parse_from(["mockmyid-server"]));
        let defaults = Config::default();

        assert_eq!(config.listen_addr(), defaults.listen_addr());
        assert_eq!(config.domain, defaults.domain);
        assert_eq!(config.security_level, defaults.security_level);
        assert_eq!(config.token_options(), defaults.token_options());
        assert_eq!(config.authority, defaults.authority);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "mockmyid-server",
            "--port",
            "9000",
            "--root",
            "/persona",
            "--digest",
            "sha256",
            "--padding",
            "unpadded",
            "--security-level",
            "l2048-n256",
        ]);
        let config = Config::from(cli);

        assert_eq!(config.port, 9000);
        assert_eq!(config.prefix(), "/persona/");
        assert_eq!(config.digest, DigestAlgorithm::Sha256);
        assert_eq!(config.padding, Base64Padding::Unpadded);
        assert_eq!(config.security_level, SecurityLevel::L2048N256);
    }

    #[test]
    fn test_default_issuer_uses_mockmyid_key() {
        let issuer = Config::default().build_issuer().unwrap();
        assert_eq!(issuer.domain(), "mockmyid.com");
        assert_eq!(issuer.certificate_issuer(), "mockmyid.com");
        assert_eq!(
            issuer.authority().public_key(),
            KeyPair::mockmyid().unwrap().public_key()
        );
    }

    #[test]
    fn test_certificate_issuer_override() {
        let cli = Cli::parse_from(["mockmyid-server", "--certificate-issuer", "@mockmyid.com"]);
        let config = Config::from(cli);
        assert_eq!(config.certificate_issuer.as_deref(), Some("@mockmyid.com"));

        let issuer = config.build_issuer().unwrap();
        assert_eq!(issuer.certificate_issuer(), "@mockmyid.com");
        assert_eq!(issuer.domain(), "mockmyid.com");
    }
}
