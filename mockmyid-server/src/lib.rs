//! MockMyID Server
//!
//! Serves BrowserID backed assertions for any `@mockmyid.com` address,
//! so automated tests can log in to relying parties without a browser.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{AuthorityKey, Cli, Config};
pub use error::ServerError;
pub use state::AppState;
