//! Stateless sessions kept in encrypted, authenticated, expiring cookies.
//!
//! Nothing about a session lives on the server. [`CookieSessionStore`]
//! seals the opaque session payload into a cookie named after the session
//! id and opens it again on the next request. The host session framework
//! drives the store through the [`SessionHandler`] lifecycle and supplies a
//! [`CookieTransport`] for the request being served.
//!
//! # Envelope
//! The cookie value is `base64(tag || expiry || iv || ciphertext)`:
//! - `ciphertext` is the payload under the configured cipher, keyed with the
//!   digest of the secret and a fresh random IV.
//! - `expiry` is a little-endian `u32` unix timestamp.
//! - `tag` is an HMAC over the session id followed by `expiry || iv ||
//!   ciphertext`, so a cookie is only accepted for the session id it was
//!   issued to.
//!
//! A forged, corrupted or expired cookie reads back as an empty payload, the
//! same as no cookie at all. Configuration mistakes and oversized payloads
//! are reported as [`Error`]s.
//!
//! # Limitations
//! Two concurrent requests writing the same session race in the browser: the
//! last `Set-Cookie` it processes wins.

mod algorithm;
mod config;
mod crypt;
mod error;
pub mod format;
mod guard;
mod store;
mod transport;

pub use cookie::{Cookie, SameSite};

pub use crate::algorithm::{CipherAlgorithm, DigestAlgorithm};
pub use crate::config::{
    CookieSessionConfig, DEFAULT_EXPIRY_SECONDS, DEFAULT_SESSION_NAME, EncryptionConfig,
    EncryptionSettings,
};
pub use crate::crypt::Encryptor;
pub use crate::error::{Error, Result};
pub use crate::guard::{CookieSizeGuard, MAX_COOKIE_SIZE, SLACK};
pub use crate::store::{CookieSessionStore, OpenSession, SessionHandler, SessionState};
pub use crate::transport::CookieTransport;
