use std::{borrow::Cow, fmt};

use cookie::{Cookie, SameSite};
use serde::Deserialize;
use time::Duration;
use zeroize::Zeroizing;

use crate::{
    algorithm::{CipherAlgorithm, DigestAlgorithm},
    error::Result,
};

/// Default envelope lifetime: 30 days.
pub const DEFAULT_EXPIRY_SECONDS: u32 = 30 * 24 * 60 * 60;

/// Default session name, counted against the cookie size ceiling.
pub const DEFAULT_SESSION_NAME: &str = "id";

/// The host's default cookie configuration.
///
/// A session copies these attributes when it is opened and keeps that copy
/// until it is closed, so changing the store's configuration mid-request does
/// not affect the cookie written for the current session.
#[derive(Debug, Clone)]
pub struct CookieSessionConfig {
    pub(crate) name: Cow<'static, str>,
    pub(crate) lifetime: Option<Duration>,
    pub(crate) path: Cow<'static, str>,
    pub(crate) domain: Option<Cow<'static, str>>,
    pub(crate) secure: bool,
    pub(crate) http_only: bool,
    pub(crate) same_site: SameSite,
    pub(crate) max_cookie_bytes: usize,
}

impl Default for CookieSessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.into(),
            lifetime: None,
            path: "/".into(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            max_cookie_bytes: crate::guard::MAX_COOKIE_SIZE,
        }
    }
}

impl CookieSessionConfig {
    /// Session name of the host framework. It does not name the data cookie
    /// (that is the session id) but it travels in the same header, so it is
    /// counted against the size ceiling.
    #[must_use]
    pub fn with_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Cookie lifetime. A zero or negative lifetime yields a browser-session
    /// cookie, same as no lifetime at all.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    #[must_use]
    pub fn without_lifetime(mut self) -> Self {
        self.lifetime = None;
        self
    }

    #[must_use]
    pub fn with_path<P: Into<Cow<'static, str>>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_domain<D: Into<Cow<'static, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn without_domain(mut self) -> Self {
        self.domain = None;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    #[must_use]
    pub fn with_max_cookie_bytes(mut self, max_cookie_bytes: usize) -> Self {
        self.max_cookie_bytes = max_cookie_bytes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> SameSite {
        self.same_site
    }

    pub fn max_cookie_bytes(&self) -> usize {
        self.max_cookie_bytes
    }

    pub(crate) fn build_cookie(&self, name: &str, value: String) -> Cookie<'static> {
        let mut cookie_builder = Cookie::build((name.to_owned(), value))
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .path(self.path.clone());

        if let Some(lifetime) = self.lifetime.filter(|lifetime| lifetime.is_positive()) {
            cookie_builder = cookie_builder.max_age(lifetime);
        }

        if let Some(domain) = self.domain.clone() {
            cookie_builder = cookie_builder.domain(domain);
        }

        cookie_builder.build()
    }

    /// Empty cookie that deletes `name` under `path` and the configured
    /// domain.
    pub(crate) fn removal_cookie(&self, name: &str, path: &str) -> Cookie<'static> {
        let mut cookie = Cookie::new(name.to_owned(), "");
        cookie.set_path(path.to_owned());
        if let Some(domain) = self.domain.clone() {
            cookie.set_domain(domain);
        }
        cookie
    }
}

/// Secret and algorithm choices for the envelope.
///
/// `iv_length` and `digest_length` are derived values: every setter that
/// changes an algorithm recomputes them before returning.
#[derive(Clone)]
pub struct EncryptionConfig {
    secret: Zeroizing<Vec<u8>>,
    cipher: CipherAlgorithm,
    digest: DigestAlgorithm,
    iv_length: usize,
    digest_length: usize,
    expiry_seconds: u32,
}

impl EncryptionConfig {
    /// Defaults: `sha256`, `aes-256-ctr`, 30 day expiry.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        let cipher = CipherAlgorithm::Aes256Ctr;
        let digest = DigestAlgorithm::Sha256;
        Self {
            secret: Zeroizing::new(secret.into()),
            cipher,
            digest,
            iv_length: cipher.iv_length(),
            digest_length: digest.output_length(),
            expiry_seconds: DEFAULT_EXPIRY_SECONDS,
        }
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: CipherAlgorithm) -> Self {
        self.cipher = cipher;
        self.rederive();
        self
    }

    #[must_use]
    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self.rederive();
        self
    }

    #[must_use]
    pub fn with_expiry_seconds(mut self, expiry_seconds: u32) -> Self {
        self.expiry_seconds = expiry_seconds;
        self
    }

    /// Selects the cipher by name, e.g. `aes-128-cbc`.
    pub fn set_cipher_algo(&mut self, name: &str) -> Result<()> {
        self.cipher = name.parse()?;
        self.rederive();
        Ok(())
    }

    /// Selects the digest by name, e.g. `sha512`.
    pub fn set_digest_algo(&mut self, name: &str) -> Result<()> {
        self.digest = name.parse()?;
        self.rederive();
        Ok(())
    }

    pub fn set_expiry(&mut self, expiry_seconds: u32) {
        self.expiry_seconds = expiry_seconds;
    }

    /// Applies named overrides. Every name is validated before anything
    /// changes, so a failed call leaves the configuration as it was.
    pub fn apply(&mut self, settings: &EncryptionSettings) -> Result<()> {
        let digest = settings
            .digest
            .as_deref()
            .map(str::parse::<DigestAlgorithm>)
            .transpose()?;
        let cipher = settings
            .cipher
            .as_deref()
            .map(str::parse::<CipherAlgorithm>)
            .transpose()?;

        if let Some(digest) = digest {
            self.digest = digest;
        }
        if let Some(cipher) = cipher {
            self.cipher = cipher;
        }
        if let Some(expiry_seconds) = settings.expiry_seconds {
            self.expiry_seconds = expiry_seconds;
        }
        self.rederive();
        Ok(())
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn cipher(&self) -> CipherAlgorithm {
        self.cipher
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    pub fn iv_length(&self) -> usize {
        self.iv_length
    }

    pub fn digest_length(&self) -> usize {
        self.digest_length
    }

    pub fn expiry_seconds(&self) -> u32 {
        self.expiry_seconds
    }

    fn rederive(&mut self) {
        self.iv_length = self.cipher.iv_length();
        self.digest_length = self.digest.output_length();
    }
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("secret", &"[redacted]")
            .field("cipher", &self.cipher)
            .field("digest", &self.digest)
            .field("iv_length", &self.iv_length)
            .field("digest_length", &self.digest_length)
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

/// Named overrides for [`EncryptionConfig`], e.g. loaded from a config file.
///
/// ```
/// # use sealed_cookie_sessions::EncryptionSettings;
/// let settings = EncryptionSettings::default()
///     .with_digest("sha512")
///     .with_cipher("aes-256-cbc")
///     .with_expiry_seconds(3600);
/// # let _ = settings;
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncryptionSettings {
    pub digest: Option<String>,
    pub cipher: Option<String>,
    pub expiry_seconds: Option<u32>,
}

impl EncryptionSettings {
    #[must_use]
    pub fn with_digest<S: Into<String>>(mut self, digest: S) -> Self {
        self.digest = Some(digest.into());
        self
    }

    #[must_use]
    pub fn with_cipher<S: Into<String>>(mut self, cipher: S) -> Self {
        self.cipher = Some(cipher.into());
        self
    }

    #[must_use]
    pub fn with_expiry_seconds(mut self, expiry_seconds: u32) -> Self {
        self.expiry_seconds = Some(expiry_seconds);
        self
    }
}
