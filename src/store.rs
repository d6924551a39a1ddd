use time::OffsetDateTime;

use crate::{
    config::{CookieSessionConfig, EncryptionConfig, EncryptionSettings},
    crypt::Encryptor,
    error::{Error, Result},
    format::Layout,
    guard::CookieSizeGuard,
    transport::CookieTransport,
};

/// The lifecycle a host session framework drives a store through.
///
/// A store serves exactly one session id within one request. Nothing is
/// kept server-side: every operation either reads the request cookie or
/// queues a response cookie through the store's transport.
pub trait SessionHandler {
    fn open(&mut self, save_path: &str, sid: &str) -> Result<()>;

    /// Session payload, or an empty payload when there is no valid session.
    fn read(&mut self, sid: &str) -> Result<Vec<u8>>;

    fn write(&mut self, sid: &str, payload: &[u8]) -> Result<()>;

    fn destroy(&mut self, sid: &str) -> Result<()>;

    fn gc(&mut self, max_lifetime: u64) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
    Destroyed,
}

/// Per-session values captured by `open`.
#[derive(Debug, Clone)]
pub struct OpenSession {
    sid: String,
    attributes: CookieSessionConfig,
    layout: Layout,
}

impl OpenSession {
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Cookie attributes frozen at `open`.
    pub fn attributes(&self) -> &CookieSessionConfig {
        &self.attributes
    }

    /// Tag length of the envelopes this session reads.
    pub fn digest_length(&self) -> usize {
        self.layout.digest_length
    }

    pub fn iv_length(&self) -> usize {
        self.layout.iv_length
    }
}

/// Session store that keeps each session in an encrypted cookie named
/// after the session id.
#[derive(Debug)]
pub struct CookieSessionStore<T: CookieTransport> {
    transport: T,
    config: CookieSessionConfig,
    encryptor: Encryptor,
    state: SessionState,
    session: Option<OpenSession>,
}

impl<T: CookieTransport> CookieSessionStore<T> {
    /// `secret` keys both the cipher (through its digest) and the HMAC tag.
    pub fn new(secret: impl Into<Vec<u8>>, transport: T) -> Self {
        Self {
            transport,
            config: CookieSessionConfig::default(),
            encryptor: Encryptor::new(EncryptionConfig::new(secret)),
            state: SessionState::Closed,
            session: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CookieSessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the whole encryption configuration, secret included.
    #[must_use]
    pub fn with_encryption(mut self, encryption: EncryptionConfig) -> Self {
        self.encryptor = Encryptor::new(encryption);
        self.refresh_layout();
        self
    }

    /// Overrides digest, cipher and expiry by name. Both algorithm names are
    /// checked against the supported set before anything is applied.
    pub fn set_encryption(&mut self, settings: &EncryptionSettings) -> Result<()> {
        self.encryptor.config_mut().apply(settings)?;
        self.refresh_layout();
        tracing::debug!(
            digest = %self.encryptor.config().digest(),
            cipher = %self.encryptor.config().cipher(),
            expiry_seconds = self.encryptor.config().expiry_seconds(),
            "session encryption updated"
        );
        Ok(())
    }

    pub fn encryption(&self) -> &EncryptionConfig {
        self.encryptor.config()
    }

    pub fn config(&self) -> &CookieSessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&OpenSession> {
        self.session.as_ref()
    }

    fn refresh_layout(&mut self) {
        let layout = self.encryptor.layout();
        if let Some(session) = self.session.as_mut() {
            session.layout = layout;
        }
    }

    fn ensure_open(&mut self, sid: &str) {
        if self.state != SessionState::Open {
            self.open_session(sid);
        }
    }

    fn open_session(&mut self, sid: &str) {
        self.session = Some(OpenSession {
            sid: sid.to_owned(),
            attributes: self.config.clone(),
            layout: self.encryptor.layout(),
        });
        self.state = SessionState::Open;
    }

    fn attributes(&self) -> &CookieSessionConfig {
        self.session
            .as_ref()
            .map_or(&self.config, |session| &session.attributes)
    }
}

impl<T: CookieTransport> SessionHandler for CookieSessionStore<T> {
    fn open(&mut self, _save_path: &str, sid: &str) -> Result<()> {
        self.open_session(sid);
        Ok(())
    }

    fn read(&mut self, sid: &str) -> Result<Vec<u8>> {
        self.ensure_open(sid);

        let Some(value) = self.transport.get(sid) else {
            return Ok(Vec::new());
        };

        let layout = self
            .session
            .as_ref()
            .map_or_else(|| self.encryptor.layout(), |session| session.layout);
        let secret = self.encryptor.config().secret();
        let payload = self.encryptor.decrypt_as(
            &value,
            secret,
            sid,
            layout,
            OffsetDateTime::now_utc(),
        )?;
        Ok(payload.unwrap_or_default())
    }

    fn write(&mut self, sid: &str, payload: &[u8]) -> Result<()> {
        self.ensure_open(sid);

        let config = self.encryptor.config();
        let value = self.encryptor.encrypt(payload, config.secret(), sid)?;

        let attributes = self.attributes();
        let guard = CookieSizeGuard::new(attributes.max_cookie_bytes());
        if !guard.fits(value.len(), attributes.name().len(), sid.len()) {
            let size =
                CookieSizeGuard::required(value.len(), attributes.name().len(), sid.len());
            tracing::warn!(size, max = guard.max(), "session cookie too large");
            return Err(Error::CookieSizeExceeded {
                size,
                max: guard.max(),
            });
        }

        let cookie = attributes.build_cookie(sid, value);
        self.transport.set(cookie);
        Ok(())
    }

    fn destroy(&mut self, sid: &str) -> Result<()> {
        // The cookie may have been set under the session path or at the root.
        let attributes = self.attributes();
        self.transport.expire(attributes.removal_cookie(sid, attributes.path()));
        self.transport.expire(attributes.removal_cookie(sid, "/"));

        self.session = None;
        self.state = SessionState::Destroyed;
        Ok(())
    }

    fn gc(&mut self, _max_lifetime: u64) -> Result<()> {
        // Expiry is embedded in every envelope; there is nothing to sweep.
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.session = None;
        self.state = SessionState::Closed;
        Ok(())
    }
}
