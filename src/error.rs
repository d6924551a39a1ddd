use thiserror::Error;

/// Errors raised by the envelope and the session store.
///
/// A forged, corrupted or expired cookie is not an error: it reads back as
/// "no session". Everything here is a developer-facing failure.
#[derive(Debug, Error)]
pub enum Error {
    /// A cipher, digest or RNG primitive failed.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// The encrypted cookie would not fit in a single browser cookie.
    #[error("cookie size exceeded ({size} > {max} bytes)")]
    CookieSizeExceeded { size: usize, max: usize },

    /// An algorithm name is not in the supported set.
    #[error("algorithm not found: {0}")]
    AlgorithmNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn crypto(err: impl std::fmt::Display) -> Self {
        Self::Crypto(err.to_string())
    }
}
