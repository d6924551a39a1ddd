//! Cipher and digest algorithms available to the envelope.
//!
//! Names follow the OpenSSL spelling (`aes-256-ctr`, `sha256`) and are
//! matched case-insensitively. The `ALL` lists are the supported set every
//! configured name is validated against.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::Error;

/// Symmetric cipher used to encrypt the session payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum CipherAlgorithm {
    Aes128Ctr,
    Aes192Ctr,
    Aes256Ctr,
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
}

impl CipherAlgorithm {
    pub const ALL: &'static [CipherAlgorithm] = &[
        Self::Aes128Ctr,
        Self::Aes192Ctr,
        Self::Aes256Ctr,
        Self::Aes128Cbc,
        Self::Aes192Cbc,
        Self::Aes256Cbc,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Aes128Ctr => "aes-128-ctr",
            Self::Aes192Ctr => "aes-192-ctr",
            Self::Aes256Ctr => "aes-256-ctr",
            Self::Aes128Cbc => "aes-128-cbc",
            Self::Aes192Cbc => "aes-192-cbc",
            Self::Aes256Cbc => "aes-256-cbc",
        }
    }

    /// Length of the initialization vector in bytes.
    #[must_use]
    pub fn iv_length(self) -> usize {
        // AES block size, for every mode we support.
        16
    }

    /// Length of the cipher key in bytes.
    #[must_use]
    pub fn key_length(self) -> usize {
        match self {
            Self::Aes128Ctr | Self::Aes128Cbc => 16,
            Self::Aes192Ctr | Self::Aes192Cbc => 24,
            Self::Aes256Ctr | Self::Aes256Cbc => 32,
        }
    }
}

/// Hash function used to derive the cipher key and to compute the HMAC tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum DigestAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: &'static [DigestAlgorithm] =
        &[Self::Sha224, Self::Sha256, Self::Sha384, Self::Sha512];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Output length in bytes; also the length of the HMAC tag.
    #[must_use]
    pub fn output_length(self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

fn lookup<T: Copy>(all: &[T], name: &str, name_of: impl Fn(T) -> &'static str) -> Option<T> {
    let name = name.trim();
    all.iter()
        .copied()
        .find(|algo| name_of(*algo).eq_ignore_ascii_case(name))
}

impl FromStr for CipherAlgorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        lookup(Self::ALL, name, Self::name)
            .ok_or_else(|| Error::AlgorithmNotFound(format!("cipher `{name}`")))
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        lookup(Self::ALL, name, Self::name)
            .ok_or_else(|| Error::AlgorithmNotFound(format!("digest `{name}`")))
    }
}

impl TryFrom<String> for CipherAlgorithm {
    type Error = Error;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = Error;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
