//! Helpers for encoding/decoding the cookie envelope.
//!
//! Layout of the decoded cookie value:
//!
//! ```text
//! tag[digest_length] || expiry[4, u32 LE] || iv[iv_length] || ciphertext
//! ```
//!
//! The tag authenticates the session id followed by everything after the
//! tag, so expiry and IV are covered as well as the ciphertext.

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Width of the embedded expiry timestamp.
pub const EXPIRY_SIZE: usize = 4;

/// Sizes that depend on the configured algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub digest_length: usize,
    pub iv_length: usize,
}

impl Layout {
    /// Shortest decoded value that can hold a tag, an expiry and an IV.
    pub const fn min_len(&self) -> usize {
        self.digest_length + EXPIRY_SIZE + self.iv_length
    }
}

/// The decoded cookie value, split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub tag: Vec<u8>,
    pub expiry: u32,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// The authenticated part: `expiry || iv || ciphertext`.
    pub fn message(&self) -> Vec<u8> {
        let mut message =
            Vec::with_capacity(EXPIRY_SIZE + self.iv.len() + self.ciphertext.len());
        message.extend_from_slice(&self.expiry.to_le_bytes());
        message.extend_from_slice(&self.iv);
        message.extend_from_slice(&self.ciphertext);
        message
    }

    /// Encode into the cookie value.
    pub fn encode(&self) -> String {
        let message = self.message();
        let mut bytes = Vec::with_capacity(self.tag.len() + message.len());
        bytes.extend_from_slice(&self.tag);
        bytes.extend_from_slice(&message);
        STANDARD.encode(bytes)
    }

    /// Decode a cookie value. Returns `None` for anything that is not valid
    /// base64 or is too short for `layout`; nothing is authenticated here.
    pub fn decode(value: &str, layout: Layout) -> Option<Self> {
        let bytes = STANDARD.decode(value.trim().as_bytes()).ok()?;
        if bytes.len() < layout.min_len() {
            return None;
        }

        let (tag, message) = bytes.split_at(layout.digest_length);
        let (expiry, rest) = message.split_at(EXPIRY_SIZE);
        let (iv, ciphertext) = rest.split_at(layout.iv_length);

        Some(Self {
            tag: tag.to_vec(),
            expiry: u32::from_le_bytes(expiry.try_into().ok()?),
            iv: iv.to_vec(),
            ciphertext: ciphertext.to_vec(),
        })
    }
}
