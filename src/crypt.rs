//! Encrypt-then-MAC envelope for session payloads.
//!
//! The configured key is never used as the cipher key directly: it is hashed
//! with the configured digest and the cipher takes the leading bytes of that
//! hash. The HMAC tag is keyed with the configured secret and covers the
//! session id, so an envelope minted for one session id fails verification
//! under any other. Verification happens before decryption.

use aes::{
    Aes128, Aes192, Aes256,
    cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher, block_padding::Pkcs7},
};
use hmac::{Hmac, Mac, digest::KeyInit};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::{
    algorithm::{CipherAlgorithm, DigestAlgorithm},
    config::EncryptionConfig,
    error::{Error, Result},
    format::{Envelope, Layout},
};

/// Why a cookie value was discarded. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Malformed,
    Tampered,
    Expired,
}

impl Rejection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Tampered => "tampered",
            Self::Expired => "expired",
        }
    }
}

fn reject(rejection: Rejection) -> Option<Vec<u8>> {
    tracing::debug!(reason = rejection.as_str(), "discarding session envelope");
    None
}

#[derive(Debug, Clone)]
pub struct Encryptor {
    config: EncryptionConfig,
}

impl Encryptor {
    pub fn new(config: EncryptionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncryptionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EncryptionConfig {
        &mut self.config
    }

    pub fn layout(&self) -> Layout {
        Layout {
            digest_length: self.config.digest_length(),
            iv_length: self.config.iv_length(),
        }
    }

    /// Seal `plaintext` for `sid`, returning the base64 cookie value.
    pub fn encrypt(&self, plaintext: &[u8], key: &[u8], sid: &str) -> Result<String> {
        self.encrypt_at(plaintext, key, sid, OffsetDateTime::now_utc())
    }

    /// [`encrypt`](Self::encrypt) against an explicit clock.
    pub fn encrypt_at(
        &self,
        plaintext: &[u8],
        key: &[u8],
        sid: &str,
        now: OffsetDateTime,
    ) -> Result<String> {
        let mut iv = vec![0u8; self.config.iv_length()];
        OsRng.try_fill_bytes(&mut iv).map_err(Error::crypto)?;

        let cipher_key = self.cipher_key(key);
        let ciphertext = encrypt_with(self.config.cipher(), &cipher_key, &iv, plaintext)?;

        let mut envelope = Envelope {
            tag: Vec::new(),
            expiry: expiry_after(now, self.config.expiry_seconds()),
            iv,
            ciphertext,
        };
        envelope.tag = self.tag(sid, &envelope.message())?;

        Ok(envelope.encode())
    }

    /// Open a cookie value sealed for `sid`.
    ///
    /// Malformed, forged and expired values all yield `Ok(None)`. An error
    /// means the value authenticated but the cipher could not process it,
    /// which points at an algorithm or key mismatch on this side.
    pub fn decrypt(&self, value: &str, key: &[u8], sid: &str) -> Result<Option<Vec<u8>>> {
        self.decrypt_at(value, key, sid, OffsetDateTime::now_utc())
    }

    /// [`decrypt`](Self::decrypt) against an explicit clock.
    pub fn decrypt_at(
        &self,
        value: &str,
        key: &[u8],
        sid: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Vec<u8>>> {
        self.decrypt_as(value, key, sid, self.layout(), now)
    }

    /// Decrypt splitting the envelope by `layout` instead of the current
    /// configuration's lengths.
    pub(crate) fn decrypt_as(
        &self,
        value: &str,
        key: &[u8],
        sid: &str,
        layout: Layout,
        now: OffsetDateTime,
    ) -> Result<Option<Vec<u8>>> {
        let Some(envelope) = Envelope::decode(value, layout) else {
            return Ok(reject(Rejection::Malformed));
        };

        let expected = self.tag(sid, &envelope.message())?;
        if !bool::from(expected.as_slice().ct_eq(envelope.tag.as_slice())) {
            return Ok(reject(Rejection::Tampered));
        }

        if now.unix_timestamp() > i64::from(envelope.expiry) {
            return Ok(reject(Rejection::Expired));
        }

        let cipher_key = self.cipher_key(key);
        decrypt_with(
            self.config.cipher(),
            &cipher_key,
            &envelope.iv,
            &envelope.ciphertext,
        )
        .map(Some)
    }

    /// Leading `key_length` bytes of the key hash, zero-padded when the
    /// digest is shorter than the cipher key.
    fn cipher_key(&self, key: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut cipher_key = Zeroizing::new(hash(self.config.digest(), key));
        cipher_key.resize(self.config.cipher().key_length(), 0);
        cipher_key
    }

    fn tag(&self, sid: &str, message: &[u8]) -> Result<Vec<u8>> {
        let secret = self.config.secret();
        match self.config.digest() {
            DigestAlgorithm::Sha224 => mac::<Hmac<Sha224>>(secret, sid, message),
            DigestAlgorithm::Sha256 => mac::<Hmac<Sha256>>(secret, sid, message),
            DigestAlgorithm::Sha384 => mac::<Hmac<Sha384>>(secret, sid, message),
            DigestAlgorithm::Sha512 => mac::<Hmac<Sha512>>(secret, sid, message),
        }
    }
}

fn expiry_after(now: OffsetDateTime, expiry_seconds: u32) -> u32 {
    let expiry = now
        .unix_timestamp()
        .saturating_add(i64::from(expiry_seconds))
        .max(0);
    u32::try_from(expiry).unwrap_or(u32::MAX)
}

fn hash(digest: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    match digest {
        DigestAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

fn mac<M: Mac + KeyInit>(secret: &[u8], sid: &str, message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret).map_err(Error::crypto)?;
    mac.update(sid.as_bytes());
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn encrypt_with(
    cipher: CipherAlgorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    match cipher {
        CipherAlgorithm::Aes128Ctr => keystream::<ctr::Ctr128BE<Aes128>>(key, iv, plaintext),
        CipherAlgorithm::Aes192Ctr => keystream::<ctr::Ctr128BE<Aes192>>(key, iv, plaintext),
        CipherAlgorithm::Aes256Ctr => keystream::<ctr::Ctr128BE<Aes256>>(key, iv, plaintext),
        CipherAlgorithm::Aes128Cbc => cbc_encrypt::<cbc::Encryptor<Aes128>>(key, iv, plaintext),
        CipherAlgorithm::Aes192Cbc => cbc_encrypt::<cbc::Encryptor<Aes192>>(key, iv, plaintext),
        CipherAlgorithm::Aes256Cbc => cbc_encrypt::<cbc::Encryptor<Aes256>>(key, iv, plaintext),
    }
}

fn decrypt_with(
    cipher: CipherAlgorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    match cipher {
        CipherAlgorithm::Aes128Ctr => keystream::<ctr::Ctr128BE<Aes128>>(key, iv, ciphertext),
        CipherAlgorithm::Aes192Ctr => keystream::<ctr::Ctr128BE<Aes192>>(key, iv, ciphertext),
        CipherAlgorithm::Aes256Ctr => keystream::<ctr::Ctr128BE<Aes256>>(key, iv, ciphertext),
        CipherAlgorithm::Aes128Cbc => cbc_decrypt::<cbc::Decryptor<Aes128>>(key, iv, ciphertext),
        CipherAlgorithm::Aes192Cbc => cbc_decrypt::<cbc::Decryptor<Aes192>>(key, iv, ciphertext),
        CipherAlgorithm::Aes256Cbc => cbc_decrypt::<cbc::Decryptor<Aes256>>(key, iv, ciphertext),
    }
}

// CTR is symmetric: the same keystream encrypts and decrypts.
fn keystream<C: KeyIvInit + StreamCipher>(key: &[u8], iv: &[u8], input: &[u8]) -> Result<Vec<u8>> {
    let mut cipher = C::new_from_slices(key, iv).map_err(Error::crypto)?;
    let mut buf = input.to_vec();
    cipher.try_apply_keystream(&mut buf).map_err(Error::crypto)?;
    Ok(buf)
}

fn cbc_encrypt<C: KeyIvInit + BlockEncryptMut>(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = C::new_from_slices(key, iv).map_err(Error::crypto)?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C: KeyIvInit + BlockDecryptMut>(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = C::new_from_slices(key, iv).map_err(Error::crypto)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(Error::crypto)
}
