//! Browser cookie size ceiling.

/// Practical per-cookie ceiling enforced by browsers.
pub const MAX_COOKIE_SIZE: usize = 4096;

/// Separator and assignment overhead of a `name=value` pair in the header.
pub const SLACK: usize = 6;

/// Rejects writes that a browser would silently drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSizeGuard {
    max: usize,
}

impl Default for CookieSizeGuard {
    fn default() -> Self {
        Self::new(MAX_COOKIE_SIZE)
    }
}

impl CookieSizeGuard {
    pub const fn new(max: usize) -> Self {
        Self { max }
    }

    pub const fn max(&self) -> usize {
        self.max
    }

    /// Total header bytes the cookie will occupy.
    pub const fn required(envelope_len: usize, cookie_name_len: usize, sid_len: usize) -> usize {
        envelope_len
            .saturating_add(cookie_name_len)
            .saturating_add(sid_len)
            .saturating_add(SLACK)
    }

    pub const fn fits(&self, envelope_len: usize, cookie_name_len: usize, sid_len: usize) -> bool {
        Self::required(envelope_len, cookie_name_len, sid_len) <= self.max
    }
}
