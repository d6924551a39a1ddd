#![allow(dead_code)]

// Shared helpers for integration tests.
//
// `RecordingTransport` stands in for the host's cookie jar: tests seed the request cookies and
// inspect every cookie the store queued or expired.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use sealed_cookie_sessions::{Cookie, CookieTransport};

pub const SECRET: &str = "secret";

// md5("sid")
pub const SID: &str = "b8c1a3069167247e3503f0daba6c5723";

#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    request: HashMap<String, String>,
    set: Vec<Cookie<'static>>,
    expired: Vec<Cookie<'static>>,
}

impl RecordingTransport {
    pub fn with_request_cookie(name: &str, value: &str) -> Self {
        let transport = Self::default();
        transport
            .inner
            .lock()
            .expect("transport lock is not poisoned")
            .request
            .insert(name.to_owned(), value.to_owned());
        transport
    }

    pub fn set_cookies(&self) -> Vec<Cookie<'static>> {
        self.inner
            .lock()
            .expect("transport lock is not poisoned")
            .set
            .clone()
    }

    pub fn expired(&self) -> Vec<Cookie<'static>> {
        self.inner
            .lock()
            .expect("transport lock is not poisoned")
            .expired
            .clone()
    }

    pub fn last_value(&self) -> String {
        self.set_cookies()
            .last()
            .expect("store set a cookie")
            .value()
            .to_owned()
    }
}

impl CookieTransport for RecordingTransport {
    fn get(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .expect("transport lock is not poisoned")
            .request
            .get(name)
            .cloned()
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.inner
            .lock()
            .expect("transport lock is not poisoned")
            .set
            .push(cookie);
    }

    fn expire(&self, cookie: Cookie<'static>) {
        self.inner
            .lock()
            .expect("transport lock is not poisoned")
            .expired
            .push(cookie);
    }
}
