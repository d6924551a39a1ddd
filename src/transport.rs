use std::fmt::Debug;

use cookie::Cookie;

/// Reads and writes the raw cookies of the current request/response.
///
/// The session store never touches HTTP headers itself; the host supplies a
/// transport bound to the request being served.
pub trait CookieTransport: Debug {
    /// Value of the request cookie called `name`, if the client sent one.
    fn get(&self, name: &str) -> Option<String>;

    /// Queue `cookie` (name, value, max-age, path, domain, secure, http-only)
    /// on the response.
    fn set(&self, cookie: Cookie<'static>);

    /// Tell the client to drop the cookie matching the name, path and
    /// domain of `cookie`.
    fn expire(&self, cookie: Cookie<'static>);
}

impl<T: CookieTransport + ?Sized> CookieTransport for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, cookie: Cookie<'static>) {
        (**self).set(cookie);
    }

    fn expire(&self, cookie: Cookie<'static>) {
        (**self).expire(cookie);
    }
}

/// The request jar installed by `tower_cookies::CookieManagerLayer`.
///
/// The jar keys pending changes by cookie name only, so expiring the same
/// name under two paths in one response emits a single removal cookie (the
/// last one).
#[cfg(feature = "tower-cookies")]
impl CookieTransport for tower_cookies::Cookies {
    fn get(&self, name: &str) -> Option<String> {
        tower_cookies::Cookies::get(self, name).map(|cookie| cookie.value().to_owned())
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.add(cookie);
    }

    fn expire(&self, cookie: Cookie<'static>) {
        self.remove(cookie);
    }
}
