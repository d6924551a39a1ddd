// The cookie size ceiling is enforced before anything reaches the transport.
mod common;

use common::{RecordingTransport, SECRET, SID};
use sealed_cookie_sessions::{CookieSessionConfig, CookieSessionStore, Error, SessionHandler};

// With sha256 + aes-256-ctr a 2990 byte payload seals to 32 + 4 + 16 + 2990 = 3042 bytes, which
// base64-encodes to exactly 4056 characters.
const PAYLOAD_LEN: usize = 2990;

#[test]
fn exactly_at_the_ceiling_is_written() {
    // 4056 + len("id") + len(SID) + 6 == 4096
    let transport = RecordingTransport::default();
    let mut store = CookieSessionStore::new(SECRET, transport.clone());

    store
        .write(SID, &vec![b'x'; PAYLOAD_LEN])
        .expect("write at the ceiling succeeds");

    assert_eq!(transport.set_cookies().len(), 1);
    assert_eq!(transport.last_value().len(), 4056);
}

#[test]
fn one_byte_over_the_ceiling_is_rejected() {
    // 4056 + len("sid") + len(SID) + 6 == 4097
    let transport = RecordingTransport::default();
    let config = CookieSessionConfig::default().with_name("sid");
    let mut store = CookieSessionStore::new(SECRET, transport.clone()).with_config(config);

    let err = store
        .write(SID, &vec![b'x'; PAYLOAD_LEN])
        .expect_err("write over the ceiling fails");

    assert!(matches!(
        err,
        Error::CookieSizeExceeded {
            size: 4097,
            max: 4096
        }
    ));
    assert!(transport.set_cookies().is_empty());
}

#[test]
fn ceiling_follows_configuration() {
    let transport = RecordingTransport::default();
    let config = CookieSessionConfig::default().with_max_cookie_bytes(256);
    let mut store = CookieSessionStore::new(SECRET, transport.clone()).with_config(config);

    store.write(SID, &[b'x'; 16]).expect("small payload fits");
    assert!(matches!(
        store.write(SID, &[b'x'; 512]),
        Err(Error::CookieSizeExceeded { max: 256, .. })
    ));
    assert_eq!(transport.set_cookies().len(), 1);
}
