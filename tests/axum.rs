#![cfg(feature = "tower-cookies")]

// End-to-end tests using an Axum `Router` layered with `tower_cookies::CookieManagerLayer`, with
// the request's `Cookies` jar acting as the store's transport.
mod common;

use axum::{Router, body::Body, routing::get};
use common::{SECRET, SID};
use http::{Request, Response, header};
use http_body_util::BodyExt as _;
use sealed_cookie_sessions::{CookieSessionConfig, CookieSessionStore, SameSite, SessionHandler};
use tower::ServiceExt as _;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

fn config() -> CookieSessionConfig {
    CookieSessionConfig::default()
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_path("/")
}

fn store(cookies: Cookies) -> CookieSessionStore<Cookies> {
    store_with(cookies, config())
}

fn store_with(cookies: Cookies, config: CookieSessionConfig) -> CookieSessionStore<Cookies> {
    let mut store = CookieSessionStore::new(SECRET, cookies).with_config(config);
    store.open("", SID).expect("open succeeds");
    store
}

fn app() -> Router {
    Router::new()
        .route(
            "/write",
            get(|cookies: Cookies| async move {
                let mut store = store(cookies);
                store
                    .write(SID, b"user=alice")
                    .expect("write succeeds");
                store.close().expect("close succeeds");
            }),
        )
        .route(
            "/read",
            get(|cookies: Cookies| async move {
                let mut store = store(cookies);
                let payload = store.read(SID).expect("read succeeds");
                store.close().expect("close succeeds");
                if payload.is_empty() {
                    "none".to_string()
                } else {
                    String::from_utf8_lossy(&payload).into_owned()
                }
            }),
        )
        .route(
            "/destroy",
            get(|cookies: Cookies| async move {
                let mut store = store(cookies);
                store.destroy(SID).expect("destroy succeeds");
            }),
        )
        .route(
            "/domain/write",
            get(|cookies: Cookies| async move {
                let mut store = store_with(cookies, config().with_domain("example.com"));
                store
                    .write(SID, b"user=alice")
                    .expect("write succeeds");
            }),
        )
        .route(
            "/domain/destroy",
            get(|cookies: Cookies| async move {
                let mut store = store_with(cookies, config().with_domain("example.com"));
                store.destroy(SID).expect("destroy succeeds");
            }),
        )
        .layer(CookieManagerLayer::new())
}

async fn body_string(body: Body) -> String {
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn get_session_cookie(res: &Response<Body>) -> Cookie<'static> {
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    cookie.encoded().stripped().to_string()
}

async fn call(uri: &str, cookie: Option<&Cookie<'_>>) -> Response<Body> {
    let mut req = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie_header_value(cookie));
    }
    let req = req.body(Body::empty()).expect("request builds successfully");
    app().oneshot(req).await.expect("service call succeeds")
}

#[tokio::test]
async fn write_sets_session_cookie() {
    let res = call("/write", None).await;
    let cookie = get_session_cookie(&res);

    assert_eq!(cookie.name(), SID);
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert!(cookie.max_age().is_none());
}

#[tokio::test]
async fn session_roundtrips_across_requests() {
    let res = call("/write", None).await;
    let cookie = get_session_cookie(&res);

    let res = call("/read", Some(&cookie)).await;
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_string(res.into_body()).await, "user=alice");
}

#[tokio::test]
async fn read_without_cookie_is_empty() {
    let res = call("/read", None).await;
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_string(res.into_body()).await, "none");
}

#[tokio::test]
async fn tampered_cookie_reads_as_empty() {
    let res = call("/write", None).await;
    let mut cookie = get_session_cookie(&res);

    let mut value = cookie.value().to_string();
    let first = value.remove(0);
    value.insert(0, if first == 'A' { 'B' } else { 'A' });
    cookie.set_value(value);

    let res = call("/read", Some(&cookie)).await;
    assert_eq!(body_string(res.into_body()).await, "none");
}

#[tokio::test]
async fn destroy_expires_cookie() {
    let res = call("/write", None).await;
    let cookie = get_session_cookie(&res);

    let res = call("/destroy", Some(&cookie)).await;
    let removal = get_session_cookie(&res);

    assert_eq!(removal.name(), SID);
    assert_eq!(removal.value(), "");
    assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
}

#[tokio::test]
async fn destroy_removes_cookie_from_configured_domain() {
    let res = call("/domain/write", None).await;
    let cookie = get_session_cookie(&res);
    assert_eq!(cookie.domain(), Some("example.com"));

    let res = call("/domain/destroy", Some(&cookie)).await;
    let removal = get_session_cookie(&res);

    assert_eq!(removal.name(), SID);
    assert_eq!(removal.value(), "");
    assert_eq!(removal.path(), Some("/"));
    assert_eq!(removal.domain(), Some("example.com"));
    assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
}
