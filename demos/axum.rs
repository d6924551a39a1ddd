use std::net::SocketAddr;

use axum::{Router, routing::get};
use sealed_cookie_sessions::{CookieSessionConfig, CookieSessionStore, SameSite, SessionHandler};
use time::Duration;
use tower_cookies::{CookieManagerLayer, Cookies};

// md5("sid"); a real host derives this from its own session id cookie.
const SID: &str = "b8c1a3069167247e3503f0daba6c5723";

async fn index(cookies: Cookies) -> String {
    let session_config = CookieSessionConfig::default()
        // Default: "id"
        .with_name("id")
        // Default: true
        .with_http_only(true)
        // Default: SameSite::Strict
        .with_same_site(SameSite::Strict)
        // Default: None (browser-session cookie)
        .with_lifetime(Duration::hours(1))
        // Default: true (set to false for local HTTP development)
        .with_secure(false)
        // Default: "/"
        .with_path("/")
        // Default: None
        .without_domain()
        // Default: 4096
        .with_max_cookie_bytes(4096);
    let mut store = CookieSessionStore::new("change me", cookies).with_config(session_config);
    store.open("", SID).expect("open succeeds");

    let n: usize = String::from_utf8_lossy(&store.read(SID).expect("read succeeds"))
        .parse()
        .unwrap_or(0);
    store
        .write(SID, (n + 1).to_string().as_bytes())
        .expect("write succeeds");
    store.close().expect("close succeeds");
    format!("n={n}")
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", get(index))
        .layer(CookieManagerLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
