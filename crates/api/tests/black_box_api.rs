use chrono::{Duration as ChronoDuration, Utc};
use crewdesk_api::app::{AppServices, build_app};
use crewdesk_auth::{AuthConfig, HashCost, SigningSecret};
use crewdesk_core::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "black-box-secret-0123456789-abcdefghij";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, cheap password hashing, ephemeral port.
        let config = AuthConfig::new(SigningSecret::new(JWT_SECRET).unwrap())
            .with_hash_cost(HashCost::new(8, 1, 1));
        let app = build_app(AppServices::in_memory(&config).unwrap());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Sign a token by hand, the way any HS256 client would.
fn mint_jwt(secret: &str, role: &str, issued_ago: ChronoDuration, lifetime: ChronoDuration) -> String {
    let iat = Utc::now() - issued_ago;
    let claims = json!({
        "sub": UserId::new(),
        "email": "minted@example.com",
        "role": role,
        "businessType": "restaurant",
        "iat": iat.timestamp(),
        "exp": (iat + lifetime).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn register(client: &reqwest::Client, base_url: &str, email: &str, role: &str) -> serde_json::Value {
    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({
            "email": email,
            "password": "Str0ngPass",
            "role": role,
            "businessType": "restaurant",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/api/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_page_redirects_browser_to_login() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers()["location"].to_str().unwrap(),
        "/login?redirect=%2Fdashboard"
    );
}

#[tokio::test]
async fn session_lifecycle_register_login_me_refresh_logout() {
    let srv = TestServer::spawn().await;
    let client = client();

    let registered = register(&client, &srv.base_url, "ana@example.com", "manager").await;
    assert_eq!(registered["expiresIn"], "7d");
    assert_eq!(registered["user"]["role"], "manager");

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "email": "ANA@example.com", "password": "Str0ngPass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let login: serde_json::Value = res.json().await.unwrap();
    let token = login["token"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["email"], "ana@example.com");
    assert_eq!(me["userId"], login["user"]["id"]);

    // The cookie alone authenticates page navigation.
    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .header("cookie", format!("crewdesk_session={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/auth/refresh", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["set-cookie"].to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn staff_token_is_forbidden_on_manager_api() {
    let srv = TestServer::spawn().await;
    let client = client();

    let staff = register(&client, &srv.base_url, "sam@example.com", "staff").await;
    let token = staff["token"].as_str().unwrap();

    let res = client
        .post(format!("{}/api/upload", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn hand_minted_token_is_accepted() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, "staff", ChronoDuration::zero(), ChronoDuration::hours(1));

    let res = client()
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["role"], "staff");
    assert_eq!(me["businessType"], "restaurant");
}

#[tokio::test]
async fn expired_token_is_invalid() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(
        JWT_SECRET,
        "manager",
        ChronoDuration::days(8),
        ChronoDuration::days(7),
    );

    let res = client()
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_invalid() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(
        "some-other-secret-0123456789-abcdefghij",
        "manager",
        ChronoDuration::zero(),
        ChronoDuration::hours(1),
    );

    let res = client()
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}
