// Integration tests for sso-vkontakte-axum
//
// HTTP-level tests using tower::ServiceExt::oneshot to exercise the full
// Axum router without starting a real TCP server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sso_vkontakte::{SsoContext, VkontaktePlugin};
use sso_vkontakte_axum::VkontakteSso;
use sso_vkontakte_core::error::SsoError;
use sso_vkontakte_core::models::{AccountId, NewUser, OAuthTokens, ProviderProfile, StrategyConfig};
use sso_vkontakte_core::oauth::{CallbackQuery, OAuthRuntime, VerifiedCallback};
use sso_vkontakte_core::options::SsoOptions;
use sso_vkontakte_core::store::{SessionStore, SettingsStore, UserStore};
use sso_vkontakte_memory::{MemoryObjectStore, MemorySessionStore, MemorySettingsStore, MemoryUserStore};

// ─── Test Runtime ─────────────────────────────────────────────────

/// A stand-in OAuth runtime.
///
/// `code=ok-<id>` completes with a profile for provider id `<id>`; any other
/// code fails the handshake.
#[derive(Debug)]
struct FakeRuntime;

#[async_trait::async_trait]
impl OAuthRuntime for FakeRuntime {
    async fn authorization_url(&self, config: &StrategyConfig) -> Result<String, SsoError> {
        Ok(format!(
            "https://oauth.vk.com/authorize?client_id={}&redirect_uri={}&scope={}",
            config.client_id,
            urlencoding::encode(&config.callback_url),
            config.descriptor.scope,
        ))
    }

    async fn complete(
        &self,
        _config: &StrategyConfig,
        query: &CallbackQuery,
    ) -> Result<VerifiedCallback, SsoError> {
        let id = query
            .code
            .as_deref()
            .and_then(|c| c.strip_prefix("ok-"))
            .ok_or_else(|| SsoError::OAuth("invalid authorization code".into()))?;
        Ok(VerifiedCallback {
            profile: ProviderProfile {
                id: id.to_string(),
                display_name: format!("vk user {id}"),
                email: Some(format!("{id}@mail.example")),
                ..Default::default()
            },
            tokens: OAuthTokens { access_token: format!("at-{id}"), refresh_token: None },
        })
    }
}

// ─── Helpers ──────────────────────────────────────────────────────

struct TestApp {
    sso: VkontakteSso,
    users: MemoryUserStore,
    sessions: MemorySessionStore,
}

async fn app_with(settings: serde_json::Value) -> TestApp {
    sso_vkontakte_core::env::init_logger();

    let users = MemoryUserStore::new();
    let sessions = MemorySessionStore::new();
    let store = MemorySettingsStore::new();
    store.set("sso-vkontakte", settings).await.unwrap();

    let ctx = SsoContext::new(
        SsoOptions::new("https://forum.example.com"),
        Arc::new(users.clone()),
        Arc::new(MemoryObjectStore::new()),
        Arc::new(store),
        Arc::new(sessions.clone()),
    );
    let plugin = Arc::new(VkontaktePlugin::new(ctx));
    TestApp { sso: VkontakteSso::new(plugin, Arc::new(FakeRuntime)), users, sessions }
}

async fn configured_app() -> TestApp {
    app_with(serde_json::json!({"id": "app", "secret": "s3cret"})).await
}

async fn send(app: &TestApp, req: Request<Body>) -> Response<Body> {
    app.sso.router().oneshot(req).await.unwrap()
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("forum.sid={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn admin_session(app: &TestApp) -> String {
    let uid = app
        .users
        .create_user(NewUser { username: "admin".into(), email: "admin@example.com".into() })
        .await
        .unwrap();
    app.sessions.grant_admin(uid).await;
    app.sessions.on_successful_login(uid).await.unwrap()
}

// ─── Login redirect ──────────────────────────────────────────────

#[tokio::test]
async fn login_redirects_to_provider() {
    let app = configured_app().await;
    let resp = send(&app, get("/auth/vkontakte", None)).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let loc = location(&resp);
    assert!(loc.starts_with("https://oauth.vk.com/authorize?client_id=app"));
    assert!(loc.contains("https%3A%2F%2Fforum.example.com%2Fauth%2Fvkontakte%2Fcallback"));
    assert!(loc.contains("scope=email"));
}

#[tokio::test]
async fn login_not_found_without_credentials() {
    let app = app_with(serde_json::json!({"id": "app"})).await;
    let resp = send(&app, get("/auth/vkontakte", None)).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "STRATEGY_NOT_CONFIGURED");
}

// ─── Callback ────────────────────────────────────────────────────

#[tokio::test]
async fn callback_creates_account_and_session() {
    let app = configured_app().await;
    let resp = send(&app, get("/auth/vkontakte/callback?code=ok-42&state=xyz", None)).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("forum.sid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("; Secure"));

    assert_eq!(app.users.created_count(), 1);
    let uid = AccountId::new(1);
    assert_eq!(app.sessions.sessions_for(uid).await, 1);
    let user = app.users.fields(uid).await.unwrap();
    assert_eq!(user["vkontakteid"], "42");
    assert_eq!(user["email"], "42@mail.example");
}

#[tokio::test]
async fn callback_returning_user_gets_new_session_without_new_account() {
    let app = configured_app().await;
    let first = send(&app, get("/auth/vkontakte/callback?code=ok-42", None)).await;
    assert_eq!(first.status(), StatusCode::FOUND);
    let resp = send(&app, get("/auth/vkontakte/callback?code=ok-42", None)).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(resp.headers().get(header::SET_COOKIE).is_some());
    assert_eq!(app.users.created_count(), 1);
    assert_eq!(app.sessions.sessions_for(AccountId::new(1)).await, 2);
}

#[tokio::test]
async fn callback_in_session_links_without_new_session() {
    let app = configured_app().await;
    let uid = app
        .users
        .create_user(NewUser { username: "alice".into(), email: "alice@example.com".into() })
        .await
        .unwrap();
    let token = app.sessions.on_successful_login(uid).await.unwrap();

    let resp = send(&app, get("/auth/vkontakte/callback?code=ok-77", Some(&token))).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(app.sessions.sessions_for(uid).await, 1);
    assert_eq!(app.users.created_count(), 1);
    let user = app.users.fields(uid).await.unwrap();
    assert_eq!(user["vkontakteid"], "77");
}

#[tokio::test]
async fn callback_provider_error_redirects_to_login() {
    let app = configured_app().await;
    let resp = send(
        &app,
        get("/auth/vkontakte/callback?error=access_denied&error_description=User+denied", None),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?error=access_denied");
    assert_eq!(app.users.created_count(), 0);
}

#[tokio::test]
async fn callback_handshake_failure_redirects_to_login() {
    let app = configured_app().await;
    let resp = send(&app, get("/auth/vkontakte/callback?code=forged", None)).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?error=OAUTH_FAILED");
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn callback_store_failure_redirects_to_login() {
    let app = configured_app().await;
    app.users.faults().fail("create_user").await;
    let resp = send(&app, get("/auth/vkontakte/callback?code=ok-5", None)).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?error=STORAGE_UNAVAILABLE");
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

// ─── Admin ───────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_require_session() {
    let app = configured_app().await;
    let resp = send(&app, get("/api/admin/plugins/sso-vkontakte", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app, get("/admin/plugins/sso-vkontakte", Some("stale-token"))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_non_admin() {
    let app = configured_app().await;
    let uid = app
        .users
        .create_user(NewUser { username: "bob".into(), email: "bob@example.com".into() })
        .await
        .unwrap();
    let token = app.sessions.on_successful_login(uid).await.unwrap();

    let resp = send(&app, get("/api/admin/plugins/sso-vkontakte", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_page_renders_settings() {
    let app = configured_app().await;
    let token = admin_session(&app).await;

    let resp = send(&app, get("/admin/plugins/sso-vkontakte", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("value=\"app\""));
    assert!(!html.contains("s3cret"));
}

#[tokio::test]
async fn admin_json_view_hides_secret() {
    let app = configured_app().await;
    let token = admin_session(&app).await;

    let resp = send(&app, get("/api/admin/plugins/sso-vkontakte", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["settings"]["id"], "app");
    assert_eq!(body["settings"]["autoconfirm"], false);
    assert!(body["settings"].get("secret").is_none());
}

#[tokio::test]
async fn admin_save_enables_strategy() {
    let app = app_with(serde_json::json!({})).await;
    let token = admin_session(&app).await;

    let resp = send(&app, get("/auth/vkontakte", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/plugins/sso-vkontakte")
        .header(header::COOKIE, format!("forum.sid={token}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("id=newapp&secret=newsecret&autoconfirm=on"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["settings"]["id"], "newapp");
    assert_eq!(body["settings"]["autoconfirm"], true);

    let resp = send(&app, get("/auth/vkontakte", None)).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).contains("client_id=newapp"));
}

#[tokio::test]
async fn admin_save_rejects_malformed_json() {
    let app = configured_app().await;
    let token = admin_session(&app).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/plugins/sso-vkontakte")
        .header(header::COOKIE, format!("forum.sid={token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{oops"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "COULD_NOT_PARSE_BODY");
}
