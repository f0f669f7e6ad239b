#![doc = include_str!("../README.md")]

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use sso_vkontakte::admin::{self, AdminView, SettingsUpdate};
use sso_vkontakte::constants;
use sso_vkontakte::{SsoContext, VkontaktePlugin};
use sso_vkontakte_core::error::{ErrorCode, SsoError, StoreError};
use sso_vkontakte_core::models::AccountId;
use sso_vkontakte_core::oauth::{CallbackQuery, OAuthRuntime};

// ─── Error Handling ──────────────────────────────────────────────

/// API error with HTTP status code, error code, and human-readable message.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: ErrorCode) -> Self {
        Self { status, code, message: code.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "message": self.message,
                "code": self.code,
                "status": self.status.as_u16(),
            }
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<SsoError> for ApiError {
    fn from(e: SsoError) -> Self {
        let status = match &e {
            SsoError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            SsoError::Config(_) => StatusCode::NOT_FOUND,
            SsoError::OAuth(_) => StatusCode::BAD_REQUEST,
            SsoError::Unauthorized => StatusCode::UNAUTHORIZED,
            SsoError::PurgeFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError { status, code: e.code(), message: e.to_string() }
    }
}

// ─── Cookie / Token Extraction ───────────────────────────────────

/// Extract the host session token from a bearer header or the session cookie.
fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.to_string());
    }

    let secure_cookie_name = format!("__Secure-{cookie_name}");
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookies) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookies.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                let name = name.trim();
                if (name == cookie_name || name == secure_cookie_name) && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// The account bound to the request's session, if any.
async fn session_uid(ctx: &SsoContext, headers: &HeaderMap) -> Result<Option<AccountId>, SsoError> {
    let Some(token) = extract_session_token(headers, &ctx.options.session_cookie) else {
        return Ok(None);
    };
    Ok(ctx
        .sessions
        .current_uid(&token)
        .await?
        .filter(AccountId::is_registered))
}

/// `Set-Cookie` value for a new host session; `Secure` when served over https.
fn session_cookie(name: &str, token: &str, secure: bool) -> Result<HeaderValue, SsoError> {
    let mut cookie = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|_| {
        SsoError::Store(StoreError::OperationFailed(
            "session token is not a valid cookie value".into(),
        ))
    })
}

// ─── Builder ─────────────────────────────────────────────────────

struct AppState {
    plugin: Arc<VkontaktePlugin>,
    runtime: Arc<dyn OAuthRuntime>,
}

impl AppState {
    fn ctx(&self) -> &SsoContext {
        self.plugin.context()
    }
}

/// Axum integration for the Vkontakte plugin.
///
/// # Example
///
/// ```rust,ignore
/// use sso_vkontakte_axum::VkontakteSso;
///
/// let sso = VkontakteSso::new(plugin, runtime);
/// let app = axum::Router::new().merge(sso.router());
/// ```
pub struct VkontakteSso {
    state: Arc<AppState>,
}

impl VkontakteSso {
    pub fn new(plugin: Arc<VkontaktePlugin>, runtime: Arc<dyn OAuthRuntime>) -> Self {
        Self { state: Arc::new(AppState { plugin, runtime }) }
    }

    pub fn plugin(&self) -> &Arc<VkontaktePlugin> {
        &self.state.plugin
    }

    /// Login, callback and admin routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route(constants::AUTH_PATH, get(handle_login))
            .route(constants::CALLBACK_PATH, get(handle_callback))
            .route(constants::ADMIN_PAGE_PATH, get(handle_admin_page))
            .route(
                constants::ADMIN_API_PATH,
                get(handle_admin_settings).post(handle_admin_save),
            )
            .with_state(self.state.clone())
    }

    /// The router with permissive CORS.
    pub fn router_with_cors(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        self.router().layer(cors)
    }
}

// ─── Route Handlers ─────────────────────────────────────────────

/// Create a 302 Found redirect response.
fn redirect_found(url: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

fn login_error_redirect(reason: &str) -> Response {
    redirect_found(&format!("/login?error={}", urlencoding::encode(reason)))
}

async fn handle_login(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let Some(config) = state.plugin.strategy().config().await else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, ErrorCode::StrategyNotConfigured));
    };
    let url = state.runtime.authorization_url(&config).await?;
    Ok(redirect_found(&url))
}

async fn handle_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(config) = state.plugin.strategy().config().await else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, ErrorCode::StrategyNotConfigured));
    };

    if let Some(error) = query.error.as_deref() {
        tracing::warn!(
            error,
            description = query.error_description.as_deref().unwrap_or_default(),
            "Vkontakte denied the login"
        );
        return Ok(login_error_redirect(error));
    }

    match complete_login(&state, &config, &query, &headers).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!(error = %e, "Vkontakte callback failed");
            Ok(login_error_redirect(e.code().as_str()))
        }
    }
}

async fn complete_login(
    state: &AppState,
    config: &sso_vkontakte_core::models::StrategyConfig,
    query: &CallbackQuery,
    headers: &HeaderMap,
) -> Result<Response, SsoError> {
    let verified = state.runtime.complete(config, query).await?;
    let ctx = state.ctx();
    let current = session_uid(ctx, headers).await?;

    let outcome = state
        .plugin
        .strategy()
        .verify(current, verified.profile, verified.tokens)
        .await?;

    let mut response = redirect_found("/");
    if outcome.needs_login() {
        let token = ctx.sessions.on_successful_login(outcome.uid).await?;
        let secure = ctx.options.base_url.starts_with("https://");
        let cookie = session_cookie(&ctx.options.session_cookie, &token, secure)?;
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// Resolve the session and require admin rights.
async fn require_admin(ctx: &SsoContext, headers: &HeaderMap) -> Result<AccountId, ApiError> {
    let uid = session_uid(ctx, headers)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized))?;
    if !ctx.sessions.is_admin(uid).await.map_err(SsoError::from)? {
        return Err(ApiError::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden));
    }
    Ok(uid)
}

async fn handle_admin_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(state.ctx(), &headers).await?;
    let settings = state.ctx().settings.get().await;
    Ok(Html(admin::render_admin_page(&settings)))
}

async fn handle_admin_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(state.ctx(), &headers).await?;
    let settings = state.ctx().settings.get().await;
    Ok(Json(AdminView::from_settings(&settings)))
}

async fn handle_admin_save(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let uid = require_admin(state.ctx(), &headers).await?;
    let update = parse_settings_body(&headers, &body)?;

    let settings = admin::save_settings(&state.ctx().settings, update).await?;
    tracing::info!(%uid, "Vkontakte settings updated");

    let view = AdminView::from_settings(&settings);
    Ok(Json(serde_json::json!({
        "message": "Settings saved. Reload the forum to apply new credentials.",
        "settings": view.settings,
    })))
}

/// Accept JSON or form-encoded admin form bodies.
fn parse_settings_body(headers: &HeaderMap, body: &[u8]) -> Result<SettingsUpdate, ApiError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

    if !is_form {
        return serde_json::from_slice(body).map_err(|e| ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::CouldNotParseBody,
            message: e.to_string(),
        });
    }

    let mut update = SettingsUpdate::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "id" => update.id = value.into_owned(),
            "secret" => update.secret = Some(value.into_owned()),
            "autoconfirm" => update.autoconfirm = Some(serde_json::Value::String(value.into_owned())),
            _ => {}
        }
    }
    Ok(update)
}
