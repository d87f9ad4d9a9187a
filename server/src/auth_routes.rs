use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use cookie::{Cookie, SameSite};
use jiff::{SignedDuration, Timestamp};
use oauth2::{
    AuthUrl, ClientId, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, Scope, TokenUrl, basic::BasicClient,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;
use types::{SESSION_COOKIE_NAME, UserSession};

use crate::{Config, SessionSigner};

const PKCE_TTL: Duration = Duration::from_secs(600);

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Clone)]
pub struct AuthState {
    config: Arc<Config>,
    signer: SessionSigner,
    oauth_client: ConfiguredClient,
    http: reqwest::Client,
    pkce_verifiers: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl AuthState {
    pub fn new(config: Config, signer: SessionSigner) -> types::Result<Self> {
        let oauth_client = BasicClient::new(ClientId::new(config.oauth_client_id.clone()))
            .set_auth_uri(
                AuthUrl::new(config.oidc_auth_url.clone()).context("invalid oidc_auth_url")?,
            )
            .set_token_uri(
                TokenUrl::new(config.oidc_token_url.clone()).context("invalid oidc_token_url")?,
            )
            .set_redirect_uri(
                RedirectUrl::new(config.oauth_redirect_uri.clone())
                    .context("invalid oauth_redirect_uri")?,
            );

        Ok(Self {
            config: Arc::new(config),
            signer,
            oauth_client,
            http: reqwest::Client::new(),
            pkce_verifiers: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    async fn cleanup_old_verifiers(&self) {
        let now = Instant::now();
        self.pkce_verifiers
            .write()
            .await
            .retain(|_, (_, created)| now.duration_since(*created) < PKCE_TTL);
    }

    fn session_ttl(&self) -> SignedDuration {
        SignedDuration::from_hours(self.config.session_ttl_hours)
    }

    fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure_cookies)
            .max_age(cookie::time::Duration::hours(self.config.session_ttl_hours))
            .build()
    }
}

pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", get(logout))
        .with_state(state)
}

async fn login(State(state): State<AuthState>) -> impl IntoResponse {
    state.cleanup_old_verifiers().await;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_token = CsrfToken::new_random();

    state.pkce_verifiers.write().await.insert(
        csrf_token.secret().clone(),
        (pkce_verifier.secret().clone(), Instant::now()),
    );

    let (auth_url, _csrf) = state
        .oauth_client
        .authorize_url(|| csrf_token)
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .add_scope(Scope::new("email".to_string()))
        .set_pkce_challenge(pkce_challenge)
        .url();

    tracing::info!("starting login, redirecting to identity provider");
    Redirect::to(auth_url.as_str())
}

#[derive(Debug, Deserialize)]
struct AuthCallback {
    code: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl UserInfo {
    fn into_session(self, expires_at: Timestamp) -> UserSession {
        let display_name = self
            .name
            .or(self.preferred_username)
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.sub.clone());

        UserSession {
            uid: self.sub,
            display_name,
            email: self.email,
            expires_at,
        }
    }
}

async fn callback(
    State(state): State<AuthState>,
    Query(params): Query<AuthCallback>,
) -> Result<impl IntoResponse, AuthError> {
    let (verifier_secret, _) = state
        .pkce_verifiers
        .write()
        .await
        .remove(&params.state)
        .ok_or(AuthError::InvalidState)?;
    let pkce_verifier = PkceCodeVerifier::new(verifier_secret);

    let token_response = state
        .http
        .post(&state.config.oidc_token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", params.code.as_str()),
            ("redirect_uri", state.config.oauth_redirect_uri.as_str()),
            ("client_id", state.config.oauth_client_id.as_str()),
            (
                "client_secret",
                state.config.oauth_client_secret.expose_secret(),
            ),
            ("code_verifier", pkce_verifier.secret().as_str()),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            tracing::error!(error = %e, "token exchange failed");
            AuthError::TokenExchange
        })?;

    let token: TokenResponse = token_response.json().await.map_err(|e| {
        tracing::error!(error = %e, "token response unreadable");
        AuthError::TokenExchange
    })?;

    let userinfo: UserInfo = state
        .http
        .get(&state.config.oidc_userinfo_url)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            tracing::error!(error = %e, "userinfo fetch failed");
            AuthError::UserInfo
        })?
        .json()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "userinfo response unreadable");
            AuthError::UserInfo
        })?;

    let expires_at = Timestamp::now()
        .checked_add(state.session_ttl())
        .map_err(|e| {
            tracing::error!(error = %e, "invalid session lifetime");
            AuthError::Session
        })?;
    let session = userinfo.into_session(expires_at);
    tracing::info!(uid = %session.uid, "user signed in");

    let value = state.signer.sign(&session).map_err(|e| {
        tracing::error!(error = %e, "failed to sign session");
        AuthError::Session
    })?;
    let cookie = state.session_cookie(value);

    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to("/Home/Admin"),
    ))
}

async fn logout(State(state): State<AuthState>) -> impl IntoResponse {
    let mut cookie = state.session_cookie(String::new());
    cookie.make_removal();

    tracing::info!("user signed out");
    (
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to("/login"),
    )
}

#[derive(Debug)]
enum AuthError {
    InvalidState,
    TokenExchange,
    UserInfo,
    Session,
}

impl AuthError {
    fn message(&self) -> &'static str {
        match self {
            AuthError::InvalidState => "Login expired, please try again",
            AuthError::TokenExchange => "Token exchange failed",
            AuthError::UserInfo => "Failed to fetch user info",
            AuthError::Session => "Session error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message: String =
            url::form_urlencoded::byte_serialize(self.message().as_bytes()).collect();
        Redirect::to(&format!("/login?error={message}")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_from_userinfo_prefers_name() {
        let info: UserInfo = serde_json::from_str(
            r#"{"sub": "u-42", "name": "Ada Lovelace", "preferred_username": "ada", "email": "ada@example.com"}"#,
        )
        .unwrap();
        let expires_at: Timestamp = "2030-01-01T00:00:00Z".parse().unwrap();
        let session = info.into_session(expires_at);

        assert_eq!(session.uid, "u-42");
        assert_eq!(session.expires_at, expires_at);
        assert_eq!(session.display_name, "Ada Lovelace");
        assert_eq!(session.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn session_from_bare_userinfo_uses_subject() {
        let info: UserInfo = serde_json::from_str(r#"{"sub": "u-7"}"#).unwrap();
        assert_eq!(info.into_session(Timestamp::now()).display_name, "u-7");
    }

    fn state(session_ttl_hours: i64) -> AuthState {
        let config = Config {
            firestore_url: "https://firestore.googleapis.com/".into(),
            project_id: "school".into(),
            database: "(default)".into(),
            firestore_token: "store-token".to_string().into(),
            request_timeout_secs: 10,
            oidc_auth_url: "https://id.example.com/authorize".into(),
            oidc_token_url: "https://id.example.com/token".into(),
            oidc_userinfo_url: "https://id.example.com/userinfo".into(),
            oauth_client_id: "roster".into(),
            oauth_client_secret: "client-secret".to_string().into(),
            oauth_redirect_uri: "http://localhost:8080/auth/callback".into(),
            session_secret: "session-secret".to_string().into(),
            session_ttl_hours,
            secure_cookies: true,
        };
        let signer = SessionSigner::new(config.session_secret.clone());
        AuthState::new(config, signer).unwrap()
    }

    #[test]
    fn session_cookie_lifetime_matches_session() {
        let state = state(8);
        let cookie = state.session_cookie("value".into());

        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::hours(8)));
        assert_eq!(state.session_ttl(), SignedDuration::from_hours(8));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn logout_cookie_is_removal() {
        let mut cookie = state(8).session_cookie(String::new());
        cookie.make_removal();

        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[test]
    fn auth_error_redirects_to_login() {
        let response = AuthError::InvalidState.into_response();
        let location = response.headers()[header::LOCATION].to_str().unwrap();

        assert_eq!(location, "/login?error=Login+expired%2C+please+try+again");
    }
}
