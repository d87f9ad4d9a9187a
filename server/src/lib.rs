mod auth_routes;
mod config;
mod session;
mod store;

use std::sync::OnceLock;

use axum::Router;
use axum::http::{HeaderMap, header};
use dioxus::fullstack::FullstackContext;
use tracing_subscriber::EnvFilter;
use types::{Result, UserSession, err};

use crate::auth_routes::{AuthState, auth_router};
pub use crate::config::Config;
pub use crate::session::SessionSigner;
pub use crate::store::DocumentStore;

struct ServerState {
    signer: SessionSigner,
    store: DocumentStore,
}

static STATE: OnceLock<ServerState> = OnceLock::new();

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Load configuration, set up the document store and return the auth routes.
pub fn init() -> Result<Router> {
    let config = Config::load().map_err(|e| err!("failed to load configuration: {e}"))?;

    let state = ServerState {
        signer: SessionSigner::new(config.session_secret.clone()),
        store: DocumentStore::new(&config)?,
    };
    let auth_state = AuthState::new(config, state.signer.clone())?;

    if STATE.set(state).is_err() {
        return Err(err!("server already initialised"));
    }
    tracing::info!("server initialised");

    Ok(auth_router(auth_state))
}

fn state() -> Result<&'static ServerState> {
    STATE.get().ok_or_else(|| err!("server not initialised"))
}

pub fn store() -> Result<&'static DocumentStore> {
    Ok(&state()?.store)
}

/// Extract the user session from the request cookie.
pub async fn get_session_from_cookie() -> Result<UserSession> {
    let headers: HeaderMap = FullstackContext::extract()
        .await
        .map_err(|e| err!("failed to read request headers: {e}"))?;

    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| err!("no cookies in request"))?;

    let value = session::find_session_cookie(cookie_header)
        .ok_or_else(|| err!("session cookie not found"))?;

    state()?.signer.verify(value)
}

/// Require a session belonging to `owner_id`.
pub async fn require_owner(owner_id: &str) -> Result<UserSession> {
    let session = get_session_from_cookie().await?;

    if session.uid != owner_id {
        return Err(err!(
            "access denied: user '{}' cannot view guardians of '{}'",
            session.uid,
            owner_id
        ));
    }

    Ok(session)
}

/// Require a session that owns the guardian `guardian_id`.
pub async fn require_guardian_owner(guardian_id: &str) -> Result<UserSession> {
    let session = get_session_from_cookie().await?;

    store()?
        .find_owned_guardian(guardian_id, &session.uid)
        .await?
        .ok_or_else(|| {
            err!(
                "access denied: user '{}' does not own guardian '{}'",
                session.uid,
                guardian_id
            )
        })?;

    Ok(session)
}
