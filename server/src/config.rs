use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct Config {
    pub firestore_url: String,
    pub project_id: String,
    pub database: String,
    pub firestore_token: SecretString,
    pub request_timeout_secs: u64,
    pub oidc_auth_url: String,
    pub oidc_token_url: String,
    pub oidc_userinfo_url: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: SecretString,
    pub oauth_redirect_uri: String,
    pub session_secret: SecretString,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
}

impl Config {
    /// Load from `roster.toml` (optional) and `ROSTER_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        defaults(config::Config::builder())?
            .add_source(File::with_name("roster").required(false))
            .add_source(Environment::with_prefix("ROSTER").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

fn defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("firestore_url", "https://firestore.googleapis.com/")?
        .set_default("database", "(default)")?
        .set_default("request_timeout_secs", 10)?
        .set_default("session_ttl_hours", 12)?
        .set_default("secure_cookies", true)
}
