use anyhow::Context;
use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::Result;

pub const SESSION_COOKIE_NAME: &str = "roster_session";

/// The signed-in administrator, as carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Stable subject id from the identity provider. Guardians are owned by this id.
    pub uid: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub expires_at: Timestamp,
}

impl UserSession {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// First letter of the display name, for the sidebar avatar.
    pub fn initial(&self) -> String {
        self.display_name
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string()
    }
}

pub fn encode_session(session: &UserSession) -> Result<String> {
    let json = serde_json::to_string(session).context("failed to serialize session")?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

pub fn decode_session(encoded: &str) -> Result<UserSession> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(encoded)
        .context("failed to decode base64")?;
    let json = String::from_utf8(bytes).context("invalid UTF-8 in session")?;
    Ok(serde_json::from_str(&json).context("failed to parse session JSON")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_session("not base64!").is_err());
        let not_json = BASE64_URL_SAFE_NO_PAD.encode(b"{\"uid\":");
        assert!(decode_session(&not_json).is_err());
    }

    #[test]
    fn initial_is_uppercased() {
        let session = UserSession {
            uid: "u1".into(),
            display_name: "ada".into(),
            email: None,
            expires_at: "2030-01-01T00:00:00Z".parse().unwrap(),
        };
        assert_eq!(session.initial(), "A");
        assert_eq!(decode_session(&encode_session(&session).unwrap()).unwrap(), session);
    }

    #[test]
    fn expiry_is_inclusive() {
        let expires_at: Timestamp = "2030-01-01T00:00:00Z".parse().unwrap();
        let session = UserSession {
            uid: "u1".into(),
            display_name: "Ada".into(),
            email: None,
            expires_at,
        };

        assert!(!session.is_expired("2029-12-31T23:59:59Z".parse().unwrap()));
        assert!(session.is_expired(expires_at));
    }
}
