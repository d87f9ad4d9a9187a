use anyhow::Context;
use base64::prelude::*;
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use types::{Result, UserSession, decode_session, encode_session, err};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies session cookie values of the form `<payload>.<signature>`.
#[derive(Clone)]
pub struct SessionSigner {
    key: SecretString,
}

impl SessionSigner {
    pub fn new(key: SecretString) -> Self {
        Self { key }
    }

    fn mac(&self) -> Result<HmacSha256> {
        Ok(HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .context("invalid session key")?)
    }

    pub fn sign(&self, session: &UserSession) -> Result<String> {
        let payload = encode_session(session)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    pub fn verify(&self, value: &str) -> Result<UserSession> {
        let (payload, signature_b64) = value
            .split_once('.')
            .ok_or_else(|| err!("invalid session format"))?;

        let signature = BASE64_URL_SAFE_NO_PAD
            .decode(signature_b64)
            .context("invalid session signature encoding")?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| err!("session signature mismatch"))?;

        let session = decode_session(payload)?;
        if session.is_expired(Timestamp::now()) {
            return Err(err!("session expired"));
        }

        Ok(session)
    }
}

/// Find the session cookie in a `Cookie` header value.
pub fn find_session_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix(types::SESSION_COOKIE_NAME)?.strip_prefix('='))
}
