use serde::{Deserialize, Serialize};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A serializable error for client rendering.
///
/// When `RUST_BACKTRACE=1` is set, the message will include the full backtrace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Error {
    /// The error message (includes the context chain from anyhow's Debug output)
    pub message: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(report: anyhow::Error) -> Self {
        Self {
            message: format!("{:?}", report),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self {
            message: s.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self { message: s }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn anyhow_context_is_kept() {
        let res: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let error: Error = res.context("failed to query guardians").unwrap_err().into();

        assert!(error.message.contains("failed to query guardians"));
        assert!(error.message.contains("connection refused"));
    }

    #[test]
    fn err_macro_formats() {
        let error = crate::err!("guardian {} not found", "g1");
        assert!(error.to_string().starts_with("guardian g1 not found"));
    }
}
