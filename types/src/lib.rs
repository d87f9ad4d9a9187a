pub mod account;
pub mod document;
mod error;
mod session;

pub use account::{Account, Guardian, Student};
pub use error::{Error, Result};
pub use session::{SESSION_COOKIE_NAME, UserSession, decode_session, encode_session};

#[doc(hidden)]
pub use anyhow::anyhow as internal_anyhow_dont_use;

/// Build a [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from($crate::internal_anyhow_dont_use!($($arg)*))
    };
}
