//! Error types for the session registry.

use thiserror::Error;

/// Why a registry operation was refused.
///
/// All variants are business errors: the connection that triggered
/// them stays open and receives the message as an error response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Login attempted with an empty display name.
    #[error("empty username")]
    EmptyName,

    /// Display name longer than [`MAX_USERNAME_LEN`](crate::MAX_USERNAME_LEN).
    #[error("username too long")]
    NameTooLong,

    /// Another registered session already owns this display name.
    #[error("user already exists")]
    DuplicateName,

    /// The connection already has a registered session; logging in
    /// twice would orphan the first session's name and color.
    #[error("you are already logged in")]
    AlreadyLoggedIn,

    /// Every palette color is taken; registering would force a color
    /// collision, so the login is refused instead.
    #[error("chat is full")]
    PaletteExhausted,

    /// No session registered under the given connection key.
    #[error("client does not exist")]
    NotFound,
}
