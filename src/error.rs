use thiserror::Error;

/// Errors returned while turning command-line tokens into a duration.
///
/// Both variants carry the offending token as typed, and their `Display`
/// output is the exact line printed to stderr.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}: wrong time")]
    WrongTime(String),
    #[error("{0}: time too large")]
    TooLarge(String),
}
