mod location;

use std::fmt::Display;

use itertools::Itertools as _;
use serde::{Deserialize, Serialize};

pub use location::{Location, Position};

#[macro_export]
macro_rules! errconfig {
    ($($args:tt)*) => {
        $crate::Error::InvalidConfig(format!($($args)*)).into()
    };
}

#[macro_export]
macro_rules! errio {
    ($($args:tt)*) => {
        $crate::Error::IO(format!($($args)*)).into()
    };
}

/// Compiler errors. The first three are produced by the compiler itself; the
/// rest come from the surrounding tooling (settings, logging, input reading).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// The input contains a character that no token rule of the dialect
    /// matches.
    Lexical { character: char, position: Position },
    /// The token stream doesn't fit the dialect's grammar. found is None when
    /// the input ended prematurely.
    Syntax { expected: Expected, found: Option<Found> },
    /// The requested dialect is not registered.
    UnknownDialect(String),
    /// Invalid settings, log level, or token rule pattern.
    InvalidConfig(String),
    /// An IO error.
    IO(String),
}

/// What the grammar was looking for when it hit a syntax error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expected {
    /// A token of the given kind, optionally with the given (case-insensitive)
    /// text.
    Token { kind: String, text: Option<String> },
    /// Any one of the given token kinds or texts.
    OneOf(Vec<String>),
    /// The start of a supported statement.
    Statement,
    /// The end of the input, after a complete statement.
    EndOfInput,
}

/// The token actually found where a syntax error occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Found {
    pub kind: String,
    pub text: String,
    pub location: Location,
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Lexical { character, position } => {
                write!(f, "Illegal character {character:?} at position {} ({position})", position.index)
            }
            Error::Syntax { expected, found } => {
                match expected {
                    Expected::Token { kind, text: Some(text) } => write!(f, "Expected token {kind}: {text}")?,
                    Expected::Token { kind, text: None } => write!(f, "Expected token {kind}")?,
                    Expected::OneOf(options) => write!(f, "Expected token {}", options.iter().join(" or "))?,
                    Expected::Statement => write!(f, "Expected a statement")?,
                    Expected::EndOfInput => write!(f, "Expected end of input")?,
                }
                match found {
                    Some(Found { kind, text, .. }) => write!(f, ", but found {kind}: {text}"),
                    None => write!(f, ", but found end of input"),
                }
            }
            Error::UnknownDialect(name) => write!(f, "unknown dialect {name:?}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::IO(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl Error {
    /// Returns whether the error was caused by the SQL input itself, as opposed
    /// to the caller's setup. Input errors are deterministic: compiling the
    /// same input again gives the same error.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::Lexical { .. } | Error::Syntax { .. } => true,
            Error::UnknownDialect(_) | Error::InvalidConfig(_) | Error::IO(_) => false,
        }
    }

    /// The source position the error points at, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Lexical { position, .. } => Some(*position),
            Error::Syntax { found: Some(found), .. } => Some(found.location.start),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::IO(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err.to_string())
    }
}

/// A compiler Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(kind: &str, text: &str) -> Option<Found> {
        let start = Position::START;
        Some(Found { kind: kind.to_string(), text: text.to_string(), location: Location::of(start, text) })
    }

    #[test]
    fn syntax_error_with_text() {
        let err = Error::Syntax {
            expected: Expected::Token { kind: "KEYWORD".into(), text: Some("FROM".into()) },
            found: found("IDENTIFIER", "form"),
        };
        assert_eq!(err.to_string(), "Expected token KEYWORD: FROM, but found IDENTIFIER: form");
    }

    #[test]
    fn syntax_error_without_text() {
        let err = Error::Syntax {
            expected: Expected::Token { kind: "IDENTIFIER".into(), text: None },
            found: found("KEYWORD", "FROM"),
        };
        assert_eq!(err.to_string(), "Expected token IDENTIFIER, but found KEYWORD: FROM");
        assert_eq!(err.position(), Some(Position::START));
    }

    #[test]
    fn syntax_error_at_end_of_input() {
        let err = Error::Syntax { expected: Expected::OneOf(vec!["IDENTIFIER".into(), "FUNCTION".into()]), found: None };
        assert_eq!(err.to_string(), "Expected token IDENTIFIER or FUNCTION, but found end of input");
        assert_eq!(err.position(), None);
    }

    #[test]
    fn lexical_error() {
        let err = Error::Lexical { character: '~', position: Position { index: 9, line: 1, column: 10 } };
        assert_eq!(err.to_string(), "Illegal character '~' at position 9 (line 1 column 10)");
        assert!(err.is_input_error());
    }

    #[test]
    fn macros_build_errors() {
        let result: Result<()> = errconfig!("bad level {}", "loud");
        assert_eq!(result, Err(Error::InvalidConfig("bad level loud".into())));
        let result: Result<()> = errio!("closed");
        assert_eq!(result, Err(Error::IO("closed".into())));
        assert!(!Error::UnknownDialect("postgres".into()).is_input_error());
    }
}
