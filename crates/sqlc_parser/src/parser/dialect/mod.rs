//! SQL dialects. A dialect is the pluggable part of the compiler: it supplies
//! the token rules the lexer scans with, and the grammar that turns the token
//! stream into a syntax tree. The lexer and the compile driver are shared.

mod mysql;

pub use mysql::MySql;

use std::str::FromStr;

use itertools::Itertools as _;
use sqlc_common::{Error, Expected, Found, Result};

use super::ast::Statement;
use super::lexer::Lexer;
use super::token::{Rule, Token, TokenKind};

/// A SQL dialect. Each compile call creates a fresh dialect instance, which
/// takes ownership of the token cursor: nothing else pulls tokens while the
/// dialect parses.
pub trait Dialect<'a>: Sized {
    /// The name the dialect is registered under.
    const NAME: &'static str;

    /// The ordered token rules. The first rule matching at a position wins, so
    /// more specific rules must come first.
    fn rules() -> &'static [Rule];

    /// Creates a dialect instance over the given cursor.
    fn new(cursor: Cursor<'a>) -> Self;

    fn cursor_mut(&mut self) -> &mut Cursor<'a>;

    /// Gives up the cursor, e.g. to check that all input was consumed.
    fn into_cursor(self) -> Cursor<'a>;

    /// Parses a single statement, consuming tokens until it is syntactically
    /// complete. Trailing tokens are left for the caller to reject.
    fn parse_statement(&mut self) -> Result<Statement>;

    /// Consumes the current token if it has the given kind and (optionally)
    /// text, otherwise errors.
    fn expect(&mut self, kind: TokenKind, text: Option<&str>) -> Result<Token> {
        self.cursor_mut().expect(kind, text)
    }
}

/// A single-owner cursor over the lexer's token stream. It holds the current
/// token, which only ever moves forward.
pub struct Cursor<'a> {
    lexer: Lexer<'a>,
    current: Option<Token>,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor, pulling the first token from the lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// The current token, or None at the end of the input.
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Returns true if the current token has the given kind and text.
    pub fn peek_is(&self, kind: TokenKind, text: Option<&str>) -> bool {
        self.current.as_ref().is_some_and(|token| token.is(kind, text))
    }

    /// Returns true if the current token is the given keyword.
    pub fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek_is(TokenKind::Keyword, Some(keyword))
    }

    /// Returns the current token and moves to the next one. Returns None
    /// without advancing at the end of the input.
    pub fn advance(&mut self) -> Result<Option<Token>> {
        if self.current.is_none() {
            return Ok(None);
        }
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consumes and returns the current token if it satisfies the predicate.
    pub fn next_if(&mut self, predicate: impl Fn(&Token) -> bool) -> Result<Option<Token>> {
        if self.current.as_ref().is_some_and(predicate) {
            return self.advance();
        }
        Ok(None)
    }

    /// Consumes the current token if it is the given keyword.
    pub fn next_if_keyword(&mut self, keyword: &str) -> Result<Option<Token>> {
        self.next_if(|token| token.is_keyword(keyword))
    }

    /// Consumes the current token if it has the given kind and (optionally)
    /// case-insensitive text, otherwise errors with what was expected and what
    /// was found.
    pub fn expect(&mut self, kind: TokenKind, text: Option<&str>) -> Result<Token> {
        match self.next_if(|token| token.is(kind, text))? {
            Some(token) => Ok(token),
            None => Err(self.unexpected(Expected::Token {
                kind: kind.to_string(),
                text: text.map(str::to_uppercase),
            })),
        }
    }

    /// Consumes the current token if it has one of the given kinds.
    pub fn expect_one_of(&mut self, kinds: &[TokenKind]) -> Result<Token> {
        match self.next_if(|token| kinds.contains(&token.kind))? {
            Some(token) => Ok(token),
            None => Err(self.unexpected(Expected::OneOf(kinds.iter().map(|k| k.to_string()).collect()))),
        }
    }

    /// Builds a syntax error for the current token.
    pub fn unexpected(&self, expected: Expected) -> Error {
        Error::Syntax { expected, found: self.current.as_ref().map(Found::from) }
    }

    /// Checks that all input has been consumed.
    pub fn finish(self) -> Result<()> {
        match self.current {
            None => Ok(()),
            Some(ref token) => Err(Error::Syntax { expected: Expected::EndOfInput, found: Some(token.into()) }),
        }
    }
}

/// The registered dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialectName {
    #[default]
    MySql,
}

impl DialectName {
    /// All registered dialects.
    pub const ALL: [DialectName; 1] = [DialectName::MySql];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialectName::MySql => MySql::NAME,
        }
    }

    /// The dialect's token rules.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            DialectName::MySql => MySql::rules(),
        }
    }

    /// Lists the registered dialect names, comma-separated.
    pub fn list() -> String {
        Self::ALL.iter().map(|name| name.as_str()).join(", ")
    }
}

impl FromStr for DialectName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownDialect(name.to_string()))
    }
}

impl std::fmt::Display for DialectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlc_common::Position;

    fn cursor(input: &str) -> Cursor<'_> {
        Cursor::new(Lexer::new(input, MySql::rules())).unwrap()
    }

    #[test]
    fn cursor_starts_on_first_token() {
        let cursor = cursor("  SELECT a");
        assert!(cursor.peek_keyword("select"));
        assert_eq!(cursor.current().unwrap().location.start, Position { index: 2, line: 1, column: 3 });
    }

    #[test]
    fn cursor_on_empty_input() {
        let mut cursor = cursor(" ");
        assert!(cursor.current().is_none());
        assert_eq!(cursor.advance(), Ok(None));
        assert!(cursor.finish().is_ok());
    }

    #[test]
    fn cursor_on_illegal_first_character() {
        let result = Cursor::new(Lexer::new("~", MySql::rules()));
        assert!(matches!(result, Err(Error::Lexical { character: '~', .. })));
    }

    #[test]
    fn expect_advances_on_match() {
        let mut cursor = cursor("select a");
        let token = cursor.expect(TokenKind::Keyword, Some("SELECT")).unwrap();
        assert_eq!(token.text, "select");
        assert!(cursor.peek_is(TokenKind::Identifier, Some("A")));
    }

    #[test]
    fn expect_reports_mismatch() {
        let mut cursor = cursor("SELECT FROM");
        cursor.advance().unwrap();
        let err = cursor.expect(TokenKind::Identifier, None).unwrap_err();
        assert_eq!(err.to_string(), "Expected token IDENTIFIER, but found KEYWORD: FROM");
        // The cursor does not move on errors.
        assert!(cursor.peek_keyword("FROM"));
    }

    #[test]
    fn expect_reports_text_and_end_of_input() {
        let mut cursor = cursor("");
        let err = cursor.expect(TokenKind::Keyword, Some("from")).unwrap_err();
        assert_eq!(err.to_string(), "Expected token KEYWORD: FROM, but found end of input");
    }

    #[test]
    fn expect_one_of_names_all_kinds() {
        let mut cursor = cursor(",");
        let err = cursor.expect_one_of(&[TokenKind::String, TokenKind::Number]).unwrap_err();
        assert_eq!(err.to_string(), "Expected token STRING or NUMBER, but found PUNCTUATION: ,");
    }

    #[test]
    fn finish_rejects_leftover_tokens() {
        let cursor = cursor(";");
        assert_eq!(cursor.finish().unwrap_err().to_string(), "Expected end of input, but found PUNCTUATION: ;");
    }

    #[test]
    fn dialect_names() {
        assert_eq!("mysql".parse::<DialectName>(), Ok(DialectName::MySql));
        assert_eq!("MySQL".parse::<DialectName>(), Ok(DialectName::MySql));
        assert_eq!("postgres".parse::<DialectName>(), Err(Error::UnknownDialect("postgres".into())));
        assert_eq!(DialectName::default().to_string(), "mysql");
        assert_eq!(DialectName::list(), "mysql");
    }
}
