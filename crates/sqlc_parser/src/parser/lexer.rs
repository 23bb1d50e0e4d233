use log::trace;
use sqlc_common::{Error, Location, Position, Result};

use super::token::{Rule, Token};

/// The lexer (lexical analyzer) splits a raw SQL string into a sequence of
/// lexical tokens (e.g. keyword, number, string), which are pulled one at a
/// time by the dialect's grammar. It knows nothing about SQL itself: the
/// dialect supplies an ordered list of matching rules, and at each position the
/// first rule that matches wins, even if a later rule would match more text.
///
/// Rules without a token kind (e.g. whitespace) are consumed silently, so the
/// grammar never sees them.
pub struct Lexer<'a> {
    input: &'a str,
    rules: &'a [Rule],
    position: Position,
    /// Set after an error, to stop iteration.
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given string and rules.
    pub fn new(input: &'a str, rules: &'a [Rule]) -> Lexer<'a> {
        Lexer { input, rules, position: Position::START, failed: false }
    }

    /// The position of the next character to scan.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Scans the next token, or returns None at the end of the input. Errors
    /// if no rule matches the next character.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let (input, rules) = (self.input, self.rules);
        'scan: while let Some(rest) = input.get(self.position.index..).filter(|rest| !rest.is_empty()) {
            for rule in rules {
                let Some(text) = rule.matches(rest) else {
                    continue;
                };
                let start = self.position;
                self.position = start.advance(text);
                match rule.kind() {
                    Some(kind) => {
                        let token = Token::new(kind, text, Location::new(start, self.position));
                        trace!("token {token} at {start}");
                        return Ok(Some(token));
                    }
                    // Discarded text: rescan from the first rule.
                    None => {
                        trace!("skipped {} bytes at {start}", text.len());
                        continue 'scan;
                    }
                }
            }
            let character = rest.chars().next().unwrap_or_default();
            return Err(Error::Lexical { character, position: self.position });
        }
        Ok(None)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Result<Token>> {
        if self.failed {
            return None;
        }
        let result = self.next_token().transpose();
        self.failed = matches!(result, Some(Err(_)));
        result
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
