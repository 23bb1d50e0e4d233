use regex::Regex;
use serde::Serialize;
use sqlc_common::{Found, Location, Result};

/// Lexical token categories. These are shared by all dialects: a dialect
/// decides which text maps to which kind through its rules, but the grammar
/// layer always reasons in terms of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// A reserved word or multi-word phrase, e.g. SELECT or INNER JOIN.
    Keyword,
    /// A complete function call, including its parenthesized arguments.
    Function,
    /// A bare, qualified or quoted identifier.
    Identifier,
    /// A quoted string literal, quotes included.
    String,
    /// A date or date-time literal, e.g. 2024-01-31 12:00:00.
    Datetime,
    /// An integer or decimal number. Leading signs are separate tokens.
    Number,
    /// A comparison operator, e.g. = or <>.
    Operator,
    /// || or &&.
    LogicalOperator,
    /// ( ) ; ,
    Punctuation,
    /// + - * /
    ArithmeticOperator,
    /// [ ] { }
    Bracket,
    /// A user or system variable, e.g. @name.
    Variable,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Function => "FUNCTION",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Datetime => "DATETIME",
            TokenKind::Number => "NUMBER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::LogicalOperator => "LOGICAL_OPERATOR",
            TokenKind::Punctuation => "PUNCTUATION",
            TokenKind::ArithmeticOperator => "ARITHMETIC_OPERATOR",
            TokenKind::Bracket => "BRACKET",
            TokenKind::Variable => "VARIABLE",
        })
    }
}

/// A lexical token. The upper field holds the upper-cased text, so that
/// grammars can compare keywords case-insensitively without re-normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub upper: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, location: Location) -> Self {
        Self { kind, text: text.to_string(), upper: text.to_uppercase(), location }
    }

    /// Returns true if the token has the given kind and, if given, the given
    /// text (compared case-insensitively).
    pub fn is(&self, kind: TokenKind, text: Option<&str>) -> bool {
        self.kind == kind && text.map_or(true, |text| self.upper == text.to_uppercase())
    }

    /// Returns true if the token is the given keyword.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is(TokenKind::Keyword, Some(keyword))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.text)
    }
}

impl From<&Token> for Found {
    fn from(token: &Token) -> Self {
        Found { kind: token.kind.to_string(), text: token.text.clone(), location: token.location }
    }
}

/// A token matching rule: a pattern, and the kind of token it produces. A
/// kind of None means the matched text is discarded (e.g. whitespace).
///
/// The pattern is always anchored at the current scan position, so a rule never
/// skips ahead in the input.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    kind: Option<TokenKind>,
}

impl Rule {
    /// Compiles a new rule. The pattern is anchored by wrapping it in ^(?:...).
    pub fn new(pattern: &str, kind: Option<TokenKind>) -> Result<Self> {
        Ok(Self { pattern: Regex::new(&format!("^(?:{pattern})"))?, kind })
    }

    /// A rule whose matches are discarded.
    pub fn skip(pattern: &str) -> Result<Self> {
        Self::new(pattern, None)
    }

    pub fn kind(&self) -> Option<TokenKind> {
        self.kind
    }

    /// Returns the non-empty text matched at the start of the input, if any.
    pub fn matches<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.pattern.find(input).map(|m| m.as_str()).filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlc_common::Position;

    #[test]
    fn rules_are_anchored() {
        let rule = Rule::new(r"\d+", Some(TokenKind::Number)).unwrap();
        assert_eq!(rule.matches("123abc"), Some("123"));
        assert_eq!(rule.matches("abc123"), None);
    }

    #[test]
    fn alternations_stay_anchored() {
        let rule = Rule::new("a|b", Some(TokenKind::Identifier)).unwrap();
        assert_eq!(rule.matches("xb"), None);
        assert_eq!(rule.matches("bx"), Some("b"));
    }

    #[test]
    fn empty_matches_are_ignored() {
        let rule = Rule::skip(r"\s*").unwrap();
        assert_eq!(rule.matches("abc"), None);
        assert_eq!(rule.matches("  abc"), Some("  "));
    }

    #[test]
    fn invalid_patterns_are_config_errors() {
        assert!(matches!(Rule::new("(", None), Err(sqlc_common::Error::InvalidConfig(_))));
    }

    #[test]
    fn token_comparison_ignores_case() {
        let token = Token::new(TokenKind::Keyword, "Select", Location::of(Position::START, "Select"));
        assert_eq!(token.upper, "SELECT");
        assert!(token.is_keyword("select"));
        assert!(token.is(TokenKind::Keyword, None));
        assert!(!token.is(TokenKind::Identifier, Some("select")));
        assert_eq!(token.to_string(), "KEYWORD: Select");
    }
}
