use log::debug;
use sqlc_common::Result;

use super::ast::Statement;
use super::dialect::{Cursor, Dialect, DialectName, MySql};
use super::lexer::Lexer;
use super::token::Token;

/// Compiles a single SQL statement into a syntax tree. The dialect is looked
/// up by name, and the statement must span the entire input: trailing tokens,
/// even a semicolon, are rejected.
///
/// A compiler is a cheap handle; each compile call builds its own lexer,
/// cursor and dialect instance, so compilers can be used concurrently.
pub struct Compiler<'a> {
    sql: &'a str,
    dialect: &'a str,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler for the default dialect.
    pub fn new(sql: &'a str) -> Self {
        Self { sql, dialect: DialectName::default().as_str() }
    }

    /// Creates a compiler for the named dialect. The name is resolved when
    /// compiling.
    pub fn with_dialect(sql: &'a str, dialect: &'a str) -> Self {
        Self { sql, dialect }
    }

    /// Compiles the statement.
    pub fn compile(&self) -> Result<Statement> {
        let dialect: DialectName = self.dialect.parse()?;
        debug!("compiling {} bytes of SQL with dialect {dialect}", self.sql.len());
        let statement = match dialect {
            DialectName::MySql => compile_with::<MySql>(self.sql)?,
        };
        debug!("compiled {} statement", statement.kind());
        Ok(statement)
    }

    /// Tokenizes the input without parsing it.
    pub fn tokenize(&self) -> Result<Vec<Token>> {
        let dialect: DialectName = self.dialect.parse()?;
        Lexer::new(self.sql, dialect.rules()).collect()
    }
}

/// Compiles a statement with the named dialect.
pub fn compile(sql: &str, dialect: &str) -> Result<Statement> {
    Compiler::with_dialect(sql, dialect).compile()
}

/// Tokenizes a string with the named dialect's rules.
pub fn tokenize(sql: &str, dialect: &str) -> Result<Vec<Token>> {
    Compiler::with_dialect(sql, dialect).tokenize()
}

fn compile_with<'a, D: Dialect<'a>>(sql: &'a str) -> Result<Statement> {
    let mut dialect = D::new(Cursor::new(Lexer::new(sql, D::rules()))?);
    let statement = dialect.parse_statement()?;
    dialect.into_cursor().finish()?;
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::TokenKind;
    use sqlc_common::{Error, Expected};

    #[test]
    fn default_dialect_is_mysql() {
        let sql = "SELECT a FROM t";
        assert_eq!(Compiler::new(sql).compile(), compile(sql, "mysql"));
    }

    #[test]
    fn unknown_dialect() {
        assert_eq!(compile("SELECT a FROM t", "postgres"), Err(Error::UnknownDialect("postgres".into())));
        assert_eq!(tokenize("SELECT", "sqlite"), Err(Error::UnknownDialect("sqlite".into())));
    }

    #[test]
    fn dialect_name_ignores_case() {
        assert!(compile("SELECT a FROM t", "MySQL").is_ok());
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = compile("SELECT a FROM t;", "mysql").unwrap_err();
        let Error::Syntax { expected: Expected::EndOfInput, found: Some(found) } = err else {
            panic!("expected trailing token error, got {err:?}");
        };
        assert_eq!(found.text, ";");
        assert_eq!(found.location.start.index, 15);
    }

    #[test]
    fn compiling_twice_gives_the_same_tree() {
        let compiler = Compiler::new("SELECT a, count(b) FROM t JOIN u ON t.id = u.id WHERE a <> 'x'");
        assert_eq!(compiler.compile().unwrap(), compiler.compile().unwrap());
    }

    #[test]
    fn tokenize_returns_all_tokens() {
        let tokens = tokenize("SELECT a FROM t;", "mysql").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Punctuation,
            ]
        );
    }

    #[test]
    fn concurrent_compiles() {
        let handles: Vec<_> = (0..4)
            .map(|i| std::thread::spawn(move || compile(&format!("DELETE FROM t{i} WHERE id = {i}"), "mysql")))
            .collect();
        for handle in handles {
            assert!(matches!(handle.join().unwrap(), Ok(Statement::Delete(_))));
        }
    }
}
