use std::sync::LazyLock;

use itertools::Itertools as _;
use sqlc_common::{Error, Expected, Location, Result};

use super::{Cursor, Dialect};
use crate::parser::ast::*;
use crate::parser::token::{Rule, Token, TokenKind};

/// Function names that form a FUNCTION token when immediately followed by a
/// parenthesized argument list, as in MySQL without IGNORE_SPACE: `year(d)` is
/// a call, `year (id INT)` is a name followed by a parenthesis. The whole call,
/// arguments included, is a single token. Arguments may nest one level deep,
/// e.g. `concat(a, lower(b))`; deeper nesting is not a FUNCTION token, and
/// the name lexes as an identifier followed by punctuation.
const FUNCTIONS: &str = "COUNT|SUM|AVG|MIN|MAX|CONCAT|SUBSTRING|TRIM|UPPER|LOWER|DATE_FORMAT|DATE_ADD|DATE_SUB|NOW|\
    YEAR|MONTH|DAY|HOUR|MINUTE|SECOND|IF|IFNULL|COALESCE|CAST|CONVERT|GROUP_CONCAT";

/// Reserved words. Multi-word phrases come first, since the first alternative
/// that matches wins.
const KEYWORDS: &str = "START\\s+TRANSACTION|GROUP\\s+BY|ORDER\\s+BY|INNER\\s+JOIN|LEFT\\s+(?:OUTER\\s+)?JOIN|\
    RIGHT\\s+(?:OUTER\\s+)?JOIN|CROSS\\s+JOIN|SELECT|FROM|WHERE|INSERT|INTO|VALUES|UPDATE|SET|DELETE|AND|OR|NOT|LIKE|\
    BETWEEN|IN|IS|NULL|TRUE|FALSE|UNKNOWN|HAVING|LIMIT|OFFSET|UNION|DISTINCT|JOIN|ON|AS|CASE|WHEN|THEN|ELSE|END|\
    CREATE|DROP|ALTER|TABLE|DATABASE|SCHEMA|INDEX|VIEW|PROCEDURE|FUNCTION|TRIGGER|USE|SHOW|DESCRIBE|GRANT|REVOKE|\
    COMMIT|ROLLBACK|SAVEPOINT|REPLACE|TRUNCATE|EXISTS|ALL|ANY";

/// Keywords that may still be used as table or database names.
const NON_RESERVED: [&str; 5] = ["TABLE", "DATABASE", "SCHEMA", "INDEX", "VIEW"];

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let function = format!(r"(?i:{FUNCTIONS})\((?:[^()]|\([^()]*\))*\)");
    let keyword = format!(r"(?i:{KEYWORDS})\b");
    [
        (r"\s+", None),
        (r"--[^\n]*|#[^\n]*|/\*(?s:.*?)\*/", None),
        (function.as_str(), Some(TokenKind::Function)),
        (keyword.as_str(), Some(TokenKind::Keyword)),
        (r"`[^`]+`", Some(TokenKind::Identifier)),
        (r"[A-Za-z_][A-Za-z0-9_]*(?:\.(?:[A-Za-z_][A-Za-z0-9_]*|\*))*", Some(TokenKind::Identifier)),
        (r#"'(?:[^'\\]|(?s:\\.)|'')*'|"(?:[^"\\]|(?s:\\.)|"")*""#, Some(TokenKind::String)),
        (r"\d{4}-\d{2}-\d{2}(?:\s\d{2}:\d{2}:\d{2})?", Some(TokenKind::Datetime)),
        (r"\d+\.\d*|\.\d+|\d+", Some(TokenKind::Number)),
        (r"[=<>!]+", Some(TokenKind::Operator)),
        (r"\|\||&&", Some(TokenKind::LogicalOperator)),
        (r"[();,]", Some(TokenKind::Punctuation)),
        (r"[+*/-]", Some(TokenKind::ArithmeticOperator)),
        (r"[\[\]{}]", Some(TokenKind::Bracket)),
        (r"@@?[A-Za-z_][A-Za-z0-9_]*|\$", Some(TokenKind::Variable)),
    ]
    .into_iter()
    .map(|(pattern, kind)| Rule::new(pattern, kind).expect("invalid MySQL token rule"))
    .collect()
});

/// Statement categories, keyed by their leading keyword. Checked in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementCategory {
    Dml,
    Ddl,
    Admin,
}

impl StatementCategory {
    const ALL: [StatementCategory; 3] = [StatementCategory::Dml, StatementCategory::Ddl, StatementCategory::Admin];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            StatementCategory::Dml => &["SELECT", "INSERT", "UPDATE", "DELETE"],
            StatementCategory::Ddl => &["CREATE", "ALTER", "DROP", "TABLE", "DATABASE"],
            StatementCategory::Admin => &["USE", "SHOW"],
        }
    }

    /// Looks up the category of an upper-cased leading keyword.
    fn of(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.keywords().contains(&keyword))
    }
}

/// The MySQL reference dialect: a recursive descent parser over the token
/// stream, with one method per grammar rule and a single token of lookahead.
///
/// It covers a minimal subset of MySQL: SELECT with joins, INSERT, UPDATE,
/// DELETE, CREATE/DROP TABLE and DATABASE, USE, and SHOW. WHERE and ON
/// clauses hold a single comparison.
pub struct MySql<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Dialect<'a> for MySql<'a> {
    const NAME: &'static str = "mysql";

    fn rules() -> &'static [Rule] {
        &RULES
    }

    fn new(cursor: Cursor<'a>) -> Self {
        Self { cursor }
    }

    fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    fn into_cursor(self) -> Cursor<'a> {
        self.cursor
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let category = self
            .cursor
            .current()
            .filter(|token| token.kind == TokenKind::Keyword)
            .and_then(|token| StatementCategory::of(&token.upper));
        match category {
            Some(StatementCategory::Dml) => self.parse_dml(),
            Some(StatementCategory::Ddl) => self.parse_ddl().map(Statement::Ddl),
            Some(StatementCategory::Admin) => self.parse_admin().map(Statement::Admin),
            None => Err(self.cursor.unexpected(Expected::Statement)),
        }
    }
}

impl MySql<'_> {
    /// The upper-cased text of the current token, or "" at the end.
    fn current_upper(&self) -> String {
        self.cursor.current().map(|token| token.upper.clone()).unwrap_or_default()
    }

    /// Consumes the given punctuation character.
    fn expect_punctuation(&mut self, punctuation: &str) -> Result<Token> {
        self.expect(TokenKind::Punctuation, Some(punctuation))
    }

    /// Consumes a comma, if any.
    fn next_if_comma(&mut self) -> Result<bool> {
        Ok(self.cursor.next_if(|token| token.is(TokenKind::Punctuation, Some(",")))?.is_some())
    }

    /// Parses a comma-separated list of at least one item.
    fn parse_list<T>(&mut self, mut parse: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut items = vec![parse(self)?];
        while self.next_if_comma()? {
            items.push(parse(self)?);
        }
        Ok(items)
    }

    /// Parses a DML statement: SELECT, INSERT, UPDATE or DELETE.
    fn parse_dml(&mut self) -> Result<Statement> {
        Ok(match self.current_upper().as_str() {
            "SELECT" => Statement::Select(self.parse_select()?),
            "INSERT" => Statement::Insert(self.parse_insert()?),
            "UPDATE" => Statement::Update(self.parse_update()?),
            "DELETE" => Statement::Delete(self.parse_delete()?),
            _ => return Err(self.cursor.unexpected(Expected::Statement)),
        })
    }

    /// Parses a SELECT statement.
    fn parse_select(&mut self) -> Result<Select> {
        self.expect(TokenKind::Keyword, Some("SELECT"))?;
        let columns = self.parse_list(Self::parse_column)?;
        self.expect(TokenKind::Keyword, Some("FROM"))?;
        let table = self.parse_table()?;
        let mut joins = Vec::new();
        while let Some(r#type) = self.parse_join_type()? {
            let table = self.parse_table()?;
            self.expect(TokenKind::Keyword, Some("ON"))?;
            let condition = self.parse_condition()?;
            joins.push(Join { r#type, table, condition });
        }
        let r#where = self.parse_where()?;
        Ok(Select { columns, table, joins, r#where })
    }

    /// Parses an INSERT statement with a column list and a single row.
    fn parse_insert(&mut self) -> Result<Insert> {
        self.expect(TokenKind::Keyword, Some("INSERT"))?;
        self.expect(TokenKind::Keyword, Some("INTO"))?;
        let table = self.parse_table()?;
        self.expect_punctuation("(")?;
        let columns = self.parse_list(Self::parse_insert_column)?;
        self.expect_punctuation(")")?;
        self.expect(TokenKind::Keyword, Some("VALUES"))?;
        self.expect_punctuation("(")?;
        let values = self.parse_list(Self::parse_value)?;
        self.expect_punctuation(")")?;
        Ok(Insert { table, columns, values })
    }

    /// Parses an UPDATE statement.
    fn parse_update(&mut self) -> Result<Update> {
        self.expect(TokenKind::Keyword, Some("UPDATE"))?;
        let table = self.parse_table()?;
        self.expect(TokenKind::Keyword, Some("SET"))?;
        let updates = self.parse_list(Self::parse_assignment)?;
        let r#where = self.parse_where()?;
        Ok(Update { table, updates, r#where })
    }

    /// Parses a DELETE statement.
    fn parse_delete(&mut self) -> Result<Delete> {
        self.expect(TokenKind::Keyword, Some("DELETE"))?;
        self.expect(TokenKind::Keyword, Some("FROM"))?;
        let table = self.parse_table()?;
        let r#where = self.parse_where()?;
        Ok(Delete { table, r#where })
    }

    /// Parses a DDL statement. Only CREATE and DROP of tables and databases
    /// are supported; other DDL keywords are rejected.
    fn parse_ddl(&mut self) -> Result<Ddl> {
        let action = self.expect(TokenKind::Keyword, None)?;
        let create = match action.upper.as_str() {
            "CREATE" => true,
            "DROP" => false,
            _ => return Err(Error::Syntax { expected: Expected::Statement, found: Some((&action).into()) }),
        };
        if self.cursor.next_if_keyword("TABLE")?.is_some() {
            let table = self.parse_table()?;
            if !create {
                return Ok(Ddl::DropTable { table });
            }
            self.expect_punctuation("(")?;
            let columns = self.parse_list(Self::parse_column_def)?;
            self.expect_punctuation(")")?;
            return Ok(Ddl::CreateTable { table, columns });
        }
        if self.cursor.next_if_keyword("DATABASE")?.is_some() {
            let database = self.parse_name()?;
            return Ok(match create {
                true => Ddl::CreateDatabase { database },
                false => Ddl::DropDatabase { database },
            });
        }
        Err(self.cursor.unexpected(Expected::OneOf(vec!["KEYWORD: TABLE".into(), "KEYWORD: DATABASE".into()])))
    }

    /// Parses a column definition: a name, a type, and optional type length
    /// arguments, e.g. price DECIMAL(10, 2).
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.parse_ident()?;
        let datatype = self.parse_ident()?;
        let mut length = Vec::new();
        if self.cursor.next_if(|token| token.is(TokenKind::Punctuation, Some("(")))?.is_some() {
            length.push(literal(self.expect(TokenKind::Number, None)?));
            if self.next_if_comma()? {
                length.push(literal(self.expect(TokenKind::Number, None)?));
            }
            self.expect_punctuation(")")?;
        }
        Ok(ColumnDef { name, datatype, length })
    }

    /// Parses a database operation: USE or SHOW.
    fn parse_admin(&mut self) -> Result<Admin> {
        let operation = self.expect(TokenKind::Keyword, None)?;
        match operation.upper.as_str() {
            "USE" => Ok(Admin::Use { database: self.parse_ident()? }),
            "SHOW" => Ok(Admin::Show { target: self.parse_ident()? }),
            _ => Err(Error::Syntax { expected: Expected::Statement, found: Some((&operation).into()) }),
        }
    }

    /// Parses a column list entry: a column, function call or *, optionally
    /// followed by an alias.
    fn parse_column(&mut self) -> Result<SelectColumn> {
        let expr = if self.cursor.peek_is(TokenKind::Identifier, None) {
            Projection::Column(self.parse_ident()?)
        } else if let Some(token) = self.cursor.next_if(|token| token.kind == TokenKind::Function)? {
            Projection::Function(function_call(token))
        } else if let Some(token) = self.cursor.next_if(|token| token.is(TokenKind::ArithmeticOperator, Some("*")))? {
            Projection::All(token.location)
        } else {
            return Err(self.cursor.unexpected(Expected::OneOf(vec![
                TokenKind::Identifier.to_string(),
                TokenKind::Function.to_string(),
                "*".into(),
            ])));
        };
        let alias = self.parse_alias()?;
        Ok(SelectColumn { expr, alias })
    }

    /// Parses an INSERT column list entry: a column or function call, without
    /// an alias.
    fn parse_insert_column(&mut self) -> Result<SelectColumn> {
        let token = self.cursor.expect_one_of(&[TokenKind::Identifier, TokenKind::Function])?;
        let expr = match token.kind {
            TokenKind::Function => Projection::Function(function_call(token)),
            _ => Projection::Column(ident(token)),
        };
        Ok(SelectColumn { expr, alias: None })
    }

    /// Parses a table reference with an optional alias.
    fn parse_table(&mut self) -> Result<TableRef> {
        let name = self.parse_name()?;
        let alias = self.parse_alias()?;
        Ok(TableRef { name, alias })
    }

    /// Parses an optional alias: AS followed by an identifier, or a bare
    /// identifier. Keywords are never taken as a bare alias.
    fn parse_alias(&mut self) -> Result<Option<Ident>> {
        if self.cursor.next_if_keyword("AS")?.is_some() || self.cursor.peek_is(TokenKind::Identifier, None) {
            return Ok(Some(self.parse_ident()?));
        }
        Ok(None)
    }

    /// Parses a join type keyword, if any.
    fn parse_join_type(&mut self) -> Result<Option<JoinType>> {
        let Some(token) = self.cursor.current().filter(|token| token.kind == TokenKind::Keyword) else {
            return Ok(None);
        };
        let r#type = match token.upper.split_whitespace().join(" ").as_str() {
            "JOIN" => JoinType::Join,
            "INNER JOIN" => JoinType::Inner,
            "LEFT JOIN" | "LEFT OUTER JOIN" => JoinType::Left,
            "RIGHT JOIN" | "RIGHT OUTER JOIN" => JoinType::Right,
            "CROSS JOIN" => JoinType::Cross,
            _ => return Ok(None),
        };
        self.cursor.advance()?;
        Ok(Some(r#type))
    }

    /// Parses an optional WHERE clause.
    fn parse_where(&mut self) -> Result<Option<Condition>> {
        if self.cursor.next_if_keyword("WHERE")?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.parse_condition()?))
    }

    /// Parses a single comparison: column, operator, then a column or literal.
    fn parse_condition(&mut self) -> Result<Condition> {
        let left = self.parse_ident()?;
        let token = self.expect(TokenKind::Operator, None)?;
        let operator = Operator::try_from(token.text.as_str()).map_err(|_| Error::Syntax {
            expected: Expected::OneOf(Operator::ALL.iter().map(|op| op.to_string()).collect()),
            found: Some((&token).into()),
        })?;
        let right = if self.cursor.peek_is(TokenKind::Identifier, None) {
            Operand::Column(self.parse_ident()?)
        } else if let Some(number) = self.parse_signed_number()? {
            Operand::Literal(number)
        } else {
            let token = self.cursor.expect_one_of(&[
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::String,
                TokenKind::Datetime,
            ])?;
            Operand::Literal(literal(token))
        };
        Ok(Condition { left, operator, right })
    }

    /// Parses a SET assignment: column = 'string'.
    fn parse_assignment(&mut self) -> Result<Assignment> {
        let column = self.parse_ident()?;
        self.expect(TokenKind::Operator, Some("="))?;
        let value = literal(self.expect(TokenKind::String, None)?);
        Ok(Assignment { column, value })
    }

    /// Parses an INSERT value: a string, number, date-time, NULL, TRUE or
    /// FALSE.
    fn parse_value(&mut self) -> Result<Literal> {
        if let Some(number) = self.parse_signed_number()? {
            return Ok(number);
        }
        let keyword = self.cursor.next_if(|token| {
            token.kind == TokenKind::Keyword && matches!(token.upper.as_str(), "NULL" | "TRUE" | "FALSE")
        })?;
        let token = match keyword {
            Some(token) => token,
            None => self.cursor.expect_one_of(&[TokenKind::String, TokenKind::Number, TokenKind::Datetime])?,
        };
        Ok(literal(token))
    }

    /// Parses a number preceded by a + or - sign, if the current token is a
    /// sign. The sign is folded into the literal, e.g. -5.
    fn parse_signed_number(&mut self) -> Result<Option<Literal>> {
        let Some(sign) = self.cursor.next_if(|token| {
            token.kind == TokenKind::ArithmeticOperator && matches!(token.text.as_str(), "+" | "-")
        })?
        else {
            return Ok(None);
        };
        let number = self.expect(TokenKind::Number, None)?;
        let value = match sign.text.as_str() {
            "-" => format!("-{}", number.text),
            _ => number.text,
        };
        let location = Location::new(sign.location.start, number.location.end);
        Ok(Some(Literal { kind: LiteralKind::Number, value, location }))
    }

    /// Parses an identifier.
    fn parse_ident(&mut self) -> Result<Ident> {
        Ok(ident(self.expect(TokenKind::Identifier, None)?))
    }

    /// Parses a table or database name: an identifier, or a non-reserved
    /// keyword such as TABLE.
    fn parse_name(&mut self) -> Result<Ident> {
        let keyword = self.cursor.next_if(|token| {
            token.kind == TokenKind::Keyword && NON_RESERVED.contains(&token.upper.as_str())
        })?;
        match keyword {
            Some(token) => Ok(ident(token)),
            None => self.parse_ident(),
        }
    }
}

/// Builds an identifier from a token, stripping quoting backticks.
fn ident(token: Token) -> Ident {
    let value = match token.text.strip_prefix('`').and_then(|text| text.strip_suffix('`')) {
        Some(unquoted) => unquoted.to_string(),
        None => token.text,
    };
    Ident { value, location: token.location }
}

/// Builds a function call from a FUNCTION token.
fn function_call(token: Token) -> FunctionCall {
    let name = token.upper.split('(').next().unwrap_or_default().trim_end().to_string();
    FunctionCall { name, text: token.text, location: token.location }
}

/// Builds a literal from a value token.
fn literal(token: Token) -> Literal {
    let (kind, value) = match token.kind {
        TokenKind::String => (LiteralKind::String, unquote(&token.text)),
        TokenKind::Keyword if token.upper == "NULL" => (LiteralKind::Null, token.upper),
        TokenKind::Keyword => (LiteralKind::Boolean, token.upper),
        TokenKind::Datetime => (LiteralKind::Datetime, token.text),
        _ => (LiteralKind::Number, token.text),
    };
    Literal { kind, value, location: token.location }
}

/// Strips the quotes from a string token and resolves escape sequences: a
/// doubled quote, or a backslash escape. \% and \_ keep their backslash, as
/// they're only meaningful to LIKE patterns.
fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let quote = chars.next();
    chars.next_back();
    let mut value = String::with_capacity(text.len());
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('0') => value.push('\0'),
                Some('b') => value.push('\u{8}'),
                Some('Z') => value.push('\u{1a}'),
                Some(c @ ('%' | '_')) => value.extend(['\\', c]),
                Some(c) => value.push(c),
                None => value.push('\\'),
            },
            // The lexer only admits the quote character in doubled pairs.
            c if Some(c) == quote => {
                chars.next();
                value.push(c);
            }
            c => value.push(c),
        }
    }
    value
}
