use serde::ser::{SerializeStruct as _, Serializer};
use serde::Serialize;
use sqlc_common::Location;

/// The statement is the root node of the syntax tree, and describes the
/// syntactic structure of a single SQL statement. It is built from a raw SQL
/// string by a dialect's grammar and handed to the caller as-is: the parser
/// only checks that the syntax is well-formed, not that tables or columns
/// exist.
///
/// The tree serializes (e.g. to JSON) as nested maps keyed by a "type" field.
/// Identifiers and literals serialize as plain text, but keep their source
/// location in the Rust types for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// Select matching rows.
    #[serde(rename = "SELECT")]
    Select(Select),
    /// Insert a row into a table.
    #[serde(rename = "INSERT")]
    Insert(Insert),
    /// Update rows in a table.
    #[serde(rename = "UPDATE")]
    Update(Update),
    /// Delete matching rows.
    #[serde(rename = "DELETE")]
    Delete(Delete),
    /// A schema change.
    #[serde(rename = "DDL")]
    Ddl(Ddl),
    /// A database-level administrative operation.
    #[serde(rename = "DATABASE_OPERATION")]
    Admin(Admin),
}

impl Statement {
    /// The statement's category name, as used in the "type" field.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::Ddl(_) => "DDL",
            Statement::Admin(_) => "DATABASE_OPERATION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Select {
    pub columns: Vec<SelectColumn>,
    pub table: TableRef,
    pub joins: Vec<Join>,
    #[serde(rename = "where")]
    pub r#where: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<SelectColumn>,
    pub values: Vec<Literal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub table: TableRef,
    pub updates: Vec<Assignment>,
    #[serde(rename = "where")]
    pub r#where: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delete {
    pub table: TableRef,
    #[serde(rename = "where")]
    pub r#where: Option<Condition>,
}

/// Schema changes. Serialized as { action, table, columns } or
/// { action, database }.
#[derive(Debug, Clone, PartialEq)]
pub enum Ddl {
    CreateTable { table: TableRef, columns: Vec<ColumnDef> },
    DropTable { table: TableRef },
    CreateDatabase { database: Ident },
    DropDatabase { database: Ident },
}

impl Ddl {
    /// The DDL action keyword.
    pub fn action(&self) -> &'static str {
        match self {
            Ddl::CreateTable { .. } | Ddl::CreateDatabase { .. } => "CREATE",
            Ddl::DropTable { .. } | Ddl::DropDatabase { .. } => "DROP",
        }
    }
}

impl Serialize for Ddl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = match self {
            Ddl::CreateTable { .. } => 3,
            _ => 2,
        };
        let mut state = serializer.serialize_struct("Ddl", len)?;
        state.serialize_field("action", self.action())?;
        match self {
            Ddl::CreateTable { table, columns } => {
                state.serialize_field("table", table)?;
                state.serialize_field("columns", columns)?;
            }
            Ddl::DropTable { table } => state.serialize_field("table", table)?,
            Ddl::CreateDatabase { database } | Ddl::DropDatabase { database } => {
                state.serialize_field("database", database)?
            }
        }
        state.end()
    }
}

/// Database-level operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "UPPERCASE")]
pub enum Admin {
    /// Switch the current database.
    Use { database: Ident },
    /// List objects of the given kind, e.g. SHOW TABLES.
    Show {
        #[serde(rename = "showType")]
        target: Ident,
    },
}

/// A CREATE TABLE column definition. The type is taken verbatim, e.g. INT or
/// VARCHAR with a length of 255.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: Ident,
    #[serde(rename = "type")]
    pub datatype: Ident,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub length: Vec<Literal>,
}

/// A table reference, with an optional alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRef {
    pub name: Ident,
    pub alias: Option<Ident>,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Join {
    #[serde(rename = "type")]
    pub r#type: JoinType,
    pub table: TableRef,
    pub condition: Condition,
}

/// JOIN types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinType {
    #[serde(rename = "JOIN")]
    Join,
    #[serde(rename = "INNER JOIN")]
    Inner,
    #[serde(rename = "LEFT JOIN")]
    Left,
    #[serde(rename = "RIGHT JOIN")]
    Right,
    #[serde(rename = "CROSS JOIN")]
    Cross,
}

/// A single comparison, as used in WHERE and ON clauses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub left: Ident,
    pub operator: Operator,
    pub right: Operand,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Equal, // a = b
    #[serde(rename = "!=")]
    NotEqual, // a != b
    #[serde(rename = "<>")]
    LessOrGreaterThan, // a <> b
    #[serde(rename = "<")]
    LessThan, // a < b
    #[serde(rename = "<=")]
    LessThanOrEqual, // a <= b
    #[serde(rename = ">")]
    GreaterThan, // a > b
    #[serde(rename = ">=")]
    GreaterThanOrEqual, // a >= b
    #[serde(rename = "<=>")]
    NullSafeEqual, // a <=> b
}

impl Operator {
    /// All operators, in their textual form.
    pub const ALL: [&'static str; 8] = ["=", "!=", "<>", "<", "<=", ">", ">=", "<=>"];
}

impl TryFrom<&str> for Operator {
    // Use a cheap static string, since this just indicates it's not an operator.
    type Error = &'static str;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            "=" => Self::Equal,
            "!=" => Self::NotEqual,
            "<>" => Self::LessOrGreaterThan,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            "<=>" => Self::NullSafeEqual,
            _ => return Err("not a comparison operator"),
        })
    }
}

/// The right-hand side of a condition: a column or a literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Column(Ident),
    Literal(Literal),
}

/// A column assignment in UPDATE ... SET.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub column: Ident,
    pub value: Literal,
}

/// An entry in a column list: a column, function call, or *, with an optional
/// alias. Serializes as the plain column text, or as { column, alias } when
/// aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Projection,
    pub alias: Option<Ident>,
}

impl SelectColumn {
    /// The column text as written (without the alias).
    pub fn text(&self) -> &str {
        match &self.expr {
            Projection::Column(ident) => &ident.value,
            Projection::Function(function) => &function.text,
            Projection::All(_) => "*",
        }
    }
}

impl Serialize for SelectColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.alias {
            None => serializer.serialize_str(self.text()),
            Some(alias) => {
                let mut state = serializer.serialize_struct("SelectColumn", 2)?;
                state.serialize_field("column", self.text())?;
                state.serialize_field("alias", alias)?;
                state.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// A column reference, possibly qualified (t.a or t.*).
    Column(Ident),
    /// A function call, kept as an opaque span.
    Function(FunctionCall),
    /// All columns, i.e. *.
    All(Location),
}

/// A function call. The arguments are not parsed: text holds the call as
/// written, e.g. count(e).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// The upper-cased function name, e.g. COUNT.
    pub name: String,
    pub text: String,
    pub location: Location,
}

/// An identifier. Quoting backticks are stripped from value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub value: String,
    pub location: Location,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// A literal value. Numbers and date-times keep their text as written; strings
/// have their quotes stripped and escape sequences resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Number,
    Datetime,
    Null,
    Boolean,
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlc_common::Position;

    fn ident(value: &str) -> Ident {
        Ident { value: value.to_string(), location: Location::of(Position::START, value) }
    }

    #[test]
    fn ddl_serializes_with_action() {
        let ddl = Statement::Ddl(Ddl::CreateTable {
            table: TableRef { name: ident("t"), alias: None },
            columns: vec![ColumnDef { name: ident("id"), datatype: ident("INT"), length: vec![] }],
        });
        assert_eq!(
            serde_json::to_value(&ddl).unwrap(),
            json!({
                "type": "DDL",
                "action": "CREATE",
                "table": { "name": "t", "alias": null },
                "columns": [{ "name": "id", "type": "INT" }],
            })
        );
        let drop = Statement::Ddl(Ddl::DropDatabase { database: ident("shop") });
        assert_eq!(serde_json::to_value(&drop).unwrap(), json!({ "type": "DDL", "action": "DROP", "database": "shop" }));
    }

    #[test]
    fn admin_serializes_with_operation() {
        let show = Statement::Admin(Admin::Show { target: ident("TABLES") });
        assert_eq!(
            serde_json::to_value(&show).unwrap(),
            json!({ "type": "DATABASE_OPERATION", "operation": "SHOW", "showType": "TABLES" })
        );
        let use_db = Statement::Admin(Admin::Use { database: ident("shop") });
        assert_eq!(
            serde_json::to_value(&use_db).unwrap(),
            json!({ "type": "DATABASE_OPERATION", "operation": "USE", "database": "shop" })
        );
    }

    #[test]
    fn aliased_columns_serialize_as_maps() {
        let plain = SelectColumn { expr: Projection::Column(ident("a")), alias: None };
        let aliased = SelectColumn { expr: Projection::Column(ident("c")), alias: Some(ident("d")) };
        assert_eq!(serde_json::to_value(&plain).unwrap(), json!("a"));
        assert_eq!(serde_json::to_value(&aliased).unwrap(), json!({ "column": "c", "alias": "d" }));
    }

    #[test]
    fn join_types_serialize_as_phrases() {
        assert_eq!(serde_json::to_value(JoinType::Right).unwrap(), json!("RIGHT JOIN"));
        assert_eq!(serde_json::to_value(JoinType::Join).unwrap(), json!("JOIN"));
    }

    #[test]
    fn operators_parse_from_text() {
        for text in Operator::ALL {
            let operator = Operator::try_from(text).unwrap();
            assert_eq!(serde_json::to_value(operator).unwrap(), json!(text));
        }
        assert!(Operator::try_from("=!").is_err());
    }
}
