//! Compiles raw SQL strings into a structured Abstract Syntax Tree.
//!
//! The pipeline is lexer -> dialect grammar -> syntax tree. The lexer is
//! driven by the dialect's token rules, and tokens are pulled on demand by the
//! grammar through a cursor.

pub mod ast;
mod compiler;
pub mod dialect;
mod lexer;
pub mod token;

pub use compiler::{compile, tokenize, Compiler};
pub use dialect::{Cursor, Dialect, DialectName, MySql};
pub use lexer::Lexer;
pub use token::{Rule, Token, TokenKind};
