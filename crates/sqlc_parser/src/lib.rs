pub mod parser;

pub use parser::{compile, tokenize, Compiler};
pub use sqlc_common::{Error, Result};
