//! sqlc compiles a single SQL statement into its syntax tree, and prints it
//! as JSON on stdout.

mod settings;

use std::io::{IsTerminal as _, Read as _};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use serde::Serialize;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use sqlc_common::{errconfig, errio, Error, Result};
use sqlc_parser::parser::DialectName;

use settings::Settings;

#[derive(Parser)]
#[command(name = "sqlc")]
#[command(about = "Compiles a SQL statement into a JSON syntax tree", version)]
struct Command {
    /// The SQL statement. Read from stdin if omitted.
    sql: Option<String>,
    /// The SQL dialect.
    #[arg(short, long)]
    dialect: Option<String>,
    /// Settings file. Defaults to sqlc.toml, if present.
    #[arg(short, long)]
    config: Option<String>,
    /// Pretty-print the JSON output.
    #[arg(short, long)]
    pretty: bool,
    /// Print the token stream instead of the syntax tree.
    #[arg(short, long)]
    tokens: bool,
}

fn main() -> ExitCode {
    match Command::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            match err {
                Error::UnknownDialect(_) | Error::InvalidConfig(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

impl Command {
    fn run(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;
        let Ok(level) = settings.log_level.parse::<LevelFilter>() else {
            return errconfig!("invalid log level {:?}", settings.log_level);
        };
        TermLogger::init(level, simplelog::Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

        let dialect = self.dialect.unwrap_or(settings.dialect);
        let pretty = self.pretty || settings.pretty;
        let sql = match self.sql {
            Some(sql) => sql,
            None => read_stdin()?,
        };

        let output = match self.tokens {
            true => to_json(&sqlc_parser::tokenize(&sql, &dialect)?, pretty)?,
            false => to_json(&sqlc_parser::compile(&sql, &dialect)?, pretty)?,
        };
        println!("{output}");
        Ok(())
    }
}

/// Reads the SQL statement from stdin, unless it is an interactive terminal.
fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return errio!("no SQL statement given, and stdin is a terminal");
    }
    let mut sql = String::new();
    stdin.read_to_string(&mut sql)?;
    Ok(sql)
}

/// Formats an error for stderr. An unknown dialect lists the registered ones.
fn error_message(err: &Error) -> String {
    match err {
        Error::UnknownDialect(_) => format!("Error: {err} (available: {})", DialectName::list()),
        _ => format!("Error: {err}"),
    }
}

fn to_json(value: &impl Serialize, pretty: bool) -> Result<String> {
    Ok(match pretty {
        true => serde_json::to_string_pretty(value)?,
        false => serde_json::to_string(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dialect_lists_available_dialects() {
        assert_eq!(
            error_message(&Error::UnknownDialect("postgres".into())),
            r#"Error: unknown dialect "postgres" (available: mysql)"#
        );
        assert_eq!(error_message(&Error::IO("closed".into())), "Error: io error: closed");
    }
}
