use camino::Utf8PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MergeError {
    #[error("i/o error on {path}: {message}")]
    Io { path: Utf8PathBuf, message: String },

    #[error("{path}:{line}: expected at most {expected} fields, found {found}")]
    MalformedRow {
        path: Utf8PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{table} table is missing required column `{column}`")]
    #[diagnostic(help("check the header line of the input file"))]
    MissingColumn { table: String, column: String },

    #[error("column `{0}` is produced by more than one annotation source")]
    ColumnCollision(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("missing required argument {0} (pass it on the command line or in the config file)")]
    MissingArgument(String),
}

impl MergeError {
    pub fn io(path: impl Into<Utf8PathBuf>, err: impl std::fmt::Display) -> Self {
        MergeError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn missing_column(table: &str, column: &str) -> Self {
        MergeError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
