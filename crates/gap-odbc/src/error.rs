use thiserror::Error;

use gap_core::GapError;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    /// Connecting failed, including the driver downgrade retry.
    #[error("Failed to connect with {connection}: {source}")]
    Connection {
        /// Connection string with the password redacted.
        connection: String,
        #[source]
        source: odbc_api::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] odbc_api::Error),

    #[error("Result set has no column {0:?}")]
    MissingColumn(String),

    #[error("Row {row}, column {column:?}: {message}")]
    Decode {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error(transparent)]
    Core(#[from] GapError),
}
