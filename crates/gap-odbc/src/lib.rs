//! Reads the GAP analytic database over ODBC.
//!
//! Each `load_*` call owns its ODBC environment and connection; both are
//! released before it returns.

pub mod connection;
pub mod decode;
pub mod error;
pub mod query;

use odbc_api::Environment;
use tracing::info;

use gap_core::records::{CellCountRecord, NvcGroupRecord};

pub use connection::{connect, ConnectionArgs, ConnectionString};
pub use error::{QueryError, Result};
pub use query::{fetch_table, Table, MANAGEMENT_QUERY, NVC_GROUP_QUERY};

fn run_query(conn_str: &ConnectionString, sql: &str) -> Result<Table> {
    let env = Environment::new()?;
    let conn = connect(&env, conn_str)?;
    let table = fetch_table(&conn, sql)?;
    Ok(table)
}

/// Rows of the management query.
pub fn load_cell_counts(conn_str: &ConnectionString) -> Result<Vec<CellCountRecord>> {
    let table = run_query(conn_str, MANAGEMENT_QUERY)?;
    let records = decode::cell_count_records(&table)?;
    info!(rows = records.len(), "loaded management cell counts");
    Ok(records)
}

/// Rows of the pivoted NVC group query.
pub fn load_group_counts(conn_str: &ConnectionString) -> Result<Vec<NvcGroupRecord>> {
    let table = run_query(conn_str, NVC_GROUP_QUERY)?;
    let records = decode::nvc_group_records(&table)?;
    info!(rows = records.len(), "loaded NVC group counts");
    Ok(records)
}
