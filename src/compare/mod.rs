//! Table data reconciliation: given two tables (possibly on different
//! servers), decide whether they hold the same rows and, when they do not,
//! which rows were added, deleted or updated. Row content is never shipped
//! in full unless details are requested; each row travels as a composite
//! key string plus an integer fingerprint computed server-side.

pub mod diff;
pub mod engine;
pub mod fetch;
pub mod projection;
mod types;

use anyhow::Result;

use crate::db::types::ResultSet;

pub use engine::{compare_data, compare_data_light, table_checksum};
pub use types::{
    ChecksumRole, Column, DataComparison, FingerprintSet, RowFingerprint, Table, TableRef,
    TypeClass, quote_ident,
};

/// Runs a generated statement and returns its tabular results. The engine
/// only ever submits read-only SELECT text through this seam.
pub trait QueryExecutor {
    async fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>>;
}

/// Supplies column metadata for a table. The answer must stay stable for
/// the duration of one comparison call.
pub trait SchemaCatalog {
    async fn table(&mut self, table: &TableRef) -> Result<Table>;
}
