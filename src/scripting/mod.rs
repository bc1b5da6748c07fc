//! DDL text generation from table metadata. Nothing in this module touches
//! a server; the output is script text for the caller to review and run.

pub mod procs;
pub mod sql_type;

pub use procs::{ProcedureKind, script_procedure};
pub use sql_type::render_sql_type;
