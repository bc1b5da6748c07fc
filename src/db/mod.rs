pub mod catalog;
pub mod client;
pub mod executor;
pub mod types;

pub use client::SqlClient;
