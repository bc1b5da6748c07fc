// Allow some clippy lints project-wide for code style consistency
#![allow(clippy::uninlined_format_args)]
#![allow(async_fn_in_trait)]

pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod safety;
pub mod scripting;
