//! Library side of the `temporal-score` command line tool.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
pub mod prompt;
