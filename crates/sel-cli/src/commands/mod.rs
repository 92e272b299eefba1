//! `seltool` subcommands.
//!
//! Each `*_cmd` function is a thin wrapper that reports errors on stderr and
//! exits with status 1; the `run_*` functions underneath return `Result` and
//! are what the tests drive.

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod config_ops;
pub mod merge_ops;
pub mod model_ops;
pub mod select_ops;

#[cfg(test)]
mod tests;

use std::io;

use sel_core::oracle::OracleError;
use sel_core::selection::SelectionError;
use sel_core::settings::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown metric {0:?} (see `seltool metrics`)")]
    UnknownMetric(String),

    #[error("metric {0} compares two models: pass --low-lexicon and --hi-lexicon")]
    MissingModels(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
