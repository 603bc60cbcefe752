use std::path::PathBuf;

use thiserror::Error;
use vidfilter_sdk::OptionError;

use crate::settings::SpecError;

/**
    Errors from loading, configuring or running filters.
*/
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter library \"{}\" not found", path.display())]
    LibraryNotFound { path: PathBuf },

    #[error("failed to load filter library \"{}\": {error}", path.display())]
    LoadFailed {
        path: PathBuf,
        error: libloading::Error,
    },

    #[error("symbol \"vidfilter_export_filter\" not found in \"{}\": {error}", path.display())]
    MissingSymbol {
        path: PathBuf,
        error: libloading::Error,
    },

    #[error("\"{}\" exported no filter", path.display())]
    NoDescriptor { path: PathBuf },

    #[error("\"{}\" uses filter ABI version {found}, expected {expected}", path.display())]
    AbiMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("filter name not set in \"{}\"", path.display())]
    MissingName { path: PathBuf },

    #[error("filter \"{filter}\" has no apply function")]
    MissingApply { filter: String },

    #[error("filter \"{filter}\" is listed more than once")]
    Duplicate { filter: String },

    #[error("failed to initialize filter \"{filter}\": {message}")]
    InitFailed { filter: String, message: String },

    #[error("filter \"{filter}\" failed on frame {sequence}: {message}")]
    ApplyFailed {
        filter: String,
        sequence: u64,
        message: String,
    },

    #[error("invalid filter spec \"{spec}\": {error}")]
    InvalidSpec { spec: String, error: SpecError },

    #[error("invalid option for filter \"{filter}\": {error}")]
    InvalidOption { filter: String, error: OptionError },
}
