use std::path::PathBuf;

use thiserror::Error;

use crate::filter::FilterError;
use crate::settings::SettingsError;
use crate::transcode::TranscodeError;

/**
    Anything that stops a run.
*/
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Error occurred while processing file \"{}\"{}: {error}", path.display(), StreamSuffix(*stream))]
    Transcode {
        path: PathBuf,
        stream: Option<usize>,
        error: TranscodeError,
    },
}

struct StreamSuffix(Option<usize>);

impl std::fmt::Display for StreamSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(index) => write!(f, " (stream index {index})"),
            None => Ok(()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
