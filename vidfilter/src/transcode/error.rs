use std::path::PathBuf;

use thiserror::Error;

use crate::filter::FilterError;

/**
    Why transcoding one input file failed.
*/
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("{} has no video stream", path.display())]
    NoVideoStream { path: PathBuf },

    #[error("{error}")]
    Media {
        stream: Option<usize>,
        error: ffmpeg_types::Error,
    },

    #[error("{error}")]
    Filter { stream: usize, error: FilterError },

    #[error("worker has already run")]
    AlreadyRun,

    #[error("transcode worker panicked")]
    WorkerPanicked,

    #[error("failed to start transcode worker: {0}")]
    Spawn(std::io::Error),
}

impl TranscodeError {
    /**
        Adapter for `map_err` that tags a media error with its stream.
    */
    pub fn media(stream: Option<usize>) -> impl FnOnce(ffmpeg_types::Error) -> Self {
        move |error| Self::Media { stream, error }
    }

    /**
        Input stream being processed when the error happened, if known.
    */
    pub fn stream_index(&self) -> Option<usize> {
        match self {
            Self::Media { stream, .. } => *stream,
            Self::Filter { stream, .. } => Some(*stream),
            _ => None,
        }
    }
}
