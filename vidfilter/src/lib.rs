/*!
    Video transcoder that runs decoded frames through a chain of filters
    loaded from shared libraries.

    Each input file is handled by a [`transcode::TranscodeWorker`], which
    demuxes it, decodes and normalizes every video frame into a canonical
    planar [`ffmpeg_types::Frame`], applies the [`filter::FilterChain`],
    and encodes the result. Audio and subtitle streams are copied as they
    are. [`driver::run`] processes the inputs of a [`settings::Settings`]
    one after the other.
*/

pub mod cli;
pub mod driver;
mod error;
pub mod filter;
pub mod log;
pub mod media;
pub mod settings;
pub mod transcode;

pub use error::{Error, Result};
