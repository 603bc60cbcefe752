/*!
    Media source and demuxing for the vidfilter media crates.

    Opens a container, describes every stream in it, and yields its
    packets in file order. Codec parameters stay opaque behind
    [`CodecConfig`] so they can be handed to a decoder or copied to a
    muxer without exposing the native types in signatures.
*/

mod codec_config;
mod convert;
mod source;

pub use codec_config::CodecConfig;
pub use convert::{rational_from_ffmpeg, rational_to_ffmpeg, stream_kind_from_ffmpeg};
pub use source::Source;
