/*!
    Opaque codec configuration for passing between crates.
*/

use ffmpeg_next::codec;

use ffmpeg_types::StreamKind;

use crate::convert::stream_kind_from_ffmpeg;

/**
    Opaque codec configuration of one stream.

    Extracted from a source stream to open a decoder or to copy a stream
    verbatim into a muxer, and produced by an opened encoder to describe
    the stream it writes.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    /**
        Wrap native codec parameters.

        The parameters are copied so the configuration no longer borrows
        from the demuxer or encoder that produced it and can move between
        threads.
    */
    pub fn from_parameters(parameters: codec::Parameters) -> Self {
        Self {
            parameters: parameters.clone(),
        }
    }

    /**
        Borrow the native parameters.
    */
    pub fn parameters(&self) -> &codec::Parameters {
        &self.parameters
    }

    /**
        Unwrap into the native parameters.
    */
    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }

    /**
        Media kind the parameters describe.
    */
    pub fn kind(&self) -> StreamKind {
        stream_kind_from_ffmpeg(self.parameters.medium())
    }

    /**
        Short codec name, e.g. `h264`.
    */
    pub fn codec_name(&self) -> &'static str {
        self.parameters.id().name()
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
        }
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec_id", &self.parameters.id())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
