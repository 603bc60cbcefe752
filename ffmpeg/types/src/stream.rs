/*!
    Stream information types.
*/

use crate::Rational;

/**
    The kind of media a demuxed stream carries.

    Only video streams are decoded. Every other known kind is copied to
    the output untouched; streams of unknown type are left out.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

impl StreamKind {
    /**
        Returns true for streams that are remuxed without decoding.
    */
    pub const fn is_passthrough(self) -> bool {
        matches!(
            self,
            Self::Audio | Self::Subtitle | Self::Data | Self::Attachment
        )
    }

    /**
        Lowercase name for log output.
    */
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
            Self::Attachment => "attachment",
            Self::Unknown => "unknown",
        }
    }
}

/**
    Information about one stream of an opened input.
*/
#[derive(Clone, Debug)]
pub struct StreamInfo {
    /// Index of the stream in the input container.
    pub index: usize,
    /// Media kind.
    pub kind: StreamKind,
    /// Time base of the stream's packet timestamps.
    pub time_base: Rational,
    /// Guessed frame rate, video streams only.
    pub frame_rate: Option<Rational>,
    /// Short codec name as reported by the native library.
    pub codec_name: String,
}
