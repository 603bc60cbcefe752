/*!
    Conversion utilities between ffmpeg-next types and ffmpeg-types.
*/

use ffmpeg_next::media::Type;

use ffmpeg_types::{Rational, StreamKind};

/**
    Convert ffmpeg_next::Rational to our Rational.

    Native code reports unknown rates as `0/0`; those become `0/1`.
*/
pub fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    if r.denominator() == 0 {
        return Rational::new(0, 1);
    }
    Rational::new(r.numerator(), r.denominator())
}

/**
    Convert our Rational to ffmpeg_next::Rational.
*/
pub fn rational_to_ffmpeg(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}

/**
    Convert a native media type to our StreamKind.
*/
pub fn stream_kind_from_ffmpeg(medium: Type) -> StreamKind {
    match medium {
        Type::Video => StreamKind::Video,
        Type::Audio => StreamKind::Audio,
        Type::Subtitle => StreamKind::Subtitle,
        Type::Data => StreamKind::Data,
        Type::Attachment => StreamKind::Attachment,
        Type::Unknown => StreamKind::Unknown,
    }
}
