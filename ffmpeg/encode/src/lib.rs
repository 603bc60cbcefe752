/*!
    Video encoding for the vidfilter media crates.

    This crate transforms native frames into compressed packets. It's the
    inverse of decode: an encoder is opened from settings derived from the
    matching decoder (dimensions, pixel format, sample aspect ratio, frame
    rate) plus the user's encoder name and private options.

    # Example

    ```ignore
    use ffmpeg_encode::{VideoEncoder, VideoEncoderConfig};
    use ffmpeg_next::format::Pixel;
    use ffmpeg_types::Rational;

    let config = VideoEncoderConfig::new(1920, 1080, Pixel::YUV420P, Rational::new(30, 1))
        .with_codec_name("libx264")
        .with_options(vec![("crf".into(), "23".into())]);

    let mut encoder = VideoEncoder::new(&config)?;

    for frame in frames {
        for packet in encoder.encode(&frame)? {
            // Write to muxer
        }
    }

    // Flush remaining packets
    let final_packets = encoder.flush()?;
    ```

    # Frame Requirements

    Frames must match the encoder's dimensions and pixel format
    ([`VideoEncoder::format`]). The encoder may pick a different pixel
    format than requested when the codec cannot take the requested one;
    use `ffmpeg-transform` to project frames into it.
*/

mod config;
mod video;

pub use config::{DEFAULT_ENCODER, VideoEncoderConfig};
pub use video::{VideoEncoder, choose_pixel_format};
