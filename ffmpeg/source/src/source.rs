/*!
    Media source implementation.
*/

use std::path::Path;

use ffmpeg_next::{ffi, format::context::Input as InputContext, media::Type};

use ffmpeg_types::{Error, MediaDuration, Packet, Pts, Rational, Result, StreamInfo, StreamKind};

use crate::codec_config::CodecConfig;
use crate::convert::{rational_from_ffmpeg, stream_kind_from_ffmpeg};

/**
    A media source that produces encoded packets.

    Unlike a playback source, every stream is exposed: the transcoder
    decides per stream whether to decode, copy or skip it.
*/
pub struct Source {
    /// The FFmpeg input context.
    input: InputContext,
    /// Per-stream information, indexed by stream index.
    streams: Vec<StreamInfo>,
    /// Per-stream codec parameters, indexed by stream index.
    codec_configs: Vec<CodecConfig>,
}

impl Source {
    /**
        Open a media file and read its stream information.

        # Example

        ```ignore
        let source = Source::open("video.mkv")?;
        for stream in source.streams() {
            println!("#{} {:?} {}", stream.index, stream.kind, stream.codec_name);
        }
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::native("failed to initialize ffmpeg", e))?;

        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input file {} does not exist", path.display()),
            )));
        }

        // format::input also runs stream info discovery
        let input = ffmpeg_next::format::input(&path)
            .map_err(|e| Error::native(&format!("cannot open input {}", path.display()), e))?;

        let mut streams = Vec::with_capacity(input.nb_streams() as usize);
        let mut codec_configs = Vec::with_capacity(input.nb_streams() as usize);

        for stream in input.streams() {
            let parameters = stream.parameters();
            let kind = stream_kind_from_ffmpeg(parameters.medium());
            let frame_rate = match parameters.medium() {
                Type::Video => Some(guess_frame_rate(&input, &stream)),
                _ => None,
            };

            streams.push(StreamInfo {
                index: stream.index(),
                kind,
                time_base: rational_from_ffmpeg(stream.time_base()),
                frame_rate,
                codec_name: parameters.id().name().to_string(),
            });
            codec_configs.push(CodecConfig::from_parameters(parameters));
        }

        Ok(Self {
            input,
            streams,
            codec_configs,
        })
    }

    /**
        Information about every stream, indexed by stream index.
    */
    pub fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    /**
        Information about one stream.
    */
    pub fn stream(&self, index: usize) -> Option<&StreamInfo> {
        self.streams.get(index)
    }

    /**
        Codec parameters of one stream.

        Pass these to `ffmpeg-decode` to open a decoder, or to
        `ffmpeg-sink` to copy the stream.
    */
    pub fn codec_config(&self, index: usize) -> Option<&CodecConfig> {
        self.codec_configs.get(index)
    }

    /**
        Check if this source has at least one video stream.
    */
    pub fn has_video(&self) -> bool {
        self.streams.iter().any(|s| s.kind == StreamKind::Video)
    }

    /**
        Short name of the container format, e.g. `matroska,webm`.
    */
    pub fn format_name(&self) -> &str {
        self.input.format().name()
    }

    /**
        Read the next packet from the source.

        Returns `Ok(Some(packet))` for each packet, `Ok(None)` at end of stream.
        Packets of all streams are returned interleaved, in file order.
    */
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        let Some((stream, ffmpeg_packet)) = self.input.packets().next() else {
            return Ok(None);
        };

        let stream_index = stream.index();
        let info = self.streams.get(stream_index).ok_or_else(|| {
            Error::invalid_data(format!("packet for unknown stream {stream_index}"))
        })?;

        Ok(Some(Packet::new(
            ffmpeg_packet.data().map(|d| d.to_vec()).unwrap_or_default(),
            ffmpeg_packet.pts().map(Pts),
            ffmpeg_packet.dts().map(Pts),
            MediaDuration(ffmpeg_packet.duration()),
            info.time_base,
            ffmpeg_packet.is_key(),
            stream_index,
            info.kind,
        )))
    }
}

/**
    Guess the frame rate of a video stream from container and codec hints.

    Falls back to the average frame rate and finally to 25 fps, since an
    encoder cannot be opened without a time base.
*/
fn guess_frame_rate(input: &InputContext, stream: &ffmpeg_next::Stream) -> Rational {
    let guessed = unsafe {
        ffi::av_guess_frame_rate(
            input.as_ptr() as *mut ffi::AVFormatContext,
            stream.as_ptr() as *mut ffi::AVStream,
            std::ptr::null_mut(),
        )
    };
    let guessed = rational_from_ffmpeg(ffmpeg_next::Rational::new(guessed.num, guessed.den));
    if guessed.is_positive() {
        return guessed;
    }

    let average = rational_from_ffmpeg(stream.avg_frame_rate());
    if average.is_positive() {
        return average;
    }

    Rational::new(25, 1)
}

/**
    Iterator adapter for Source that yields packets.
*/
impl Iterator for Source {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("format", &self.format_name())
            .field("streams", &self.streams)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_io_not_found() {
        let err = Source::open("/definitely/not/here.mkv").unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected I/O error, got {other}"),
        }
    }

    #[test]
    fn garbage_file_is_codec_error() {
        let dir = std::env::temp_dir().join(format!("ffmpeg-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.bin");
        std::fs::write(&path, b"this is not a media file").unwrap();

        let err = Source::open(&path).unwrap_err();
        assert!(matches!(err, Error::Codec { .. }), "{err}");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
