/*!
    Video encoder implementation.
*/

use ffmpeg_next::{
    Dictionary,
    codec::{self, encoder::video::Encoder as VideoEncoderFFmpeg},
    ffi,
    format::Pixel,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::{CodecConfig, rational_to_ffmpeg};
use ffmpeg_types::{Error, MediaDuration, Packet, Pts, Rational, Result, StreamKind};

use crate::config::{DEFAULT_ENCODER, VideoEncoderConfig};

/**
    Pick the pixel format to open an encoder with.

    Keeps `wanted` when the codec accepts it (or does not say what it
    accepts), otherwise takes the codec's first supported format.
*/
pub fn choose_pixel_format(supported: Option<&[Pixel]>, wanted: Pixel) -> Pixel {
    match supported {
        Some(formats) if !formats.is_empty() && !formats.contains(&wanted) => formats[0],
        _ => wanted,
    }
}

/**
    Video encoder.

    Encodes native video frames into compressed packets.
*/
pub struct VideoEncoder {
    encoder: VideoEncoderFFmpeg,
    name: String,
    time_base: Rational,
    fell_back: bool,
}

impl VideoEncoder {
    /**
        Create a new video encoder with the given configuration.

        An unnamed or unknown encoder falls back to [`DEFAULT_ENCODER`];
        [`VideoEncoder::fell_back`] reports when that happened.
    */
    pub fn new(config: &VideoEncoderConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::native("failed to initialize ffmpeg", e))?;

        let (codec, fell_back) = resolve_codec(config.codec_name.as_deref())?;

        let mut encoder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| Error::native("failed to allocate encoder context", e))?;

        let supported: Option<Vec<Pixel>> = codec
            .video()
            .ok()
            .and_then(|v| v.formats())
            .map(|formats| formats.collect());
        let pixel_format = choose_pixel_format(supported.as_deref(), config.pixel_format);

        let frame_rate = config.effective_frame_rate();
        let time_base = frame_rate
            .checked_invert()
            .ok_or_else(|| Error::invalid_data(format!("invalid frame rate {frame_rate}")))?;

        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(pixel_format);
        encoder.set_aspect_ratio(rational_to_ffmpeg(config.sample_aspect_ratio));
        encoder.set_frame_rate(Some(rational_to_ffmpeg(frame_rate)));
        encoder.set_time_base(rational_to_ffmpeg(time_base));
        if config.global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut opts = Dictionary::new();
        for (key, value) in &config.options {
            opts.set(key, value);
        }

        let name = codec.name().to_string();
        let encoder = encoder
            .open_with(opts)
            .map_err(|e| Error::native(&format!("failed to open encoder {name}"), e))?;

        Ok(Self {
            encoder,
            name,
            time_base,
            fell_back,
        })
    }

    /**
        Name of the opened encoder.
    */
    pub fn name(&self) -> &str {
        &self.name
    }

    /**
        True when the requested encoder was unknown and the default was
        opened instead.
    */
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }

    /**
        Get the time base for encoded packets.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Pixel format frames must be in.
    */
    pub fn format(&self) -> Pixel {
        self.encoder.format()
    }

    pub fn width(&self) -> u32 {
        self.encoder.width()
    }

    pub fn height(&self) -> u32 {
        self.encoder.height()
    }

    /**
        Codec parameters describing the encoded stream, for the muxer.
    */
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::from_parameters(codec::Parameters::from(&self.encoder))
    }

    /**
        Check whether the codec may hold packets back until end of stream.

        Only encoders with this capability need a flush.
    */
    pub fn may_buffer(&self) -> bool {
        self.encoder
            .codec()
            .is_some_and(|c| c.capabilities().contains(codec::Capabilities::DELAY))
    }

    /**
        Encode a video frame, returning encoded packets.

        The frame's pts must be in [`VideoEncoder::time_base`]. May return
        zero, one, or multiple packets depending on encoder buffering.
    */
    pub fn encode(&mut self, frame: &VideoFrameFFmpeg) -> Result<Vec<Packet>> {
        if frame.width() != self.encoder.width() || frame.height() != self.encoder.height() {
            return Err(Error::invalid_data(format!(
                "frame dimensions {}x{} don't match encoder {}x{}",
                frame.width(),
                frame.height(),
                self.encoder.width(),
                self.encoder.height()
            )));
        }
        if frame.format() != self.encoder.format() {
            return Err(Error::invalid_data(format!(
                "frame format {:?} doesn't match encoder format {:?}",
                frame.format(),
                self.encoder.format()
            )));
        }

        // EAGAIN means the encoder output is full: drain packets, then retry once
        match self.encoder.send_frame(frame) {
            Ok(()) => self.receive_packets(),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                let mut packets = self.receive_packets()?;
                self.encoder
                    .send_frame(frame)
                    .map_err(|e| Error::native("failed to send frame to encoder", e))?;
                packets.extend(self.receive_packets()?);
                Ok(packets)
            }
            Err(e) => Err(Error::native("failed to send frame to encoder", e)),
        }
    }

    /**
        Flush the encoder to get any remaining buffered packets.

        Call this at end of stream.
    */
    pub fn flush(&mut self) -> Result<Vec<Packet>> {
        match self.encoder.send_eof() {
            // Already at EOF
            Ok(()) | Err(ffmpeg_next::Error::Eof) => {}
            Err(e) => return Err(Error::native("failed to flush encoder", e)),
        }

        self.receive_packets()
    }

    /**
        Receive all available packets from the encoder.
    */
    fn receive_packets(&mut self) -> Result<Vec<Packet>> {
        let mut packets = Vec::new();
        let mut encoded_pkt = ffmpeg_next::Packet::empty();

        loop {
            match self.encoder.receive_packet(&mut encoded_pkt) {
                Ok(()) => packets.push(self.convert_packet(&encoded_pkt)),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => break,
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(Error::native("failed to receive packet from encoder", e)),
            }
        }

        Ok(packets)
    }

    /**
        Convert an FFmpeg packet to our Packet type.

        Frames last one tick of the encoder time base, which is one frame.
    */
    fn convert_packet(&self, pkt: &ffmpeg_next::Packet) -> Packet {
        let duration = match pkt.duration() {
            0 => 1,
            d => d,
        };

        Packet::new(
            pkt.data().map(|d| d.to_vec()).unwrap_or_default(),
            pkt.pts().map(Pts),
            pkt.dts().map(Pts),
            MediaDuration(duration),
            self.time_base,
            pkt.is_key(),
            0,
            StreamKind::Video,
        )
    }
}

/**
    Find the encoder to open and whether the default had to stand in.
*/
fn resolve_codec(name: Option<&str>) -> Result<(codec::Codec, bool)> {
    if let Some(codec) = name.and_then(ffmpeg_next::encoder::find_by_name) {
        return Ok((codec, false));
    }

    let codec = ffmpeg_next::encoder::find_by_name(DEFAULT_ENCODER).ok_or_else(|| {
        Error::unsupported_format(format!(
            "encoder {} not found",
            name.unwrap_or(DEFAULT_ENCODER)
        ))
    })?;

    Ok((codec, name.is_some()))
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("name", &self.name)
            .field("width", &self.encoder.width())
            .field("height", &self.encoder.height())
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mpeg4_config() -> Option<VideoEncoderConfig> {
        ffmpeg_next::init().unwrap();
        ffmpeg_next::encoder::find_by_name("mpeg4")?;
        Some(
            VideoEncoderConfig::new(64, 48, Pixel::YUV420P, Rational::new(25, 1))
                .with_codec_name("mpeg4"),
        )
    }

    fn grey_frame(pts: i64) -> VideoFrameFFmpeg {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV420P, 64, 48);
        for plane in 0..3 {
            frame.data_mut(plane).fill(128);
        }
        frame.set_pts(Some(pts));
        frame
    }

    #[test]
    fn keeps_supported_format() {
        let supported = [Pixel::YUV420P, Pixel::YUV444P];
        assert_eq!(choose_pixel_format(Some(&supported), Pixel::YUV444P), Pixel::YUV444P);
        assert_eq!(choose_pixel_format(None, Pixel::NV12), Pixel::NV12);
        assert_eq!(choose_pixel_format(Some(&[]), Pixel::NV12), Pixel::NV12);
    }

    #[test]
    fn substitutes_unsupported_format() {
        let supported = [Pixel::YUV420P, Pixel::YUV444P];
        assert_eq!(choose_pixel_format(Some(&supported), Pixel::RGB24), Pixel::YUV420P);
    }

    #[test]
    fn encodes_and_flushes() {
        let Some(config) = mpeg4_config() else {
            eprintln!("mpeg4 encoder unavailable, skipping");
            return;
        };
        let mut encoder = VideoEncoder::new(&config).unwrap();
        assert_eq!(encoder.name(), "mpeg4");
        assert!(!encoder.fell_back());
        assert_eq!(encoder.time_base(), Rational::new(1, 25));
        assert_eq!(encoder.format(), Pixel::YUV420P);

        let mut packets = Vec::new();
        for pts in 0..6 {
            packets.extend(encoder.encode(&grey_frame(pts)).unwrap());
        }
        packets.extend(encoder.flush().unwrap());

        assert_eq!(packets.len(), 6);
        assert!(packets[0].is_keyframe);
        assert!(packets.iter().all(|p| p.duration == MediaDuration(1)));
        let pts: Vec<_> = packets.iter().map(|p| p.pts.unwrap().0).collect();
        assert_eq!(pts, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(encoder.codec_config().codec_name(), "mpeg4");
    }

    #[test]
    fn rejects_mismatched_frames() {
        let Some(config) = mpeg4_config() else {
            eprintln!("mpeg4 encoder unavailable, skipping");
            return;
        };
        let mut encoder = VideoEncoder::new(&config).unwrap();

        let small = VideoFrameFFmpeg::new(Pixel::YUV420P, 32, 32);
        assert!(matches!(encoder.encode(&small), Err(Error::InvalidData { .. })));

        let nv12 = VideoFrameFFmpeg::new(Pixel::NV12, 64, 48);
        assert!(matches!(encoder.encode(&nv12), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn unknown_encoder_falls_back_to_default() {
        ffmpeg_next::init().unwrap();
        match resolve_codec(Some("no-such-encoder")) {
            Ok((codec, fell_back)) => {
                assert_eq!(codec.name(), DEFAULT_ENCODER);
                assert!(fell_back);
            }
            Err(err) => {
                assert!(ffmpeg_next::encoder::find_by_name(DEFAULT_ENCODER).is_none());
                assert!(err.to_string().contains("no-such-encoder"));
            }
        }
    }
}
