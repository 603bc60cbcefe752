use ffmpeg_next::format::Pixel;
use tracing::{debug, warn};

use ffmpeg_decode::VideoDecoder;
use ffmpeg_encode::{VideoEncoder, VideoEncoderConfig};
use ffmpeg_source::CodecConfig;
use ffmpeg_transform::{Normalizer, Projector, planar_equivalent};
use ffmpeg_types::{Pts, Rational, Result, StreamInfo};

use crate::settings::NamedOptions;

/**
    Keeps encoder timestamps strictly increasing.

    Timestamps are in the encoder time base. A frame whose timestamp is
    not after the last admitted one is a duplicate; a frame without one
    is placed right after the last.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampGate {
    last: Option<i64>,
}

impl TimestampGate {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        The timestamp to encode `pts` with, or `None` to drop the frame.
    */
    pub fn admit(&mut self, pts: Option<i64>) -> Option<i64> {
        let pts = match (pts, self.last) {
            (Some(pts), _) => pts,
            (None, Some(last)) => last + 1,
            (None, None) => 0,
        };
        if self.last.is_some_and(|last| pts <= last) {
            return None;
        }
        self.last = Some(pts);
        Some(pts)
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }
}

/**
    Decode and encode state of one video stream.
*/
pub struct CodingContext {
    pub decoder: VideoDecoder,
    pub encoder: VideoEncoder,
    pub normalizer: Normalizer,
    pub projector: Projector,
    gate: TimestampGate,
    next_sequence: u64,
}

impl CodingContext {
    /**
        Open the decoder for `info`, then an encoder matching it.

        The encoder gets the decoder's dimensions and sample aspect ratio,
        the stream's frame rate, and the planar layout the decoded frames
        are normalized into, so unfiltered frames reach it without a
        conversion whenever the codec accepts that layout.
    */
    pub fn open(
        info: &StreamInfo,
        config: &CodecConfig,
        encoder: Option<&NamedOptions>,
        global_header: bool,
    ) -> Result<Self> {
        let decoder = VideoDecoder::new(config, info.time_base, info.frame_rate)?;

        let pixel_format = match decoder.format() {
            Pixel::None => Pixel::YUV420P,
            native => planar_equivalent(native).map_or(native, |eq| eq.pixel),
        };
        let frame_rate = info.frame_rate.unwrap_or(Rational::new(25, 1));

        let mut encoder_config =
            VideoEncoderConfig::new(decoder.width(), decoder.height(), pixel_format, frame_rate)
                .with_sample_aspect_ratio(decoder.sample_aspect_ratio())
                .with_global_header(global_header);
        if let Some(spec) = encoder {
            encoder_config = encoder_config
                .with_codec_name(spec.name.clone())
                .with_options(spec.options.clone());
        }

        let video_encoder = VideoEncoder::new(&encoder_config)?;
        if video_encoder.fell_back() {
            warn!(
                stream = info.index,
                requested = encoder.map(|e| e.name.as_str()),
                using = video_encoder.name(),
                "encoder not found, using default"
            );
        }
        if video_encoder.format() != pixel_format {
            debug!(
                stream = info.index,
                "encoder takes {:?}, frames will be converted from {:?}",
                video_encoder.format(),
                pixel_format
            );
        }

        debug!(
            stream = info.index,
            decoder = config.codec_name(),
            encoder = video_encoder.name(),
            width = decoder.width(),
            height = decoder.height(),
            %frame_rate,
            "opened video stream"
        );

        Ok(Self {
            decoder,
            encoder: video_encoder,
            normalizer: Normalizer::new(),
            projector: Projector::new(),
            gate: TimestampGate::new(),
            next_sequence: 0,
        })
    }

    /**
        Timestamp for a decoded frame, rescaled to the encoder time base,
        or `None` if the frame duplicates an earlier one.
    */
    pub fn admit(&mut self, pts: Option<Pts>, time_base: Rational) -> Option<Pts> {
        let encoder_time_base = self.encoder.time_base();
        let pts = pts.map(|p| p.rescale(time_base, encoder_time_base).0);
        self.gate.admit(pts).map(Pts)
    }

    /**
        Frame number to hand to filters for the next admitted frame.
    */
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }
}

impl std::fmt::Debug for CodingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodingContext")
            .field("decoder", &self.decoder)
            .field("encoder", &self.encoder)
            .field("last_pts", &self.gate.last())
            .finish_non_exhaustive()
    }
}
