/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    format::Pixel,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::{CodecConfig, rational_from_ffmpeg, rational_to_ffmpeg};
use ffmpeg_types::{Error, NativeFormat, Packet, Pts, Rational, Result};

/**
    A frame as produced by the decoder, in its native pixel layout.

    The timestamp is the decoder's best-effort presentation timestamp in
    the stream time base, which survives reordering and missing pts.
*/
pub struct DecodedFrame {
    frame: VideoFrameFFmpeg,
    pts: Option<Pts>,
    time_base: Rational,
}

impl DecodedFrame {
    /**
        Best-effort presentation timestamp, in [`DecodedFrame::time_base`].
    */
    pub fn pts(&self) -> Option<Pts> {
        self.pts
    }

    /**
        Time base of the timestamp.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /**
        Native pixel format the decoder produced.
    */
    pub fn format(&self) -> Pixel {
        self.frame.format()
    }

    /**
        Opaque tag of the native pixel format, recorded on normalized frames.
    */
    pub fn native_format(&self) -> NativeFormat {
        NativeFormat(ffi::AVPixelFormat::from(self.frame.format()) as i32)
    }

    /**
        Borrow the underlying native frame.
    */
    pub fn as_native(&self) -> &VideoFrameFFmpeg {
        &self.frame
    }
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("pts", &self.pts)
            .finish_non_exhaustive()
    }
}

/**
    Video decoder.

    Decodes video packets of one stream into native frames.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    time_base: Rational,
    frame_rate: Option<Rational>,
}

impl VideoDecoder {
    /**
        Create a new video decoder from codec configuration.

        # Arguments

        * `codec_config` - Codec configuration from the source
        * `time_base` - Time base of the stream's packets
        * `frame_rate` - Guessed frame rate of the stream, if known
    */
    pub fn new(
        codec_config: &CodecConfig,
        time_base: Rational,
        frame_rate: Option<Rational>,
    ) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::native("failed to initialize ffmpeg", e))?;

        let mut decoder_ctx =
            codec::context::Context::from_parameters(codec_config.parameters().clone())
                .map_err(|e| Error::native("failed to copy decoder parameters", e))?;

        unsafe {
            let ctx = decoder_ctx.as_mut_ptr();
            (*ctx).pkt_timebase = rational_to_ffmpeg(time_base).into();
            if let Some(rate) = frame_rate.filter(|r| r.is_positive()) {
                (*ctx).framerate = rational_to_ffmpeg(rate).into();
            }
        }

        let decoder = decoder_ctx.decoder().video().map_err(|e| {
            Error::native(
                &format!("failed to open decoder for {}", codec_config.codec_name()),
                e,
            )
        })?;

        Ok(Self {
            decoder,
            time_base,
            frame_rate,
        })
    }

    /**
        Get the time base for this decoder.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Frame rate the decoder was opened with, if known.
    */
    pub fn frame_rate(&self) -> Option<Rational> {
        self.frame_rate
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /**
        Pixel format of the decoded frames.
    */
    pub fn format(&self) -> Pixel {
        self.decoder.format()
    }

    /**
        Sample aspect ratio reported by the bitstream.
    */
    pub fn sample_aspect_ratio(&self) -> Rational {
        rational_from_ffmpeg(self.decoder.aspect_ratio())
    }

    /**
        Check whether the codec may hold frames back until end of stream.

        Only decoders with this capability need a flush.
    */
    pub fn may_buffer(&self) -> bool {
        self.decoder
            .codec()
            .is_some_and(|c| c.capabilities().contains(codec::Capabilities::DELAY))
    }

    /**
        Decode a packet, returning decoded frames.

        May return zero, one, or multiple frames depending on codec buffering.
        B-frames cause the decoder to buffer frames internally. Packets
        without data yield nothing; end of stream is [`VideoDecoder::flush`].
    */
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<DecodedFrame>> {
        // An empty native packet would signal end of stream
        if packet.data.is_empty() {
            return Ok(Vec::new());
        }

        let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(&packet.data);
        ffmpeg_pkt.set_pts(packet.pts.map(|p| p.0));
        ffmpeg_pkt.set_dts(packet.dts.map(|d| d.0));
        ffmpeg_pkt.set_duration(packet.duration.0);
        if packet.is_keyframe {
            ffmpeg_pkt.set_flags(codec::packet::Flags::KEY);
        }

        // EAGAIN means the decoder output is full: drain frames, then retry once
        match self.decoder.send_packet(&ffmpeg_pkt) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                let mut all_frames = self.receive_frames()?;
                self.decoder
                    .send_packet(&ffmpeg_pkt)
                    .map_err(|e| Error::native("failed to send packet to decoder", e))?;
                all_frames.extend(self.receive_frames()?);
                return Ok(all_frames);
            }
            Err(e) => return Err(Error::native("failed to send packet to decoder", e)),
        }

        self.receive_frames()
    }

    /**
        Flush the decoder to get any remaining buffered frames.

        Call this at end of stream to retrieve frames the decoder has buffered.
    */
    pub fn flush(&mut self) -> Result<Vec<DecodedFrame>> {
        let mut all_frames = self.receive_frames()?;

        match self.decoder.send_eof() {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                all_frames.extend(self.receive_frames()?);
                self.decoder
                    .send_eof()
                    .map_err(|e| Error::native("failed to flush decoder", e))?;
            }
            // Already at EOF
            Err(ffmpeg_next::Error::Eof) => {}
            Err(e) => return Err(Error::native("failed to flush decoder", e)),
        }

        all_frames.extend(self.receive_frames()?);
        Ok(all_frames)
    }

    /**
        Receive all available frames from the decoder.
    */
    fn receive_frames(&mut self) -> Result<Vec<DecodedFrame>> {
        let mut frames = Vec::new();

        loop {
            let mut decoded = VideoFrameFFmpeg::empty();
            match self.decoder.receive_frame(&mut decoded) {
                Ok(()) => {
                    let pts = decoded.timestamp().map(Pts);
                    frames.push(DecodedFrame {
                        frame: decoded,
                        pts,
                        time_base: self.time_base,
                    });
                }
                // Need more input
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => break,
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(Error::native("failed to receive frame from decoder", e)),
            }
        }

        Ok(frames)
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("time_base", &self.time_base)
            .field("frame_rate", &self.frame_rate)
            .finish_non_exhaustive()
    }
}
