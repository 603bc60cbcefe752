/*!
    Encoder configuration types.
*/

use ffmpeg_next::format::Pixel;

use ffmpeg_types::Rational;

/// Encoder used when none is named, or the named one is not available.
pub const DEFAULT_ENCODER: &str = "libx264";

/**
    Configuration for video encoding.
*/
#[derive(Clone, Debug)]
pub struct VideoEncoderConfig {
    /// Encoder name, e.g. `libx264` (None = [`DEFAULT_ENCODER`]).
    pub codec_name: Option<String>,
    /// Private encoder options, passed to the codec on open.
    pub options: Vec<(String, String)>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Requested input pixel format.
    pub pixel_format: Pixel,
    /// Sample aspect ratio (0/1 = unknown).
    pub sample_aspect_ratio: Rational,
    /// Frame rate; the encoder time base is its inverse.
    pub frame_rate: Rational,
    /// Put codec headers in extradata instead of every keyframe.
    pub global_header: bool,
}

impl VideoEncoderConfig {
    /**
        Create a new video encoder configuration.
    */
    pub fn new(width: u32, height: u32, pixel_format: Pixel, frame_rate: Rational) -> Self {
        Self {
            codec_name: None,
            options: Vec::new(),
            width,
            height,
            pixel_format,
            sample_aspect_ratio: Rational::new(0, 1),
            frame_rate,
            global_header: false,
        }
    }

    /**
        Set the encoder name.
    */
    pub fn with_codec_name(mut self, name: impl Into<String>) -> Self {
        self.codec_name = Some(name.into());
        self
    }

    /**
        Set the private encoder options.
    */
    pub fn with_options(mut self, options: Vec<(String, String)>) -> Self {
        self.options = options;
        self
    }

    /**
        Set the sample aspect ratio.
    */
    pub fn with_sample_aspect_ratio(mut self, sar: Rational) -> Self {
        self.sample_aspect_ratio = sar;
        self
    }

    /**
        Request global headers, as containers like MP4 and Matroska need.
    */
    pub fn with_global_header(mut self, global_header: bool) -> Self {
        self.global_header = global_header;
        self
    }

    /**
        The frame rate actually used: the configured one, or 25 fps when
        it is unknown.
    */
    pub fn effective_frame_rate(&self) -> Rational {
        if self.frame_rate.is_positive() {
            self.frame_rate
        } else {
            Rational::new(25, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = VideoEncoderConfig::new(640, 360, Pixel::YUV420P, Rational::new(30, 1))
            .with_codec_name("mpeg4")
            .with_options(vec![("qscale".into(), "3".into())])
            .with_sample_aspect_ratio(Rational::new(1, 1))
            .with_global_header(true);

        assert_eq!(config.codec_name.as_deref(), Some("mpeg4"));
        assert_eq!(config.options, vec![("qscale".to_string(), "3".to_string())]);
        assert_eq!(config.sample_aspect_ratio, Rational::new(1, 1));
        assert!(config.global_header);
    }

    #[test]
    fn unknown_frame_rate_falls_back() {
        let config = VideoEncoderConfig::new(64, 64, Pixel::YUV420P, Rational::new(0, 1));
        assert_eq!(config.effective_frame_rate(), Rational::new(25, 1));

        let config = VideoEncoderConfig::new(64, 64, Pixel::YUV420P, Rational::new(24000, 1001));
        assert_eq!(config.effective_frame_rate(), Rational::new(24000, 1001));
    }
}
