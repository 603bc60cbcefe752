#![allow(dead_code)]

use std::path::Path;

use ffmpeg_next::format::Pixel;

use ffmpeg_encode::{VideoEncoder, VideoEncoderConfig};
use ffmpeg_sink::Sink;
use ffmpeg_source::CodecConfig;
use ffmpeg_transform::Projector;
use ffmpeg_types::{Frame, MediaDuration, Packet, PixelFormat, Pts, Rational, StreamKind};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 48;

/**
    A frame whose luma is a horizontal ramp offset by `shade`.
*/
pub fn test_frame(shade: u8) -> Frame {
    let mut frame = Frame::new(WIDTH, HEIGHT, PixelFormat::YUV420P8).unwrap();
    for y in 0..HEIGHT as usize {
        for (x, sample) in frame.row_mut(0, y).iter_mut().enumerate() {
            *sample = (x as u8).wrapping_mul(3).wrapping_add(shade);
        }
    }
    frame.plane_mut(1).fill(128);
    frame.plane_mut(2).fill(128);
    frame
}

/**
    What [`synthesize_with`] puts in a file besides the video.
*/
#[derive(Clone, Copy, Debug)]
pub struct Content {
    /// Consecutive frames sharing one timestamp.
    pub repeat: i64,
    /// Subtitle packets written after the video stream, one per frame
    /// timestamp from 0 on.
    pub captions: i64,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            repeat: 1,
            captions: 0,
        }
    }
}

/// Time base of the caption stream.
pub const CAPTION_TIME_BASE: Rational = Rational::new(1, 1000);

/// Milliseconds between caption starts.
pub const CAPTION_SPACING: i64 = 80;

/**
    Write `frames` frames of MPEG-4 video at 25 fps to `path`.

    Returns false, writing nothing, when the linked FFmpeg has no MPEG-4
    encoder.
*/
pub fn synthesize(path: &Path, frames: i64) -> bool {
    synthesize_with(path, frames, Content::default())
}

/**
    Like [`synthesize`], with repeated timestamps or a subtitle stream as
    `content` asks.
*/
pub fn synthesize_with(path: &Path, frames: i64, content: Content) -> bool {
    ffmpeg_next::init().unwrap();
    if ffmpeg_next::encoder::find_by_name("mpeg4").is_none() {
        eprintln!("mpeg4 encoder unavailable, skipping");
        return false;
    }

    let mut sink = Sink::create(path).unwrap();
    let config = VideoEncoderConfig::new(WIDTH, HEIGHT, Pixel::YUV420P, Rational::new(25, 1))
        .with_codec_name("mpeg4")
        .with_global_header(sink.needs_global_header());
    let mut encoder = VideoEncoder::new(&config).unwrap();
    let index = sink
        .add_encoded(&encoder.codec_config(), encoder.time_base())
        .unwrap();
    let captions = (content.captions > 0).then(|| {
        sink.add_passthrough(&subrip_config(), CAPTION_TIME_BASE)
            .unwrap()
    });
    sink.write_header().unwrap();

    let write_video = |sink: &mut Sink, mut packet: Packet| {
        packet.pts = packet.pts.map(|p| Pts(p.0 / content.repeat));
        packet.dts = packet.dts.map(|d| Pts(d.0 / content.repeat));
        sink.write(&packet, index).unwrap();
    };

    let mut projector = Projector::new();
    for pts in 0..frames {
        let mut frame = test_frame(pts as u8 * 10);
        frame.pts = Some(Pts(pts));
        let projected = projector.project(&frame, Pixel::YUV420P).unwrap();
        for packet in encoder.encode(projected.as_native()).unwrap() {
            write_video(&mut sink, packet);
        }
    }
    for packet in encoder.flush().unwrap() {
        write_video(&mut sink, packet);
    }

    if let Some(captions_index) = captions {
        for caption in 0..content.captions {
            let start = caption * CAPTION_SPACING;
            let packet = Packet::new(
                format!("caption {caption}").into_bytes(),
                Some(Pts(start)),
                Some(Pts(start)),
                MediaDuration(CAPTION_SPACING / 2),
                CAPTION_TIME_BASE,
                true,
                captions_index,
                StreamKind::Subtitle,
            );
            sink.write(&packet, captions_index).unwrap();
        }
    }

    sink.finish().unwrap();
    true
}

fn subrip_config() -> CodecConfig {
    let mut parameters = ffmpeg_next::codec::Parameters::new();
    unsafe {
        let raw = parameters.as_mut_ptr();
        (*raw).codec_type = ffmpeg_next::ffi::AVMediaType::AVMEDIA_TYPE_SUBTITLE;
        (*raw).codec_id = ffmpeg_next::ffi::AVCodecID::AV_CODEC_ID_SUBRIP;
    }
    CodecConfig::from_parameters(parameters)
}

/**
    Packets of every `kind` stream in a media file, with timestamps in
    milliseconds.
*/
pub fn packets_of(path: &Path, kind: StreamKind) -> Vec<(Option<i64>, Vec<u8>)> {
    let mut source = ffmpeg_source::Source::open(path).unwrap();
    let mut packets = Vec::new();
    while let Some(packet) = source.next_packet().unwrap() {
        if packet.stream_kind == kind {
            let pts = packet
                .pts
                .map(|p| p.rescale(packet.time_base, CAPTION_TIME_BASE).0);
            packets.push((pts, packet.data));
        }
    }
    packets
}

/**
    Count the packets of every stream in a media file.
*/
pub fn count_packets(path: &Path) -> (usize, usize) {
    let mut source = ffmpeg_source::Source::open(path).unwrap();
    let streams = source.streams().len();
    let mut packets = 0;
    while source.next_packet().unwrap().is_some() {
        packets += 1;
    }
    (streams, packets)
}
