/*!
    Encoded packet type.
*/

use crate::{MediaDuration, Pts, Rational, StreamKind};

/**
    An encoded media packet.

    Contains compressed data from a single stream, with timing information.
    Packets are the unit of data between demuxer and decoder, between
    encoder and muxer, and between demuxer and muxer for remuxed streams.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Compressed data.
    pub data: Vec<u8>,
    /// Presentation timestamp.
    pub pts: Option<Pts>,
    /// Decode timestamp (may differ from PTS when frames are reordered).
    pub dts: Option<Pts>,
    /// Duration of this packet's content.
    pub duration: MediaDuration,
    /// Time base for interpreting timestamps.
    pub time_base: Rational,
    /// Whether this is a keyframe.
    pub is_keyframe: bool,
    /// Index of the input stream this packet belongs to.
    pub stream_index: usize,
    /// Kind of the input stream this packet belongs to.
    pub stream_kind: StreamKind,
}

impl Packet {
    /**
        Create a new packet.
    */
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        data: Vec<u8>,
        pts: Option<Pts>,
        dts: Option<Pts>,
        duration: MediaDuration,
        time_base: Rational,
        is_keyframe: bool,
        stream_index: usize,
        stream_kind: StreamKind,
    ) -> Self {
        Self {
            data,
            pts,
            dts,
            duration,
            time_base,
            is_keyframe,
            stream_index,
            stream_kind,
        }
    }

    /**
        Returns true if this packet contains video data.
    */
    pub fn is_video(&self) -> bool {
        self.stream_kind == StreamKind::Video
    }

    /**
        Returns `(pts, dts, duration)` rescaled into `to`.
    */
    pub fn rescaled_timing(&self, to: Rational) -> (Option<Pts>, Option<Pts>, MediaDuration) {
        (
            self.pts.map(|p| p.rescale(self.time_base, to)),
            self.dts.map(|d| d.rescale(self.time_base, to)),
            self.duration.rescale(self.time_base, to),
        )
    }
}

static_assertions::assert_impl_all!(Packet: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    const TB_1_1000: Rational = Rational { num: 1, den: 1000 };

    fn packet(kind: StreamKind) -> Packet {
        Packet::new(
            vec![0u8; 16],
            Some(Pts(80)),
            Some(Pts(40)),
            MediaDuration(40),
            TB_1_1000,
            true,
            2,
            kind,
        )
    }

    #[test]
    fn construction() {
        let p = packet(StreamKind::Video);
        assert_eq!(p.data.len(), 16);
        assert_eq!(p.stream_index, 2);
        assert!(p.is_keyframe);
        assert!(p.is_video());
        assert!(!packet(StreamKind::Audio).is_video());
    }

    #[test]
    fn rescaled_timing() {
        let p = packet(StreamKind::Audio);
        let (pts, dts, duration) = p.rescaled_timing(Rational::new(1, 25));
        assert_eq!(pts, Some(Pts(2)));
        assert_eq!(dts, Some(Pts(1)));
        assert_eq!(duration, MediaDuration(1));
    }
}
