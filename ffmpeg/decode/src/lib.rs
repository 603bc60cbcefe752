/*!
    Video decoding for the vidfilter media crates.

    This crate transforms encoded packets into native decoded frames.
    Frames stay in the decoder's own pixel layout; converting them to the
    canonical planar `Frame` is the job of `ffmpeg-transform`.

    Audio is never decoded: non-video streams are copied by the muxer.
*/

mod video;

pub use video::{DecodedFrame, VideoDecoder};
