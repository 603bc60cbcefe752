/*!
    Media output and muxing for the vidfilter media crates.

    This crate handles the output side of the media pipeline. It takes
    encoded video packets from the encoder, and untouched packets of
    passthrough streams from the source, and writes them into a container
    file chosen by the output path's extension.
*/

mod sink;

pub use sink::Sink;
