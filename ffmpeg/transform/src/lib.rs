/*!
    Pixel normalization for the vidfilter media crates.

    Decoders hand out frames in whatever layout the codec prefers:
    planar, semi-planar, packed, either byte order. Filters only ever see
    the canonical planar [`Frame`](ffmpeg_types::Frame). This crate maps
    every supported native format to its planar equivalent, normalizes
    native frames into canonical ones and projects canonical frames back
    into the encoder's pixel format.
*/

mod planar;
mod video;

pub use planar::{PlanarEquivalent, native_from_tag, planar_equivalent, planar_pixel, plane_order};
pub use video::{Normalizer, Projected, Projector};
