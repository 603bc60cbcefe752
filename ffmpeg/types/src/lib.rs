/*!
    Shared types for the vidfilter media crates.

    This crate defines the vocabulary that crosses crate boundaries. It has
    no dependency on FFmpeg, so filter hosts and tests can use it without
    pulling in the native bindings.

    # Core Types

    - [`Rational`] - Rational numbers for time bases and frame rates
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`Packet`] - Encoded packet data, tagged with its input stream
    - [`StreamKind`] and [`StreamInfo`] - What a demuxed stream carries

    # Pixel Layout

    - [`PixelFormat`] - Packed tag naming one canonical planar layout
    - [`PixelFormatDescriptor`] - The decoded fields of a tag
    - [`Frame`] - A canonical planar image in one aligned allocation

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod error;
mod format;
mod frame;
mod packet;
mod rational;
mod stream;
mod timestamp;

pub use error::{Error, Result};
pub use format::{ColorModel, ComponentType, PixelFormat, PixelFormatDescriptor};
pub use frame::{FRAME_ALIGN, Frame, MAX_PLANES, NativeFormat, PlaneLayout, PlaneMut};
pub use packet::Packet;
pub use rational::{Rational, rescale};
pub use stream::{StreamInfo, StreamKind};
pub use timestamp::{MediaDuration, Pts};
