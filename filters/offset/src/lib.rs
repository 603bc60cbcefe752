/*!
    Adds a constant to every sample of every plane, wrapping around at
    the format's bit depth.

    Options:

    - `value` (required): integer added to each sample, may be negative.
      Float formats add `value / max` where `max` is the 8-bit range, so
      `value=255` adds 1.0.
*/

use std::ffi::CStr;

use vidfilter_sdk::{
    BoxError, ComponentType, FilterOptions, FilterPlugin, FrameMut, FrameRef, export_filter,
};

#[derive(Debug)]
pub struct Offset {
    value: i64,
}

impl FilterPlugin for Offset {
    const NAME: &'static CStr = c"offset";

    fn init(options: &FilterOptions) -> Result<Self, BoxError> {
        let value = options.require_int("value")?;
        Ok(Self { value })
    }

    fn apply(&mut self, _input: &FrameRef<'_>, output: &mut FrameMut<'_>) -> Result<(), BoxError> {
        let desc = output.descriptor();
        // Two's complement wrap, masked to the bit depth by map_int_samples
        let delta = self.value as u32;
        let float_delta = self.value as f32 / 255.0;

        for index in 0..output.n_planes() {
            match desc.component_type {
                ComponentType::Int => output.map_int_samples(index, |v| v.wrapping_add(delta)),
                ComponentType::Float => output.map_float_samples(index, |v| v + float_delta),
            }
        }
        Ok(())
    }
}

export_filter!(Offset);
