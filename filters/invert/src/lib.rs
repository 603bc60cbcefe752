/*!
    Inverts the color planes of every frame: `max - sample` for integer
    formats, `1.0 - sample` for float ones. Alpha is left alone.

    Takes no options.
*/

use std::ffi::CStr;

use vidfilter_sdk::{
    BoxError, ComponentType, FilterOptions, FilterPlugin, FrameMut, FrameRef, export_filter,
};

/// Planes affected: luma and chroma, or R, G and B.
const COLOR_PLANES: usize = 3;

pub struct Invert;

impl FilterPlugin for Invert {
    const NAME: &'static CStr = c"invert";

    fn init(options: &FilterOptions) -> Result<Self, BoxError> {
        if let Some((key, _)) = options.iter().next() {
            return Err(format!("invert takes no options, got '{key}'").into());
        }
        Ok(Self)
    }

    fn apply(&mut self, _input: &FrameRef<'_>, output: &mut FrameMut<'_>) -> Result<(), BoxError> {
        let desc = output.descriptor();
        let max = if desc.bits_per_comp >= 32 {
            u32::MAX
        } else {
            (1u32 << desc.bits_per_comp) - 1
        };

        for index in 0..output.n_planes().min(COLOR_PLANES) {
            match desc.component_type {
                ComponentType::Int => output.map_int_samples(index, |v| max - v.min(max)),
                ComponentType::Float => output.map_float_samples(index, |v| 1.0 - v),
            }
        }
        Ok(())
    }
}

export_filter!(Invert);

#[cfg(test)]
mod tests {
    use super::*;

    use vidfilter_sdk::PixelFormat;
    use vidfilter_sdk::abi::FrameView;

    use ffmpeg_types::Frame;

    fn run(frame: &Frame) -> Frame {
        let mut output = frame.clone();
        let in_view = FrameView::of(frame);
        let mut out_view = FrameView::of_mut(&mut output);
        let input = unsafe { FrameRef::from_view(&in_view) }.unwrap();
        let mut out = unsafe { FrameMut::from_view(&mut out_view) }.unwrap();
        Invert.apply(&input, &mut out).unwrap();
        output
    }

    #[test]
    fn inverts_eight_bit_planes() {
        let mut frame = Frame::new(4, 4, PixelFormat::YUV420P8).unwrap();
        frame.plane_mut(0).fill(10);
        frame.plane_mut(1).fill(200);

        let out = run(&frame);
        assert_eq!(out.row(0, 3), &[245; 4]);
        assert_eq!(out.row(1, 1), &[55; 2]);
        assert_eq!(out.row(2, 0), &[255; 2]);
    }

    #[test]
    fn keeps_alpha_and_bit_depth() {
        let frame = Frame::new(2, 2, PixelFormat::YUVA444P10).unwrap();
        let out = run(&frame);
        // 1023 little endian
        assert_eq!(out.row(0, 0), &[0xFF, 0x03, 0xFF, 0x03]);
        assert_eq!(out.row(3, 0), &[0, 0, 0, 0]);
    }

    #[test]
    fn rejects_options() {
        let options = FilterOptions::new(vec![("value".into(), "1".into())]);
        assert!(Invert::init(&options).is_err());
        assert!(Invert::init(&FilterOptions::default()).is_ok());
    }
}
