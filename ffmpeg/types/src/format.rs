/*!
    Canonical pixel format tags.

    A [`PixelFormat`] is a packed 32-bit tag that fully describes one planar
    layout: color model, component type, plane count, bits per component and
    the log2 chroma subsampling factors. The tag is what filters see, so its
    bit layout is part of the plugin ABI:

    ```text
    bits  0..4   color model     (0 = YUV, 1 = RGB, 2 = gray)
    bits  4..8   component type  (0 = integer, 1 = float)
    bits  8..16  plane count
    bits 16..24  bits per component
    bits 24..28  log2 horizontal chroma subsampling
    bits 28..32  log2 vertical chroma subsampling
    ```
*/

use std::fmt;

use crate::{Error, Result};

/**
    Color model of a canonical layout.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ColorModel {
    Yuv = 0,
    Rgb = 1,
    Gray = 2,
}

/**
    Storage type of each component.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ComponentType {
    Int = 0,
    Float = 1,
}

/**
    The decoded fields of a [`PixelFormat`] tag.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormatDescriptor {
    pub color_model: ColorModel,
    pub component_type: ComponentType,
    /// Number of planes, 1 to 4. Alpha always adds exactly one plane.
    pub n_planes: usize,
    pub bits_per_comp: u32,
    /// `ceil(bits_per_comp / 8)`.
    pub bytes_per_comp: usize,
    /// `chroma_width = ceil(width / 2^log2_chroma_w)`.
    pub log2_chroma_w: u32,
    /// `chroma_height = ceil(height / 2^log2_chroma_h)`.
    pub log2_chroma_h: u32,
}

impl PixelFormatDescriptor {
    /**
        Returns true if the layout carries an alpha plane.
    */
    pub const fn has_alpha(&self) -> bool {
        self.n_planes == 2 || self.n_planes == 4
    }

    /**
        Returns true if plane `index` is subsampled by the chroma factors.

        Only the two chroma planes of a YUV layout are; luma, alpha and
        every RGB or gray plane are full resolution.
    */
    pub const fn is_chroma_plane(&self, index: usize) -> bool {
        matches!(self.color_model, ColorModel::Yuv) && (index == 1 || index == 2)
    }
}

/**
    A canonical planar pixel layout, stored as its packed tag.

    Values can only be obtained from the associated constants or through
    [`PixelFormat::from_raw`], which validates the tag, so every value
    describes a consistent layout.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat(u32);

const fn tag(model: ColorModel, n_planes: u32, comp: ComponentType, bits: u32, lw: u32, lh: u32) -> PixelFormat {
    PixelFormat(
        (model as u32)
            | ((comp as u32) << 4)
            | (n_planes << 8)
            | (bits << 16)
            | (lw << 24)
            | (lh << 28),
    )
}

use ColorModel::{Gray, Rgb, Yuv};
use ComponentType::{Float, Int};

impl PixelFormat {
    pub const YUV420P8: Self = tag(Yuv, 3, Int, 8, 1, 1);
    pub const YUV420P9: Self = tag(Yuv, 3, Int, 9, 1, 1);
    pub const YUV420P10: Self = tag(Yuv, 3, Int, 10, 1, 1);
    pub const YUV420P12: Self = tag(Yuv, 3, Int, 12, 1, 1);
    pub const YUV420P14: Self = tag(Yuv, 3, Int, 14, 1, 1);
    pub const YUV420P16: Self = tag(Yuv, 3, Int, 16, 1, 1);

    pub const YUV422P8: Self = tag(Yuv, 3, Int, 8, 1, 0);
    pub const YUV422P9: Self = tag(Yuv, 3, Int, 9, 1, 0);
    pub const YUV422P10: Self = tag(Yuv, 3, Int, 10, 1, 0);
    pub const YUV422P12: Self = tag(Yuv, 3, Int, 12, 1, 0);
    pub const YUV422P14: Self = tag(Yuv, 3, Int, 14, 1, 0);
    pub const YUV422P16: Self = tag(Yuv, 3, Int, 16, 1, 0);

    pub const YUV444P8: Self = tag(Yuv, 3, Int, 8, 0, 0);
    pub const YUV444P9: Self = tag(Yuv, 3, Int, 9, 0, 0);
    pub const YUV444P10: Self = tag(Yuv, 3, Int, 10, 0, 0);
    pub const YUV444P12: Self = tag(Yuv, 3, Int, 12, 0, 0);
    pub const YUV444P14: Self = tag(Yuv, 3, Int, 14, 0, 0);
    pub const YUV444P16: Self = tag(Yuv, 3, Int, 16, 0, 0);

    pub const YUV410P8: Self = tag(Yuv, 3, Int, 8, 2, 2);
    pub const YUV411P8: Self = tag(Yuv, 3, Int, 8, 2, 0);
    pub const YUV440P8: Self = tag(Yuv, 3, Int, 8, 0, 1);
    pub const YUV440P10: Self = tag(Yuv, 3, Int, 10, 0, 1);
    pub const YUV440P12: Self = tag(Yuv, 3, Int, 12, 0, 1);

    pub const YUVA420P8: Self = tag(Yuv, 4, Int, 8, 1, 1);
    pub const YUVA420P9: Self = tag(Yuv, 4, Int, 9, 1, 1);
    pub const YUVA420P10: Self = tag(Yuv, 4, Int, 10, 1, 1);
    pub const YUVA420P16: Self = tag(Yuv, 4, Int, 16, 1, 1);

    pub const YUVA422P8: Self = tag(Yuv, 4, Int, 8, 1, 0);
    pub const YUVA422P9: Self = tag(Yuv, 4, Int, 9, 1, 0);
    pub const YUVA422P10: Self = tag(Yuv, 4, Int, 10, 1, 0);
    pub const YUVA422P12: Self = tag(Yuv, 4, Int, 12, 1, 0);
    pub const YUVA422P16: Self = tag(Yuv, 4, Int, 16, 1, 0);

    pub const YUVA444P8: Self = tag(Yuv, 4, Int, 8, 0, 0);
    pub const YUVA444P9: Self = tag(Yuv, 4, Int, 9, 0, 0);
    pub const YUVA444P10: Self = tag(Yuv, 4, Int, 10, 0, 0);
    pub const YUVA444P12: Self = tag(Yuv, 4, Int, 12, 0, 0);
    pub const YUVA444P16: Self = tag(Yuv, 4, Int, 16, 0, 0);

    pub const Y8: Self = tag(Gray, 1, Int, 8, 0, 0);
    pub const Y9: Self = tag(Gray, 1, Int, 9, 0, 0);
    pub const Y10: Self = tag(Gray, 1, Int, 10, 0, 0);
    pub const Y12: Self = tag(Gray, 1, Int, 12, 0, 0);
    pub const Y14: Self = tag(Gray, 1, Int, 14, 0, 0);
    pub const Y16: Self = tag(Gray, 1, Int, 16, 0, 0);
    pub const YF32: Self = tag(Gray, 1, Float, 32, 0, 0);

    pub const YA8: Self = tag(Gray, 2, Int, 8, 0, 0);
    pub const YA16: Self = tag(Gray, 2, Int, 16, 0, 0);

    pub const RGBP8: Self = tag(Rgb, 3, Int, 8, 0, 0);
    pub const RGBP9: Self = tag(Rgb, 3, Int, 9, 0, 0);
    pub const RGBP10: Self = tag(Rgb, 3, Int, 10, 0, 0);
    pub const RGBP12: Self = tag(Rgb, 3, Int, 12, 0, 0);
    pub const RGBP14: Self = tag(Rgb, 3, Int, 14, 0, 0);
    pub const RGBP16: Self = tag(Rgb, 3, Int, 16, 0, 0);
    pub const RGBPF32: Self = tag(Rgb, 3, Float, 32, 0, 0);

    pub const RGBAP8: Self = tag(Rgb, 4, Int, 8, 0, 0);
    pub const RGBAP10: Self = tag(Rgb, 4, Int, 10, 0, 0);
    pub const RGBAP12: Self = tag(Rgb, 4, Int, 12, 0, 0);
    pub const RGBAP14: Self = tag(Rgb, 4, Int, 14, 0, 0);
    pub const RGBAP16: Self = tag(Rgb, 4, Int, 16, 0, 0);
    pub const RGBAPF32: Self = tag(Rgb, 4, Float, 32, 0, 0);

    /**
        Every named layout.
    */
    pub const ALL: &'static [PixelFormat] = &[
        Self::YUV420P8,
        Self::YUV420P9,
        Self::YUV420P10,
        Self::YUV420P12,
        Self::YUV420P14,
        Self::YUV420P16,
        Self::YUV422P8,
        Self::YUV422P9,
        Self::YUV422P10,
        Self::YUV422P12,
        Self::YUV422P14,
        Self::YUV422P16,
        Self::YUV444P8,
        Self::YUV444P9,
        Self::YUV444P10,
        Self::YUV444P12,
        Self::YUV444P14,
        Self::YUV444P16,
        Self::YUV410P8,
        Self::YUV411P8,
        Self::YUV440P8,
        Self::YUV440P10,
        Self::YUV440P12,
        Self::YUVA420P8,
        Self::YUVA420P9,
        Self::YUVA420P10,
        Self::YUVA420P16,
        Self::YUVA422P8,
        Self::YUVA422P9,
        Self::YUVA422P10,
        Self::YUVA422P12,
        Self::YUVA422P16,
        Self::YUVA444P8,
        Self::YUVA444P9,
        Self::YUVA444P10,
        Self::YUVA444P12,
        Self::YUVA444P16,
        Self::Y8,
        Self::Y9,
        Self::Y10,
        Self::Y12,
        Self::Y14,
        Self::Y16,
        Self::YF32,
        Self::YA8,
        Self::YA16,
        Self::RGBP8,
        Self::RGBP9,
        Self::RGBP10,
        Self::RGBP12,
        Self::RGBP14,
        Self::RGBP16,
        Self::RGBPF32,
        Self::RGBAP8,
        Self::RGBAP10,
        Self::RGBAP12,
        Self::RGBAP14,
        Self::RGBAP16,
        Self::RGBAPF32,
    ];

    /**
        Validate a raw tag, e.g. one handed back across the plugin boundary.

        Any tag describing a consistent layout is accepted, not only the
        named constants.
    */
    pub fn from_raw(raw: u32) -> Result<Self> {
        let invalid = |why: &str| Error::invalid_data(format!("pixel format tag {raw:#010x}: {why}"));

        let model = raw & 0xF;
        let comp = (raw >> 4) & 0xF;
        let n_planes = (raw >> 8) & 0xFF;
        let bits = (raw >> 16) & 0xFF;
        let lw = (raw >> 24) & 0xF;
        let lh = (raw >> 28) & 0xF;

        if model > Gray as u32 {
            return Err(invalid("unknown color model"));
        }
        if comp > Float as u32 {
            return Err(invalid("unknown component type"));
        }
        if bits == 0 || bits > 32 {
            return Err(invalid("bits per component out of range"));
        }
        if comp == Float as u32 && bits != 32 {
            return Err(invalid("float components must be 32 bits"));
        }
        if lw > 2 || lh > 2 {
            return Err(invalid("chroma subsampling out of range"));
        }

        let planes_ok = match model {
            m if m == Yuv as u32 => n_planes == 3 || n_planes == 4,
            m if m == Rgb as u32 => n_planes == 3 || n_planes == 4,
            _ => n_planes == 1 || n_planes == 2,
        };
        if !planes_ok {
            return Err(invalid("plane count does not match color model"));
        }
        if model != Yuv as u32 && (lw != 0 || lh != 0) {
            return Err(invalid("only YUV layouts may be subsampled"));
        }

        Ok(Self(raw))
    }

    /**
        The packed tag.
    */
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /**
        Decode the tag into its fields.
    */
    pub const fn descriptor(self) -> PixelFormatDescriptor {
        let raw = self.0;
        // Tags are validated on construction.
        let color_model = match raw & 0xF {
            0 => Yuv,
            1 => Rgb,
            _ => Gray,
        };
        let component_type = match (raw >> 4) & 0xF {
            0 => Int,
            _ => Float,
        };
        let bits_per_comp = (raw >> 16) & 0xFF;
        PixelFormatDescriptor {
            color_model,
            component_type,
            n_planes: ((raw >> 8) & 0xFF) as usize,
            bits_per_comp,
            bytes_per_comp: bits_per_comp.div_ceil(8) as usize,
            log2_chroma_w: (raw >> 24) & 0xF,
            log2_chroma_h: (raw >> 28) & 0xF,
        }
    }

    /**
        Short lowercase name, e.g. `yuv420p8`, `yuva444p10`, `ya16`, `rgbpf32`.
    */
    pub fn name(self) -> String {
        let d = self.descriptor();
        let mut name = String::with_capacity(12);

        name.push_str(match d.color_model {
            Yuv => "yuv",
            Rgb => "rgb",
            Gray => "y",
        });
        if d.has_alpha() {
            name.push('a');
        }
        if d.color_model == Yuv {
            // J:a:b notation, https://en.wikipedia.org/wiki/Chroma_subsampling
            let a = 4 >> d.log2_chroma_w;
            let b = if d.log2_chroma_h == 0 { a } else { 0 };
            name.push_str(&format!("4{a}{b}"));
        }
        if d.color_model != Gray {
            name.push('p');
        }
        if d.component_type == Float {
            name.push('f');
        }
        name.push_str(&d.bits_per_comp.to_string());
        name
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelFormat({})", self.name())
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
