/*!
    The planar-equivalent table.

    Every supported native pixel format maps to a planar native format
    whose memory layout matches a canonical [`PixelFormat`] plane for
    plane (up to plane order for RGB). Semi-planar chroma collapses to
    full-planar YUV, packed RGB becomes planar RGB with or without alpha,
    and big-endian formats map to their little-endian sibling.
*/

use ffmpeg_next::{ffi::AVPixelFormat as F, format::Pixel};

use ffmpeg_types::{ColorModel, MAX_PLANES, NativeFormat, PixelFormat};

/**
    The planar layout a native pixel format is normalized into.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanarEquivalent {
    /// Native planar format with the same layout as `format`.
    pub pixel: Pixel,
    /// Canonical format of the normalized frame.
    pub format: PixelFormat,
}

impl PlanarEquivalent {
    /**
        Native plane index holding canonical plane `i`, for every `i`.

        Native planar RGB stores planes as G, B, R, A while canonical
        frames store R, G, B, A.
    */
    pub fn plane_order(&self) -> [usize; MAX_PLANES] {
        plane_order(self.format)
    }
}

/**
    Native plane index holding canonical plane `i` of `format`.
*/
pub fn plane_order(format: PixelFormat) -> [usize; MAX_PLANES] {
    match format.descriptor().color_model {
        ColorModel::Rgb => [2, 0, 1, 3],
        ColorModel::Yuv | ColorModel::Gray => [0, 1, 2, 3],
    }
}

/// (native, planar equivalent, canonical format)
///
/// Rows where native == planar come first for each canonical format, so
/// [`planar_pixel`] finds the plain (non full-range) variant.
const TABLE: &[(F, F, PixelFormat)] = &[
    // planar YUV, already canonical
    (F::AV_PIX_FMT_YUV420P, F::AV_PIX_FMT_YUV420P, PixelFormat::YUV420P8),
    (F::AV_PIX_FMT_YUV420P9LE, F::AV_PIX_FMT_YUV420P9LE, PixelFormat::YUV420P9),
    (F::AV_PIX_FMT_YUV420P10LE, F::AV_PIX_FMT_YUV420P10LE, PixelFormat::YUV420P10),
    (F::AV_PIX_FMT_YUV420P12LE, F::AV_PIX_FMT_YUV420P12LE, PixelFormat::YUV420P12),
    (F::AV_PIX_FMT_YUV420P14LE, F::AV_PIX_FMT_YUV420P14LE, PixelFormat::YUV420P14),
    (F::AV_PIX_FMT_YUV420P16LE, F::AV_PIX_FMT_YUV420P16LE, PixelFormat::YUV420P16),
    (F::AV_PIX_FMT_YUV422P, F::AV_PIX_FMT_YUV422P, PixelFormat::YUV422P8),
    (F::AV_PIX_FMT_YUV422P9LE, F::AV_PIX_FMT_YUV422P9LE, PixelFormat::YUV422P9),
    (F::AV_PIX_FMT_YUV422P10LE, F::AV_PIX_FMT_YUV422P10LE, PixelFormat::YUV422P10),
    (F::AV_PIX_FMT_YUV422P12LE, F::AV_PIX_FMT_YUV422P12LE, PixelFormat::YUV422P12),
    (F::AV_PIX_FMT_YUV422P14LE, F::AV_PIX_FMT_YUV422P14LE, PixelFormat::YUV422P14),
    (F::AV_PIX_FMT_YUV422P16LE, F::AV_PIX_FMT_YUV422P16LE, PixelFormat::YUV422P16),
    (F::AV_PIX_FMT_YUV444P, F::AV_PIX_FMT_YUV444P, PixelFormat::YUV444P8),
    (F::AV_PIX_FMT_YUV444P9LE, F::AV_PIX_FMT_YUV444P9LE, PixelFormat::YUV444P9),
    (F::AV_PIX_FMT_YUV444P10LE, F::AV_PIX_FMT_YUV444P10LE, PixelFormat::YUV444P10),
    (F::AV_PIX_FMT_YUV444P12LE, F::AV_PIX_FMT_YUV444P12LE, PixelFormat::YUV444P12),
    (F::AV_PIX_FMT_YUV444P14LE, F::AV_PIX_FMT_YUV444P14LE, PixelFormat::YUV444P14),
    (F::AV_PIX_FMT_YUV444P16LE, F::AV_PIX_FMT_YUV444P16LE, PixelFormat::YUV444P16),
    (F::AV_PIX_FMT_YUV410P, F::AV_PIX_FMT_YUV410P, PixelFormat::YUV410P8),
    (F::AV_PIX_FMT_YUV411P, F::AV_PIX_FMT_YUV411P, PixelFormat::YUV411P8),
    (F::AV_PIX_FMT_YUV440P, F::AV_PIX_FMT_YUV440P, PixelFormat::YUV440P8),
    (F::AV_PIX_FMT_YUV440P10LE, F::AV_PIX_FMT_YUV440P10LE, PixelFormat::YUV440P10),
    (F::AV_PIX_FMT_YUV440P12LE, F::AV_PIX_FMT_YUV440P12LE, PixelFormat::YUV440P12),
    (F::AV_PIX_FMT_YUVA420P, F::AV_PIX_FMT_YUVA420P, PixelFormat::YUVA420P8),
    (F::AV_PIX_FMT_YUVA420P9LE, F::AV_PIX_FMT_YUVA420P9LE, PixelFormat::YUVA420P9),
    (F::AV_PIX_FMT_YUVA420P10LE, F::AV_PIX_FMT_YUVA420P10LE, PixelFormat::YUVA420P10),
    (F::AV_PIX_FMT_YUVA420P16LE, F::AV_PIX_FMT_YUVA420P16LE, PixelFormat::YUVA420P16),
    (F::AV_PIX_FMT_YUVA422P, F::AV_PIX_FMT_YUVA422P, PixelFormat::YUVA422P8),
    (F::AV_PIX_FMT_YUVA422P9LE, F::AV_PIX_FMT_YUVA422P9LE, PixelFormat::YUVA422P9),
    (F::AV_PIX_FMT_YUVA422P10LE, F::AV_PIX_FMT_YUVA422P10LE, PixelFormat::YUVA422P10),
    (F::AV_PIX_FMT_YUVA422P12LE, F::AV_PIX_FMT_YUVA422P12LE, PixelFormat::YUVA422P12),
    (F::AV_PIX_FMT_YUVA422P16LE, F::AV_PIX_FMT_YUVA422P16LE, PixelFormat::YUVA422P16),
    (F::AV_PIX_FMT_YUVA444P, F::AV_PIX_FMT_YUVA444P, PixelFormat::YUVA444P8),
    (F::AV_PIX_FMT_YUVA444P9LE, F::AV_PIX_FMT_YUVA444P9LE, PixelFormat::YUVA444P9),
    (F::AV_PIX_FMT_YUVA444P10LE, F::AV_PIX_FMT_YUVA444P10LE, PixelFormat::YUVA444P10),
    (F::AV_PIX_FMT_YUVA444P12LE, F::AV_PIX_FMT_YUVA444P12LE, PixelFormat::YUVA444P12),
    (F::AV_PIX_FMT_YUVA444P16LE, F::AV_PIX_FMT_YUVA444P16LE, PixelFormat::YUVA444P16),
    // full-range YUV keeps its own format so no range conversion happens
    (F::AV_PIX_FMT_YUVJ420P, F::AV_PIX_FMT_YUVJ420P, PixelFormat::YUV420P8),
    (F::AV_PIX_FMT_YUVJ422P, F::AV_PIX_FMT_YUVJ422P, PixelFormat::YUV422P8),
    (F::AV_PIX_FMT_YUVJ444P, F::AV_PIX_FMT_YUVJ444P, PixelFormat::YUV444P8),
    (F::AV_PIX_FMT_YUVJ411P, F::AV_PIX_FMT_YUVJ411P, PixelFormat::YUV411P8),
    (F::AV_PIX_FMT_YUVJ440P, F::AV_PIX_FMT_YUVJ440P, PixelFormat::YUV440P8),
    // big-endian planar YUV
    (F::AV_PIX_FMT_YUV420P9BE, F::AV_PIX_FMT_YUV420P9LE, PixelFormat::YUV420P9),
    (F::AV_PIX_FMT_YUV420P10BE, F::AV_PIX_FMT_YUV420P10LE, PixelFormat::YUV420P10),
    (F::AV_PIX_FMT_YUV420P12BE, F::AV_PIX_FMT_YUV420P12LE, PixelFormat::YUV420P12),
    (F::AV_PIX_FMT_YUV420P14BE, F::AV_PIX_FMT_YUV420P14LE, PixelFormat::YUV420P14),
    (F::AV_PIX_FMT_YUV420P16BE, F::AV_PIX_FMT_YUV420P16LE, PixelFormat::YUV420P16),
    (F::AV_PIX_FMT_YUV422P9BE, F::AV_PIX_FMT_YUV422P9LE, PixelFormat::YUV422P9),
    (F::AV_PIX_FMT_YUV422P10BE, F::AV_PIX_FMT_YUV422P10LE, PixelFormat::YUV422P10),
    (F::AV_PIX_FMT_YUV422P12BE, F::AV_PIX_FMT_YUV422P12LE, PixelFormat::YUV422P12),
    (F::AV_PIX_FMT_YUV422P14BE, F::AV_PIX_FMT_YUV422P14LE, PixelFormat::YUV422P14),
    (F::AV_PIX_FMT_YUV422P16BE, F::AV_PIX_FMT_YUV422P16LE, PixelFormat::YUV422P16),
    (F::AV_PIX_FMT_YUV444P9BE, F::AV_PIX_FMT_YUV444P9LE, PixelFormat::YUV444P9),
    (F::AV_PIX_FMT_YUV444P10BE, F::AV_PIX_FMT_YUV444P10LE, PixelFormat::YUV444P10),
    (F::AV_PIX_FMT_YUV444P12BE, F::AV_PIX_FMT_YUV444P12LE, PixelFormat::YUV444P12),
    (F::AV_PIX_FMT_YUV444P14BE, F::AV_PIX_FMT_YUV444P14LE, PixelFormat::YUV444P14),
    (F::AV_PIX_FMT_YUV444P16BE, F::AV_PIX_FMT_YUV444P16LE, PixelFormat::YUV444P16),
    (F::AV_PIX_FMT_YUV440P10BE, F::AV_PIX_FMT_YUV440P10LE, PixelFormat::YUV440P10),
    (F::AV_PIX_FMT_YUV440P12BE, F::AV_PIX_FMT_YUV440P12LE, PixelFormat::YUV440P12),
    (F::AV_PIX_FMT_YUVA420P9BE, F::AV_PIX_FMT_YUVA420P9LE, PixelFormat::YUVA420P9),
    (F::AV_PIX_FMT_YUVA420P10BE, F::AV_PIX_FMT_YUVA420P10LE, PixelFormat::YUVA420P10),
    (F::AV_PIX_FMT_YUVA420P16BE, F::AV_PIX_FMT_YUVA420P16LE, PixelFormat::YUVA420P16),
    (F::AV_PIX_FMT_YUVA422P9BE, F::AV_PIX_FMT_YUVA422P9LE, PixelFormat::YUVA422P9),
    (F::AV_PIX_FMT_YUVA422P10BE, F::AV_PIX_FMT_YUVA422P10LE, PixelFormat::YUVA422P10),
    (F::AV_PIX_FMT_YUVA422P12BE, F::AV_PIX_FMT_YUVA422P12LE, PixelFormat::YUVA422P12),
    (F::AV_PIX_FMT_YUVA422P16BE, F::AV_PIX_FMT_YUVA422P16LE, PixelFormat::YUVA422P16),
    (F::AV_PIX_FMT_YUVA444P9BE, F::AV_PIX_FMT_YUVA444P9LE, PixelFormat::YUVA444P9),
    (F::AV_PIX_FMT_YUVA444P10BE, F::AV_PIX_FMT_YUVA444P10LE, PixelFormat::YUVA444P10),
    (F::AV_PIX_FMT_YUVA444P12BE, F::AV_PIX_FMT_YUVA444P12LE, PixelFormat::YUVA444P12),
    (F::AV_PIX_FMT_YUVA444P16BE, F::AV_PIX_FMT_YUVA444P16LE, PixelFormat::YUVA444P16),
    // semi-planar and packed YUV
    (F::AV_PIX_FMT_NV12, F::AV_PIX_FMT_YUV420P, PixelFormat::YUV420P8),
    (F::AV_PIX_FMT_NV21, F::AV_PIX_FMT_YUV420P, PixelFormat::YUV420P8),
    (F::AV_PIX_FMT_NV16, F::AV_PIX_FMT_YUV422P, PixelFormat::YUV422P8),
    (F::AV_PIX_FMT_NV24, F::AV_PIX_FMT_YUV444P, PixelFormat::YUV444P8),
    (F::AV_PIX_FMT_NV42, F::AV_PIX_FMT_YUV444P, PixelFormat::YUV444P8),
    (F::AV_PIX_FMT_P010LE, F::AV_PIX_FMT_YUV420P10LE, PixelFormat::YUV420P10),
    (F::AV_PIX_FMT_P010BE, F::AV_PIX_FMT_YUV420P10LE, PixelFormat::YUV420P10),
    (F::AV_PIX_FMT_P016LE, F::AV_PIX_FMT_YUV420P16LE, PixelFormat::YUV420P16),
    (F::AV_PIX_FMT_P016BE, F::AV_PIX_FMT_YUV420P16LE, PixelFormat::YUV420P16),
    (F::AV_PIX_FMT_YUYV422, F::AV_PIX_FMT_YUV422P, PixelFormat::YUV422P8),
    (F::AV_PIX_FMT_UYVY422, F::AV_PIX_FMT_YUV422P, PixelFormat::YUV422P8),
    // gray
    (F::AV_PIX_FMT_GRAY8, F::AV_PIX_FMT_GRAY8, PixelFormat::Y8),
    (F::AV_PIX_FMT_GRAY9LE, F::AV_PIX_FMT_GRAY9LE, PixelFormat::Y9),
    (F::AV_PIX_FMT_GRAY10LE, F::AV_PIX_FMT_GRAY10LE, PixelFormat::Y10),
    (F::AV_PIX_FMT_GRAY12LE, F::AV_PIX_FMT_GRAY12LE, PixelFormat::Y12),
    (F::AV_PIX_FMT_GRAY14LE, F::AV_PIX_FMT_GRAY14LE, PixelFormat::Y14),
    (F::AV_PIX_FMT_GRAY16LE, F::AV_PIX_FMT_GRAY16LE, PixelFormat::Y16),
    (F::AV_PIX_FMT_GRAYF32LE, F::AV_PIX_FMT_GRAYF32LE, PixelFormat::YF32),
    (F::AV_PIX_FMT_GRAY9BE, F::AV_PIX_FMT_GRAY9LE, PixelFormat::Y9),
    (F::AV_PIX_FMT_GRAY10BE, F::AV_PIX_FMT_GRAY10LE, PixelFormat::Y10),
    (F::AV_PIX_FMT_GRAY12BE, F::AV_PIX_FMT_GRAY12LE, PixelFormat::Y12),
    (F::AV_PIX_FMT_GRAY14BE, F::AV_PIX_FMT_GRAY14LE, PixelFormat::Y14),
    (F::AV_PIX_FMT_GRAY16BE, F::AV_PIX_FMT_GRAY16LE, PixelFormat::Y16),
    (F::AV_PIX_FMT_GRAYF32BE, F::AV_PIX_FMT_GRAYF32LE, PixelFormat::YF32),
    (F::AV_PIX_FMT_MONOWHITE, F::AV_PIX_FMT_GRAY8, PixelFormat::Y8),
    (F::AV_PIX_FMT_MONOBLACK, F::AV_PIX_FMT_GRAY8, PixelFormat::Y8),
    // planar RGB, already canonical up to plane order
    (F::AV_PIX_FMT_GBRP, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_GBRP9LE, F::AV_PIX_FMT_GBRP9LE, PixelFormat::RGBP9),
    (F::AV_PIX_FMT_GBRP10LE, F::AV_PIX_FMT_GBRP10LE, PixelFormat::RGBP10),
    (F::AV_PIX_FMT_GBRP12LE, F::AV_PIX_FMT_GBRP12LE, PixelFormat::RGBP12),
    (F::AV_PIX_FMT_GBRP14LE, F::AV_PIX_FMT_GBRP14LE, PixelFormat::RGBP14),
    (F::AV_PIX_FMT_GBRP16LE, F::AV_PIX_FMT_GBRP16LE, PixelFormat::RGBP16),
    (F::AV_PIX_FMT_GBRPF32LE, F::AV_PIX_FMT_GBRPF32LE, PixelFormat::RGBPF32),
    (F::AV_PIX_FMT_GBRAP, F::AV_PIX_FMT_GBRAP, PixelFormat::RGBAP8),
    (F::AV_PIX_FMT_GBRAP10LE, F::AV_PIX_FMT_GBRAP10LE, PixelFormat::RGBAP10),
    (F::AV_PIX_FMT_GBRAP12LE, F::AV_PIX_FMT_GBRAP12LE, PixelFormat::RGBAP12),
    (F::AV_PIX_FMT_GBRAP16LE, F::AV_PIX_FMT_GBRAP16LE, PixelFormat::RGBAP16),
    (F::AV_PIX_FMT_GBRAPF32LE, F::AV_PIX_FMT_GBRAPF32LE, PixelFormat::RGBAPF32),
    (F::AV_PIX_FMT_GBRP9BE, F::AV_PIX_FMT_GBRP9LE, PixelFormat::RGBP9),
    (F::AV_PIX_FMT_GBRP10BE, F::AV_PIX_FMT_GBRP10LE, PixelFormat::RGBP10),
    (F::AV_PIX_FMT_GBRP12BE, F::AV_PIX_FMT_GBRP12LE, PixelFormat::RGBP12),
    (F::AV_PIX_FMT_GBRP14BE, F::AV_PIX_FMT_GBRP14LE, PixelFormat::RGBP14),
    (F::AV_PIX_FMT_GBRP16BE, F::AV_PIX_FMT_GBRP16LE, PixelFormat::RGBP16),
    (F::AV_PIX_FMT_GBRPF32BE, F::AV_PIX_FMT_GBRPF32LE, PixelFormat::RGBPF32),
    (F::AV_PIX_FMT_GBRAP10BE, F::AV_PIX_FMT_GBRAP10LE, PixelFormat::RGBAP10),
    (F::AV_PIX_FMT_GBRAP12BE, F::AV_PIX_FMT_GBRAP12LE, PixelFormat::RGBAP12),
    (F::AV_PIX_FMT_GBRAP16BE, F::AV_PIX_FMT_GBRAP16LE, PixelFormat::RGBAP16),
    (F::AV_PIX_FMT_GBRAPF32BE, F::AV_PIX_FMT_GBRAPF32LE, PixelFormat::RGBAPF32),
    // packed RGB
    (F::AV_PIX_FMT_RGB24, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_BGR24, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_0RGB, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_RGB0, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_0BGR, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_BGR0, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_RGB565LE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_RGB565BE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_BGR565LE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_BGR565BE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_RGB555LE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_RGB555BE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_BGR555LE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_BGR555BE, F::AV_PIX_FMT_GBRP, PixelFormat::RGBP8),
    (F::AV_PIX_FMT_RGBA, F::AV_PIX_FMT_GBRAP, PixelFormat::RGBAP8),
    (F::AV_PIX_FMT_BGRA, F::AV_PIX_FMT_GBRAP, PixelFormat::RGBAP8),
    (F::AV_PIX_FMT_ARGB, F::AV_PIX_FMT_GBRAP, PixelFormat::RGBAP8),
    (F::AV_PIX_FMT_ABGR, F::AV_PIX_FMT_GBRAP, PixelFormat::RGBAP8),
    (F::AV_PIX_FMT_RGB48LE, F::AV_PIX_FMT_GBRP16LE, PixelFormat::RGBP16),
    (F::AV_PIX_FMT_RGB48BE, F::AV_PIX_FMT_GBRP16LE, PixelFormat::RGBP16),
    (F::AV_PIX_FMT_BGR48LE, F::AV_PIX_FMT_GBRP16LE, PixelFormat::RGBP16),
    (F::AV_PIX_FMT_BGR48BE, F::AV_PIX_FMT_GBRP16LE, PixelFormat::RGBP16),
    (F::AV_PIX_FMT_RGBA64LE, F::AV_PIX_FMT_GBRAP16LE, PixelFormat::RGBAP16),
    (F::AV_PIX_FMT_RGBA64BE, F::AV_PIX_FMT_GBRAP16LE, PixelFormat::RGBAP16),
    (F::AV_PIX_FMT_BGRA64LE, F::AV_PIX_FMT_GBRAP16LE, PixelFormat::RGBAP16),
    (F::AV_PIX_FMT_BGRA64BE, F::AV_PIX_FMT_GBRAP16LE, PixelFormat::RGBAP16),
];

/**
    Look up the planar equivalent of a native pixel format.

    Returns `None` for formats with no canonical layout (palettized,
    bayer, hardware surfaces, packed gray with alpha, ...).
*/
pub fn planar_equivalent(native: Pixel) -> Option<PlanarEquivalent> {
    let native = F::from(native);
    TABLE
        .iter()
        .find(|(n, _, _)| *n == native)
        .map(|&(_, planar, format)| PlanarEquivalent {
            pixel: Pixel::from(planar),
            format,
        })
}

/**
    The native planar format sharing the layout of a canonical format.

    Used when a frame carries no native format tag, for example frames
    built from scratch rather than decoded.
*/
pub fn planar_pixel(format: PixelFormat) -> Option<Pixel> {
    TABLE
        .iter()
        .find(|(native, planar, f)| native == planar && *f == format)
        .map(|&(_, planar, _)| Pixel::from(planar))
}

/**
    Every supported native pixel format.
*/
pub(crate) fn native_formats() -> impl Iterator<Item = Pixel> {
    TABLE.iter().map(|&(native, _, _)| Pixel::from(native))
}

/**
    Recover a supported native format from the opaque tag recorded on a
    normalized frame.
*/
pub fn native_from_tag(tag: NativeFormat) -> Option<Pixel> {
    TABLE
        .iter()
        .find(|(native, _, _)| *native as i32 == tag.0)
        .map(|&(native, _, _)| Pixel::from(native))
}
