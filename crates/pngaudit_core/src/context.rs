//! Per-stream validation state.
//!
//! A [`ValidationContext`] is created for each stream and dropped with it.
//! MNG streams carry many images; each embedded IHDR, JHDR, BASI or DHDR
//! starts a fresh [`ImageState`] so occurrence rules apply per image.

use crate::chunk::ChunkType;
use crate::types::StreamKind;
use std::collections::HashSet;

const COLOR_TYPE_NAMES: [&str; 7] = [
    "grayscale",
    "undefined type",
    "RGB",
    "colormap",
    "grayscale+alpha",
    "undefined type",
    "RGB+alpha",
];

#[must_use]
pub fn color_type_name(color_type: u8) -> &'static str {
    COLOR_TYPE_NAMES
        .get(usize::from(color_type))
        .copied()
        .unwrap_or("undefined type")
}

/// Channel layout shared by PNG and JNG headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    Gray,
    Rgb,
    Palette,
    GrayAlpha,
    RgbAlpha,
}

impl ColorClass {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gray => "grayscale",
            Self::Rgb => "RGB",
            Self::Palette => "colormap",
            Self::GrayAlpha => "grayscale+alpha",
            Self::RgbAlpha => "RGB+alpha",
        }
    }

    #[must_use]
    pub const fn channel_names(self) -> &'static [&'static str] {
        match self {
            Self::Gray => &["gray"],
            Self::Rgb | Self::Palette => &["red", "green", "blue"],
            Self::GrayAlpha => &["gray", "alpha"],
            Self::RgbAlpha => &["red", "green", "blue", "alpha"],
        }
    }
}

/// Decoded IHDR (or BASI) fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub interlaced: bool,
}

impl ImageHeader {
    #[must_use]
    pub fn color_class(&self) -> Option<ColorClass> {
        match self.color_type {
            0 => Some(ColorClass::Gray),
            2 => Some(ColorClass::Rgb),
            3 => Some(ColorClass::Palette),
            4 => Some(ColorClass::GrayAlpha),
            6 => Some(ColorClass::RgbAlpha),
            _ => None,
        }
    }

    #[must_use]
    pub fn channels(&self) -> u32 {
        match self.color_type {
            2 => 3,
            4 => 2,
            6 => 4,
            _ => 1,
        }
    }

    #[must_use]
    pub fn bits_per_pixel(&self) -> u32 {
        self.channels() * u32::from(self.bit_depth)
    }

    #[must_use]
    pub fn color_name(&self) -> &'static str {
        color_type_name(self.color_type)
    }

    /// Largest legal sBIT value.
    #[must_use]
    pub fn max_significant_bits(&self) -> u8 {
        if self.color_type == 3 { 8 } else { self.bit_depth }
    }
}

/// Decoded JHDR fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JngHeader {
    pub width: u32,
    pub height: u32,
    pub color_type: u8,
    pub sample_depth: u8,
    pub progressive: bool,
    pub alpha_depth: u8,
    pub alpha_compression: u8,
}

impl JngHeader {
    #[must_use]
    pub fn color_class(&self) -> Option<ColorClass> {
        match self.color_type {
            8 => Some(ColorClass::Gray),
            10 => Some(ColorClass::Rgb),
            12 => Some(ColorClass::GrayAlpha),
            14 => Some(ColorClass::RgbAlpha),
            _ => None,
        }
    }

    #[must_use]
    pub fn color_name(&self) -> &'static str {
        match self.color_type {
            8 => "grayscale",
            10 => "color",
            12 => "grayscale+alpha",
            14 => "color+alpha",
            _ => "undefined type",
        }
    }

    #[must_use]
    pub fn has_alpha(&self) -> bool {
        matches!(self.color_type, 12 | 14)
    }
}

/// Decoded MHDR fields. The short draft layout leaves the counts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MngHeader {
    pub frame_width: u32,
    pub frame_height: u32,
    pub ticks_per_second: u32,
    pub layer_count: u32,
    pub frame_count: u32,
    pub play_time: u32,
    pub simplicity_profile: u32,
}

/// Occurrence and ordering state for one image.
#[derive(Debug, Default)]
pub struct ImageState {
    pub header: Option<ImageHeader>,
    pub jng: Option<JngHeader>,
    /// Inside a DHDR delta image, which has no header of its own.
    pub delta: bool,
    pub palette_entries: u32,
    pub idat_bytes: u64,
    /// First bytes of the image data stream, until the zlib header is whole.
    pub zlib_prefix: Vec<u8>,
    pub zlib_checked: bool,
    pub splt_names: HashSet<Vec<u8>>,
    seen: HashSet<ChunkType>,
}

impl ImageState {
    #[must_use]
    pub fn seen(&self, chunk_type: ChunkType) -> bool {
        self.seen.contains(&chunk_type)
    }

    /// Records an occurrence. Returns true on the first one.
    pub fn mark(&mut self, chunk_type: ChunkType) -> bool {
        self.seen.insert(chunk_type)
    }

    #[must_use]
    pub fn color_class(&self) -> Option<ColorClass> {
        self.header
            .and_then(|h| h.color_class())
            .or_else(|| self.jng.and_then(|j| j.color_class()))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.header.is_some() || self.jng.is_some() || self.delta
    }
}

/// Everything accumulated while walking one stream.
#[derive(Debug)]
pub struct ValidationContext {
    pub kind: StreamKind,
    pub chunks: u32,
    pub terminated: bool,
    pub last_chunk: Option<ChunkType>,
    pub image: ImageState,
    pub mng: Option<MngHeader>,
    /// Images completed inside an MNG.
    pub mng_images: u32,
    pub loop_levels: Vec<u8>,
    /// Header of the last finished image, for the verdict line.
    pub last_header: Option<ImageHeader>,
    pub last_jng: Option<JngHeader>,
    /// Palette size of the last finished image, the parent of a delta image.
    pub last_palette_entries: u32,
}

impl ValidationContext {
    #[must_use]
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            chunks: 0,
            terminated: false,
            last_chunk: None,
            image: ImageState::default(),
            mng: None,
            mng_images: 0,
            loop_levels: Vec::new(),
            last_header: None,
            last_jng: None,
            last_palette_entries: 0,
        }
    }

    #[must_use]
    pub fn is_mng(&self) -> bool {
        self.kind == StreamKind::Mng
    }

    /// Starts a new embedded image inside an MNG.
    pub fn begin_image(&mut self) {
        self.image = ImageState::default();
    }

    /// Closes the current embedded image inside an MNG.
    pub fn end_image(&mut self) {
        let finished = std::mem::take(&mut self.image);
        if finished.is_open() {
            self.mng_images += 1;
        }
        self.last_header = finished.header.or(self.last_header);
        self.last_jng = finished.jng.or(self.last_jng);
        if finished.palette_entries > 0 {
            self.last_palette_entries = finished.palette_entries;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_per_pixel() {
        let header = ImageHeader {
            width: 1,
            height: 1,
            bit_depth: 16,
            color_type: 6,
            interlaced: false,
        };
        assert_eq!(header.bits_per_pixel(), 64);
        assert_eq!(header.color_name(), "RGB+alpha");
        assert_eq!(header.max_significant_bits(), 16);

        let palette = ImageHeader {
            bit_depth: 4,
            color_type: 3,
            ..header
        };
        assert_eq!(palette.bits_per_pixel(), 4);
        assert_eq!(palette.max_significant_bits(), 8);
    }

    #[test]
    fn test_color_type_names() {
        assert_eq!(color_type_name(0), "grayscale");
        assert_eq!(color_type_name(5), "undefined type");
        assert_eq!(color_type_name(200), "undefined type");
    }

    #[test]
    fn test_mark_reports_first_occurrence() {
        let mut state = ImageState::default();
        assert!(state.mark(ChunkType::Gama));
        assert!(!state.mark(ChunkType::Gama));
        assert!(state.seen(ChunkType::Gama));
        assert!(!state.seen(ChunkType::Chrm));
    }

    #[test]
    fn test_fresh_image_per_mng_segment() {
        let mut ctx = ValidationContext::new(StreamKind::Mng);
        ctx.image.header = Some(ImageHeader {
            width: 2,
            height: 2,
            bit_depth: 8,
            color_type: 0,
            interlaced: false,
        });
        ctx.image.mark(ChunkType::Idat);
        ctx.image.palette_entries = 16;
        ctx.end_image();
        assert_eq!(ctx.mng_images, 1);
        assert_eq!(ctx.last_palette_entries, 16);
        assert_eq!(ctx.image.palette_entries, 0);
        assert!(!ctx.image.seen(ChunkType::Idat));
        assert!(ctx.last_header.is_some());
    }
}
