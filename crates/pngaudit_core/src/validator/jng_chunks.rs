//! JNG header and JPEG data chunks.

use super::ChunkChecker;
use super::fields::{be_u32, byte};
use crate::chunk::ChunkType;
use crate::context::JngHeader;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const MAX_DIMENSION: u32 = 0x7FFF_FFFF;

impl ChunkChecker<'_> {
    pub(super) fn check_jhdr(&mut self, data: &[u8]) {
        let jhdr = ChunkType::Jhdr;
        if self.ctx.is_mng() {
            self.open_embedded_image();
        }
        self.once(jhdr);
        if !self.expect_length(jhdr, data.len() == 16) {
            return;
        }

        let header = JngHeader {
            width: be_u32(data, 0),
            height: be_u32(data, 4),
            color_type: data[8],
            sample_depth: data[9],
            progressive: data[11] == 8,
            alpha_depth: data[12],
            alpha_compression: data[13],
        };
        let (compression, interlace) = (data[10], data[11]);
        let (alpha_filter, alpha_interlace) = (data[14], data[15]);
        let mut problems = Vec::new();

        if header.width == 0
            || header.height == 0
            || header.width > MAX_DIMENSION
            || header.height > MAX_DIMENSION
        {
            problems.push(format!(
                "invalid JHDR image dimensions ({}x{})",
                header.width, header.height
            ));
        }
        if header.color_class().is_none() {
            problems.push(format!("invalid JHDR color type ({})", header.color_type));
        }
        if !matches!(header.sample_depth, 8 | 12 | 20) {
            problems.push(format!("invalid JHDR sample depth ({})", header.sample_depth));
        }
        if compression != 8 {
            problems.push(format!("invalid JHDR compression method ({compression})"));
        }
        if !matches!(interlace, 0 | 8) {
            problems.push(format!("invalid JHDR interlace method ({interlace})"));
        }

        if header.has_alpha() {
            if !matches!(header.alpha_depth, 1 | 2 | 4 | 8 | 16) {
                problems.push(format!(
                    "invalid JHDR alpha sample depth ({})",
                    header.alpha_depth
                ));
            }
            if !matches!(header.alpha_compression, 0 | 8) {
                problems.push(format!(
                    "invalid JHDR alpha compression method ({})",
                    header.alpha_compression
                ));
            } else if header.alpha_compression == 8 && header.alpha_depth != 8 {
                problems.push(format!(
                    "JPEG-compressed alpha requires 8-bit alpha samples, not {}",
                    header.alpha_depth
                ));
            }
            if alpha_filter != 0 && !(self.ctx.is_mng() && alpha_filter == 64) {
                problems.push(format!("invalid JHDR alpha filter method ({alpha_filter})"));
            }
            if alpha_interlace != 0 {
                problems.push(format!(
                    "invalid JHDR alpha interlace method ({alpha_interlace})"
                ));
            }
        } else if header.alpha_depth != 0 {
            problems.push(format!(
                "invalid JHDR alpha sample depth ({}) for {} image",
                header.alpha_depth,
                header.color_name()
            ));
        }

        let valid = problems.is_empty();
        for message in problems {
            self.minor(message);
        }
        self.ctx.image.jng = Some(header);
        if !valid {
            self.stop_filter_cursor();
            return;
        }

        let mut text = format!(
            "{} x {} image, {}-bit {}, {}",
            header.width,
            header.height,
            header.sample_depth,
            header.color_name(),
            if header.progressive { "progressive" } else { "sequential" }
        );
        if header.has_alpha() {
            let method = if header.alpha_compression == 8 { "JPEG" } else { "PNG" };
            text.push_str(&format!(
                ", {}-bit alpha ({method}-compressed)",
                header.alpha_depth
            ));
        }
        self.detail(text);

        if header.has_alpha() && header.alpha_compression == 0 {
            self.start_filter_cursor(
                header.width,
                header.height,
                u32::from(header.alpha_depth),
                false,
            );
        } else {
            self.stop_filter_cursor();
        }
    }

    pub(super) fn check_jdat(&mut self, data: &[u8]) {
        let jdat = ChunkType::Jdat;
        self.must_follow(jdat, ChunkType::Jhdr);

        let seen = self.ctx.image.seen(jdat);
        let interleaved = matches!(
            self.ctx.last_chunk,
            Some(ChunkType::Jdat | ChunkType::Idat | ChunkType::Jdaa | ChunkType::Jsep)
        );
        if seen && !interleaved && !self.ctx.is_mng() {
            self.major("JDAT chunks must be consecutive");
        }
        if !seen {
            self.check_soi(data);
        }
        self.ctx.image.mark(jdat);
    }

    pub(super) fn check_jdaa(&mut self, data: &[u8]) {
        let jdaa = ChunkType::Jdaa;
        self.must_follow(jdaa, ChunkType::Jhdr);
        if let Some(header) = self.ctx.image.jng {
            if header.alpha_compression != 8 {
                self.minor("JDAA not allowed without JPEG alpha compression");
            }
        }
        if self.ctx.image.mark(jdaa) {
            self.check_soi(data);
        }
    }

    pub(super) fn check_jsep(&mut self, data: &[u8]) {
        let jsep = ChunkType::Jsep;
        self.once(jsep);
        if !self.expect_length(jsep, data.is_empty()) {
            return;
        }
        if let Some(header) = self.ctx.image.jng {
            if header.sample_depth != 20 {
                self.minor(format!(
                    "JSEP not allowed in {}-bit JNG",
                    header.sample_depth
                ));
            }
        }
        self.must_follow(jsep, ChunkType::Jdat);
    }

    /// A JPEG stream opens with the start-of-image marker.
    fn check_soi(&mut self, data: &[u8]) {
        if data.len() >= 2 && data[..2] != JPEG_SOI {
            self.minor(format!(
                "{} does not start with a JPEG SOI marker (found {:02x} {:02x})",
                self.current,
                byte(data, 0),
                byte(data, 1)
            ));
        }
    }
}
