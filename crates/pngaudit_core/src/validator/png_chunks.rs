//! Handlers for the chunks defined by PNG itself, minus the text chunks.

use super::ChunkChecker;
use super::fields::{be_i32, be_u16, be_u32, byte, month_name, parse_ascii_float, split_nul};
use crate::chunk::ChunkType;
use crate::context::{ColorClass, ImageHeader};
use crate::types::StreamKind;

const MAX_DIMENSION: u32 = 0x7FFF_FFFF;
const MIN_IDAT_BYTES: u64 = 10;
const MAX_PALETTE_BYTES: usize = 768;

const RENDERING_INTENTS: [&str; 4] = [
    "perceptual",
    "relative colorimetric",
    "saturation-preserving",
    "absolute colorimetric",
];

const PCAL_EQUATIONS: [(&str, u8); 4] = [
    ("linear", 2),
    ("base-e exponential", 3),
    ("arbitrary-base exponential", 3),
    ("hyperbolic", 4),
];

/// Entry count for length messages, fractional when the length is off.
pub(super) fn entry_count(len: usize, size: usize) -> String {
    if len % size == 0 {
        (len / size).to_string()
    } else {
        format!("{:.2}", len as f64 / size as f64)
    }
}

fn chromaticity(value: u32) -> f64 {
    f64::from(value) / 100_000.0
}

impl ChunkChecker<'_> {
    pub(super) fn check_ihdr(&mut self, data: &[u8]) {
        let ihdr = ChunkType::Ihdr;
        if self.ctx.kind == StreamKind::Jng {
            self.minor("IHDR not allowed in JNG");
            return;
        }
        if self.ctx.is_mng() {
            self.open_embedded_image();
        }
        self.once(ihdr);
        if !self.expect_length(ihdr, data.len() == 13) {
            return;
        }
        let header = ImageHeader {
            width: be_u32(data, 0),
            height: be_u32(data, 4),
            bit_depth: byte(data, 8),
            color_type: byte(data, 9),
            interlaced: byte(data, 12) == 1,
        };
        self.check_image_header(ihdr, header, byte(data, 10), byte(data, 11), byte(data, 12));
    }

    /// Field checks shared by IHDR and BASI. Records the header either way.
    pub(super) fn check_image_header(
        &mut self,
        chunk_type: ChunkType,
        header: ImageHeader,
        compression: u8,
        filter: u8,
        interlace: u8,
    ) {
        let (width, height, depth) = (header.width, header.height, header.bit_depth);
        let mut valid = true;

        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            self.minor(format!(
                "invalid {chunk_type} image dimensions ({width}x{height})"
            ));
            valid = false;
        }
        let depth_ok = match header.color_type {
            0 => Some(matches!(depth, 1 | 2 | 4 | 8 | 16)),
            3 => Some(matches!(depth, 1 | 2 | 4 | 8)),
            2 | 4 | 6 => Some(matches!(depth, 8 | 16)),
            _ => None,
        };
        match depth_ok {
            Some(true) => {}
            Some(false) => {
                self.minor(format!(
                    "invalid {chunk_type} bit depth ({depth}) for {} image",
                    header.color_name()
                ));
                valid = false;
            }
            None => {
                self.minor(format!(
                    "invalid {chunk_type} image type ({})",
                    header.color_type
                ));
                valid = false;
            }
        }
        if compression != 0 {
            self.minor(format!(
                "invalid {chunk_type} compression method ({compression})"
            ));
            valid = false;
        }
        if filter != 0 && !(self.ctx.is_mng() && filter == 64) {
            self.minor(format!("invalid {chunk_type} filter method ({filter})"));
            valid = false;
        }
        if interlace > 1 {
            self.minor(format!(
                "invalid {chunk_type} interlace method ({interlace})"
            ));
            valid = false;
        }

        self.ctx.image.header = Some(header);
        if valid {
            self.detail(format!(
                "{width} x {height} image, {}-bit {}, {}interlaced",
                header.bits_per_pixel(),
                header.color_name(),
                if header.interlaced { "" } else { "non-" }
            ));
            self.start_filter_cursor(width, height, header.bits_per_pixel(), header.interlaced);
        } else {
            self.stop_filter_cursor();
        }
    }

    pub(super) fn check_plte(&mut self, data: &[u8]) {
        let plte = ChunkType::Plte;
        if self.ctx.kind == StreamKind::Jng || self.ctx.image.jng.is_some() {
            self.minor("PLTE not allowed in JNG");
            return;
        }
        let mng = self.ctx.is_mng();
        self.once(plte);
        if !mng {
            self.must_precede(plte, ChunkType::Idat);
            self.must_precede(plte, ChunkType::Bkgd);
        }

        let len = data.len();
        let empty_in_mng = mng && len == 0;
        if !empty_in_mng && (len < 3 || len > MAX_PALETTE_BYTES || len % 3 != 0) {
            self.major(format!(
                "invalid number of PLTE entries ({})",
                entry_count(len, 3)
            ));
            return;
        }
        let entries = (len / 3) as u32;
        self.ctx.image.palette_entries = entries;

        if let Some(header) = self.ctx.image.header {
            match header.color_class() {
                Some(ColorClass::Gray | ColorClass::GrayAlpha) => {
                    self.minor(format!("PLTE not allowed in {} image", header.color_name()));
                }
                Some(ColorClass::Palette) => {
                    let limit = 1u32
                        .checked_shl(u32::from(header.bit_depth))
                        .unwrap_or(u32::MAX);
                    if entries > limit {
                        self.minor(format!(
                            "too many PLTE entries ({entries}) for {}-bit image",
                            header.bit_depth
                        ));
                    }
                }
                _ => {}
            }
        }

        self.palette_heading(plte, format!("{entries} palette entries"));
        if self.config.print_palette {
            for (i, rgb) in data.chunks_exact(3).enumerate() {
                let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
                self.listing(format!(
                    "{i:>5}: ({r:3},{g:3},{b:3}) = (0x{r:02x},0x{g:02x},0x{b:02x})"
                ));
            }
        }
    }

    pub(super) fn check_idat(&mut self, data: &[u8]) {
        let idat = ChunkType::Idat;
        let jng = self.ctx.image.jng;
        let contiguous = match self.ctx.last_chunk {
            Some(ChunkType::Idat) => true,
            Some(ChunkType::Jdat | ChunkType::Jsep) => jng.is_some(),
            _ => false,
        };

        if self.ctx.image.seen(idat) && !contiguous {
            if self.ctx.is_mng() {
                self.ctx.image.zlib_prefix.clear();
                self.ctx.image.zlib_checked = false;
            } else if jng.is_none() {
                self.major("IDAT chunks must be consecutive");
            }
        }

        if !self.ctx.image.seen(idat) {
            match jng {
                Some(header) if header.alpha_compression != 0 => {
                    self.minor("IDAT not allowed with JDAA alpha channel");
                }
                Some(header) if !header.has_alpha() => {
                    self.minor("IDAT not allowed in JNG image without alpha");
                }
                _ => {}
            }
            let needs_palette = self
                .ctx
                .image
                .header
                .is_some_and(|h| h.color_class() == Some(ColorClass::Palette));
            if needs_palette && !self.ctx.is_mng() && !self.ctx.image.seen(ChunkType::Plte) {
                self.minor("missing PLTE for colormap image");
            }
        }

        self.ctx.image.mark(idat);
        self.ctx.image.idat_bytes += data.len() as u64;
        self.check_zlib_header(data);
        self.feed_filter_cursor(data);
    }

    /// The first two bytes of an image data stream form its zlib header.
    fn check_zlib_header(&mut self, data: &[u8]) {
        if self.ctx.image.zlib_checked {
            return;
        }
        let prefix = &mut self.ctx.image.zlib_prefix;
        let missing = 2 - prefix.len();
        prefix.extend_from_slice(&data[..missing.min(data.len())]);
        if prefix.len() < 2 {
            return;
        }
        let (cmf, flg) = (prefix[0], prefix[1]);
        self.ctx.image.zlib_checked = true;

        if u16::from_be_bytes([cmf, flg]) % 31 != 0 {
            self.major("zlib: compression header fails checksum");
            return;
        }
        let method = cmf & 0x0F;
        if method != 8 {
            self.major(format!("zlib: non-deflate compression method ({method})"));
            return;
        }
        let window = 1u32 << ((cmf >> 4) + 8);
        let level = ["superfast", "fast", "default", "maximum"][usize::from(flg >> 6)];
        let window = if window >= 1024 {
            format!("{}K", window / 1024)
        } else {
            format!("{window}-byte")
        };
        self.detail(format!(
            "zlib: deflated, {window} window, {level} compression"
        ));
    }

    pub(super) fn check_iend(&mut self, data: &[u8]) {
        let iend = ChunkType::Iend;
        self.once(iend);
        self.expect_length(iend, data.is_empty());

        if self.ctx.image.jng.is_some() {
            if !self.ctx.image.seen(ChunkType::Jdat) {
                self.minor("no JDAT chunks");
            }
        } else if self.ctx.image.header.is_some() {
            if !self.ctx.image.seen(ChunkType::Idat) {
                if !self.ctx.is_mng() {
                    self.minor("no IDAT chunks");
                }
            } else if self.ctx.image.idat_bytes < MIN_IDAT_BYTES {
                self.note("not enough IDAT data");
            }
        }

        self.stop_filter_cursor();
        if self.ctx.is_mng() {
            self.ctx.end_image();
        } else {
            self.ctx.terminated = true;
        }
    }

    pub(super) fn check_bkgd(&mut self, data: &[u8]) {
        let bkgd = ChunkType::Bkgd;
        self.once(bkgd);
        self.before_image_data(bkgd);
        let Some(class) = self.ctx.image.color_class() else {
            return;
        };
        match class {
            ColorClass::Gray | ColorClass::GrayAlpha => {
                if self.expect_length(bkgd, data.len() == 2) {
                    self.detail(format!("gray = {}", be_u16(data, 0)));
                }
            }
            ColorClass::Rgb | ColorClass::RgbAlpha => {
                if self.expect_length(bkgd, data.len() == 6) {
                    self.detail(format!(
                        "red = {} green = {} blue = {}",
                        be_u16(data, 0),
                        be_u16(data, 2),
                        be_u16(data, 4)
                    ));
                }
            }
            ColorClass::Palette => {
                if !self.ctx.is_mng() {
                    self.must_follow(bkgd, ChunkType::Plte);
                }
                if !self.expect_length(bkgd, data.len() == 1) {
                    return;
                }
                let index = data[0];
                let entries = self.ctx.image.palette_entries;
                if entries > 0 && u32::from(index) >= entries {
                    self.minor(format!(
                        "bKGD index ({index}) falls outside PLTE ({entries})"
                    ));
                }
                self.detail(format!("index = {index}"));
            }
        }
    }

    pub(super) fn check_chrm(&mut self, data: &[u8]) {
        let chrm = ChunkType::Chrm;
        self.once(chrm);
        if !self.ctx.is_mng() {
            self.must_precede(chrm, ChunkType::Plte);
        }
        self.before_image_data(chrm);
        if !self.expect_length(chrm, data.len() == 32) {
            return;
        }

        let points = ["white point", "red", "green", "blue"];
        let mut values = [0f64; 8];
        for (i, label) in points.iter().enumerate() {
            let x = be_u32(data, i * 8);
            let y = be_u32(data, i * 8 + 4);
            if x > 80_000 || y > 80_000 || u64::from(x) + u64::from(y) > 100_000 {
                self.minor(format!(
                    "invalid cHRM {label} {} {}",
                    chromaticity(x),
                    chromaticity(y)
                ));
                return;
            }
            values[i * 2] = chromaticity(x);
            values[i * 2 + 1] = chromaticity(y);
        }
        let [wx, wy, rx, ry, gx, gy, bx, by] = values;
        self.detail(format!("White x = {wx} y = {wy},  Red x = {rx} y = {ry}"));
        self.detail(format!("Green x = {gx} y = {gy},  Blue x = {bx} y = {by}"));
    }

    pub(super) fn check_gama(&mut self, data: &[u8]) {
        let gama = ChunkType::Gama;
        self.once(gama);
        if !self.ctx.is_mng() {
            self.must_precede(gama, ChunkType::Plte);
        }
        self.before_image_data(gama);
        if !self.expect_length(gama, data.len() == 4) {
            return;
        }
        let value = be_u32(data, 0);
        if value == 0 {
            self.minor("invalid gAMA value (0)");
            return;
        }
        self.detail(format!("{:.5}", f64::from(value) / 100_000.0));
    }

    pub(super) fn check_hist(&mut self, data: &[u8]) {
        let hist = ChunkType::Hist;
        if self.ctx.image.jng.is_some() {
            self.minor("hIST not allowed in JNG");
            return;
        }
        self.once(hist);
        self.must_follow(hist, ChunkType::Plte);
        self.must_precede(hist, ChunkType::Idat);

        let entries = self.ctx.image.palette_entries as usize;
        if data.len() != entries * 2 {
            self.major(format!(
                "invalid number of hIST entries ({})",
                entry_count(data.len(), 2)
            ));
            return;
        }
        self.palette_heading(hist, format!("{entries} histogram entries"));
        if self.config.print_palette {
            for (i, pair) in data.chunks_exact(2).enumerate() {
                let count = u16::from_be_bytes([pair[0], pair[1]]);
                self.listing(format!("{i:>5}: {count:5}"));
            }
        }
    }

    pub(super) fn check_iccp(&mut self, data: &[u8]) {
        let iccp = ChunkType::Iccp;
        self.once(iccp);
        if !self.ctx.is_mng() {
            self.must_precede(iccp, ChunkType::Plte);
        }
        self.before_image_data(iccp);
        if self.ctx.image.seen(ChunkType::Srgb) {
            self.minor("iCCP not allowed with sRGB");
        }

        let Some((name, rest)) = split_nul(data) else {
            self.major("missing NUL after iCCP profile name");
            return;
        };
        if !self.check_keyword(iccp, name, "profile name") {
            return;
        }
        if !self.expect_length(iccp, !rest.is_empty()) {
            return;
        }
        let method = rest[0];
        if method != 0 {
            self.minor(format!("invalid iCCP compression method ({method})"));
            return;
        }
        let name = self.printable(name);
        self.detail(format!(
            "profile name = {name}, compression method = deflate, compressed profile = {} bytes",
            rest.len() - 1
        ));
    }

    pub(super) fn check_offs(&mut self, data: &[u8]) {
        let offs = ChunkType::Offs;
        self.once(offs);
        self.before_image_data(offs);
        if !self.expect_length(offs, data.len() == 9) {
            return;
        }
        let unit = data[8];
        let unit_name = match unit {
            0 => "pixels",
            1 => "micrometers",
            _ => {
                self.minor(format!("invalid oFFs unit specifier ({unit})"));
                return;
            }
        };
        self.detail(format!(
            "{}x{} {unit_name} offset",
            be_i32(data, 0),
            be_i32(data, 4)
        ));
    }

    pub(super) fn check_pcal(&mut self, data: &[u8]) {
        let pcal = ChunkType::Pcal;
        self.once(pcal);
        self.before_image_data(pcal);

        let Some((name, rest)) = split_nul(data) else {
            self.major("missing NUL after pCAL calibration name");
            return;
        };
        if !self.check_keyword(pcal, name, "calibration name") {
            return;
        }
        if !self.expect_length(pcal, rest.len() >= 10) {
            return;
        }
        let (x0, x1) = (be_i32(rest, 0), be_i32(rest, 4));
        let (equation, count) = (rest[8], rest[9]);
        if x0 == x1 {
            self.minor(format!("invalid pCAL range (X0 = X1 = {x0})"));
        }
        let Some(&(equation_name, expected)) = PCAL_EQUATIONS.get(usize::from(equation)) else {
            self.minor(format!("invalid pCAL equation type ({equation})"));
            return;
        };
        if count != expected {
            self.minor(format!(
                "incorrect number of pCAL parameters ({count}) for equation type {equation}"
            ));
            return;
        }

        let Some((unit, params)) = split_nul(&rest[10..]) else {
            self.major("missing NUL after pCAL unit name");
            return;
        };
        let params: Vec<&[u8]> = params.split(|&b| b == 0).collect();
        if params.len() != usize::from(count) {
            self.major(format!(
                "pCAL holds {} parameters, expected {count}",
                params.len()
            ));
            return;
        }
        if let Some(i) = params.iter().position(|p| parse_ascii_float(p).is_none()) {
            let shown = self.printable(params[i]);
            self.minor(format!("invalid pCAL parameter {i} ({shown})"));
            return;
        }
        let (name, unit) = (self.printable(name), self.printable(unit));
        self.detail(format!(
            "{name}: {x0} to {x1}, {equation_name} equation, unit \"{unit}\", {count} parameters"
        ));
    }

    pub(super) fn check_phys(&mut self, data: &[u8]) {
        let phys = ChunkType::Phys;
        self.once(phys);
        self.before_image_data(phys);
        if !self.expect_length(phys, data.len() == 9) {
            return;
        }
        let (x, y, unit) = (be_u32(data, 0), be_u32(data, 4), data[8]);
        match unit {
            0 => self.detail(format!("{x}x{y} pixels/unit")),
            1 => {
                let mut text = format!("{x}x{y} pixels/meter");
                if x == y {
                    let dpi = (f64::from(x) * 0.0254 + 0.5) as u32;
                    text.push_str(&format!(" ({dpi} dpi)"));
                }
                self.detail(text);
            }
            _ => self.minor(format!("invalid pHYs unit specifier ({unit})")),
        }
    }

    pub(super) fn check_sbit(&mut self, data: &[u8]) {
        let sbit = ChunkType::Sbit;
        self.once(sbit);
        if !self.ctx.is_mng() {
            self.must_precede(sbit, ChunkType::Plte);
        }
        self.before_image_data(sbit);

        let Some(class) = self.ctx.image.color_class() else {
            return;
        };
        let max_bits = match (self.ctx.image.header, self.ctx.image.jng) {
            (Some(header), _) => header.max_significant_bits(),
            (None, Some(jng)) if jng.sample_depth == 20 => 12,
            (None, Some(jng)) => jng.sample_depth,
            (None, None) => return,
        };
        let channels = class.channel_names();
        if !self.expect_length(sbit, data.len() == channels.len()) {
            return;
        }
        for (&bits, channel) in data.iter().zip(channels) {
            if bits == 0 || bits > max_bits {
                self.minor(format!(
                    "{bits} sBIT {channel} bits not valid for {max_bits}-bit/sample image"
                ));
                return;
            }
        }
        let listed: Vec<String> = data
            .iter()
            .zip(channels)
            .map(|(bits, channel)| format!("{channel} = {bits}"))
            .collect();
        self.detail(listed.join(" "));
    }

    pub(super) fn check_scal(&mut self, data: &[u8]) {
        let scal = ChunkType::Scal;
        self.once(scal);
        self.before_image_data(scal);

        let unit = byte(data, 0);
        let Some((width, height)) = data.get(1..).and_then(split_nul) else {
            self.major("missing NUL after sCAL width");
            return;
        };
        if !self.expect_length(scal, !width.is_empty() && !height.is_empty()) {
            return;
        }
        let unit_name = match unit {
            1 => "meters",
            2 => "radians",
            _ => {
                self.minor(format!("invalid sCAL unit specifier ({unit})"));
                return;
            }
        };
        for (label, value) in [("width", width), ("height", height)] {
            if !parse_ascii_float(value).is_some_and(|v| v > 0.0) {
                let shown = self.printable(value);
                self.minor(format!("invalid sCAL {label} ({shown})"));
                return;
            }
        }
        let (width, height) = (self.printable(width), self.printable(height));
        self.detail(format!("image size {width} x {height} {unit_name}"));
    }

    pub(super) fn check_splt(&mut self, data: &[u8]) {
        let splt = ChunkType::Splt;
        self.ctx.image.mark(splt);
        self.before_image_data(splt);

        let Some((name, rest)) = split_nul(data) else {
            self.major("missing NUL after sPLT palette name");
            return;
        };
        if !self.check_keyword(splt, name, "palette name") {
            return;
        }
        if !self.ctx.image.splt_names.insert(name.to_vec()) {
            let shown = self.printable(name);
            self.minor(format!("duplicate sPLT palette name ({shown})"));
        }
        if !self.expect_length(splt, !rest.is_empty()) {
            return;
        }
        let depth = rest[0];
        let entry_size = match depth {
            8 => 6,
            16 => 10,
            _ => {
                self.major(format!("invalid sPLT sample depth ({depth} bits)"));
                return;
            }
        };
        let entries = &rest[1..];
        if entries.len() % entry_size != 0 {
            self.major(format!(
                "invalid number of sPLT entries ({})",
                entry_count(entries.len(), entry_size)
            ));
            return;
        }

        let count = entries.len() / entry_size;
        let shown = self.printable(name);
        self.palette_heading(splt, format!("{count} palette/histogram entries"));
        self.detail(format!("sample depth = {depth} bits, palette name = {shown}"));
        if !self.config.print_palette {
            return;
        }
        for (i, entry) in entries.chunks_exact(entry_size).enumerate() {
            let line = if depth == 8 {
                let (r, g, b, a) = (entry[0], entry[1], entry[2], entry[3]);
                format!(
                    "{i:>5}: ({r:3},{g:3},{b:3},{a:3}) = (0x{r:02x},0x{g:02x},0x{b:02x},0x{a:02x})  freq = {}",
                    be_u16(entry, 4)
                )
            } else {
                let [r, g, b, a] = [0, 2, 4, 6].map(|at| be_u16(entry, at));
                format!(
                    "{i:>5}: ({r:5},{g:5},{b:5},{a:5}) = ({r:04x},{g:04x},{b:04x},{a:04x})  freq = {}",
                    be_u16(entry, 8)
                )
            };
            self.listing(line);
        }
    }

    pub(super) fn check_srgb(&mut self, data: &[u8]) {
        let srgb = ChunkType::Srgb;
        self.once(srgb);
        if !self.ctx.is_mng() {
            self.must_precede(srgb, ChunkType::Plte);
        }
        self.before_image_data(srgb);
        if self.ctx.image.seen(ChunkType::Iccp) {
            self.minor("sRGB not allowed with iCCP");
        }
        if !self.expect_length(srgb, data.len() == 1) {
            return;
        }
        match RENDERING_INTENTS.get(usize::from(data[0])) {
            Some(intent) => self.detail(format!("rendering intent = {intent}")),
            None => self.minor(format!("invalid sRGB rendering intent ({})", data[0])),
        }
    }

    pub(super) fn check_ster(&mut self, data: &[u8]) {
        let ster = ChunkType::Ster;
        self.once(ster);
        self.before_image_data(ster);
        if !self.expect_length(ster, data.len() == 1) {
            return;
        }
        match data[0] {
            0 => self.detail("cross-fuse layout"),
            1 => self.detail("diverging-fuse layout"),
            mode => self.minor(format!("invalid sTER layout mode ({mode})")),
        }
    }

    pub(super) fn check_time(&mut self, data: &[u8]) {
        let time = ChunkType::Time;
        self.once(time);
        if !self.expect_length(time, data.len() == 7) {
            return;
        }
        let year = be_u16(data, 0);
        let [month, day, hour, minute, second] = [2, 3, 4, 5, 6].map(|at| data[at]);
        let bad = if !(1..=12).contains(&month) {
            Some(("month", month))
        } else if !(1..=31).contains(&day) {
            Some(("day", day))
        } else if hour > 23 {
            Some(("hour", hour))
        } else if minute > 59 {
            Some(("minute", minute))
        } else if second > 60 {
            Some(("second", second))
        } else {
            None
        };
        if let Some((field, value)) = bad {
            self.minor(format!("invalid tIME {field} ({value})"));
            return;
        }
        self.detail(format!(
            "{day} {} {year} {hour:02}:{minute:02}:{second:02} UTC",
            month_name(month)
        ));
    }

    pub(super) fn check_trns(&mut self, data: &[u8]) {
        let trns = ChunkType::Trns;
        if self.ctx.image.jng.is_some() {
            self.minor("tRNS not allowed in JNG");
            return;
        }
        self.once(trns);
        self.before_image_data(trns);

        let Some(header) = self.ctx.image.header else {
            return;
        };
        let Some(class) = header.color_class() else {
            return;
        };
        let color_name = header.color_name();
        match class {
            ColorClass::Gray => {
                if data.len() != 2 {
                    self.major(format!("invalid tRNS length for {color_name} image"));
                } else {
                    self.detail(format!("gray = {}", be_u16(data, 0)));
                }
            }
            ColorClass::Rgb => {
                if data.len() != 6 {
                    self.major(format!("invalid tRNS length for {color_name} image"));
                } else {
                    self.detail(format!(
                        "red = {} green = {} blue = {}",
                        be_u16(data, 0),
                        be_u16(data, 2),
                        be_u16(data, 4)
                    ));
                }
            }
            ColorClass::Palette => {
                if !self.ctx.is_mng() {
                    self.must_follow(trns, ChunkType::Plte);
                }
                let entries = self.ctx.image.palette_entries as usize;
                if data.is_empty() || (entries > 0 && data.len() > entries) {
                    self.major(format!("invalid tRNS length for {color_name} image"));
                    return;
                }
                self.palette_heading(trns, format!("{} transparency entries", data.len()));
                if self.config.print_palette {
                    for (i, &alpha) in data.iter().enumerate() {
                        self.listing(format!("{i:>5}: {alpha:3} = 0x{alpha:02x}"));
                    }
                }
            }
            ColorClass::GrayAlpha | ColorClass::RgbAlpha => {
                self.minor(format!("tRNS not allowed in {color_name} image"));
            }
        }
    }

    pub(super) fn check_gifg(&mut self, data: &[u8]) {
        if !self.expect_length(ChunkType::Gifg, data.len() == 4) {
            return;
        }
        self.detail(format!(
            "disposal method = {}, user input flag = {}, display time = {} hundredths of a second",
            data[0],
            data[1],
            be_u16(data, 2)
        ));
    }

    pub(super) fn check_gifx(&mut self, data: &[u8]) {
        if !self.expect_length(ChunkType::Gifx, data.len() >= 11) {
            return;
        }
        let application = self.printable(&data[..8]);
        self.detail(format!(
            "application ID = {application}, authentication code = 0x{:02x}{:02x}{:02x}, {} bytes of data",
            data[8],
            data[9],
            data[10],
            data.len() - 11
        ));
    }

    /// Heading for palette-style listings: a detail line when verbose,
    /// otherwise a listing line when palettes are being printed.
    fn palette_heading(&mut self, chunk_type: ChunkType, text: String) {
        if self.config.verbose() {
            self.detail(text);
        } else if self.config.print_palette && !self.config.quiet {
            self.listing(format!("{chunk_type} chunk: {text}"));
        }
    }
}
