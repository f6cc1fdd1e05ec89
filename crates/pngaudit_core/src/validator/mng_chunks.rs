//! MNG control chunks.
//!
//! Most layouts are MNG 1.0. SAVE index entries of type 0 still use the
//! draft layout: two offsets, then a 4-byte nominal start time.

use super::ChunkChecker;
use super::fields::{be_i32, be_u16, be_u32, byte, split_nul};
use crate::chunk::ChunkType;
use crate::context::{ImageHeader, MngHeader};

const FRAMING_MODES: [&str; 5] = [
    "no change in framing mode",
    "no background layer; interframe delay before each image",
    "no background layer; interframe delay before each FRAM",
    "background layer and interframe delay before each image",
    "background layer and interframe delay after each FRAM",
];
const DELTA_TYPES: [&str; 8] = [
    "full image replacement",
    "block pixel addition",
    "block alpha addition",
    "block color addition",
    "block pixel replacement",
    "block alpha replacement",
    "block color replacement",
    "no change",
];
const DHDR_IMAGE_TYPES: [&str; 3] = ["unspecified", "PNG", "JNG"];
const SAVE_ENTRY_TYPES: [&str; 4] = [
    "segment with nominal start time",
    "segment",
    "subframe",
    "exported image",
];
const VISIBILITY: [&str; 2] = ["visible", "not visible"];
const CONCRETENESS: [&str; 2] = ["abstract", "concrete"];
const CLONE_TYPES: [&str; 3] = ["full", "partial", "renumber"];
const POSITION_TYPES: [&str; 2] = ["absolute", "relative"];
const SHOW_MODES: [&str; 8] = [
    "make objects potentially visible and display",
    "make objects invisible",
    "display potentially visible objects",
    "make objects potentially visible",
    "toggle potentially visible flag and display",
    "toggle potentially visible flag",
    "make objects potentially visible and display in cycle",
    "make objects potentially visible and display one at a time",
];
const TERMINATIONS: [&str; 4] = [
    "deterministic",
    "decoder discretion",
    "user discretion",
    "external signal",
];
const TERM_ACTIONS: [&str; 4] = [
    "show last frame",
    "cease displaying",
    "show first frame",
    "repeat sequence",
];
const AFTER_REPEAT_ACTIONS: [&str; 3] =
    ["show last frame", "cease displaying", "show first frame"];
const PPLT_DELTA_TYPES: [(&str, usize); 6] = [
    ("replacement RGB samples", 3),
    ("delta RGB samples", 3),
    ("replacement alpha samples", 1),
    ("delta alpha samples", 1),
    ("replacement RGBA samples", 4),
    ("delta RGBA samples", 4),
];

fn counted(count: u32, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

fn or_unspecified(value: u32) -> String {
    if value == 0 {
        "unspecified".to_string()
    } else {
        value.to_string()
    }
}

impl ChunkChecker<'_> {
    /// Inside an MNG each header chunk opens a new embedded image.
    pub(super) fn open_embedded_image(&mut self) {
        if self.ctx.image.is_open() {
            self.ctx.end_image();
        } else {
            self.ctx.begin_image();
        }
    }

    /// Looks up an enumerated field, reporting values outside the table.
    fn enumerated(
        &mut self,
        chunk_type: ChunkType,
        label: &str,
        value: u8,
        names: &[&'static str],
    ) -> Option<&'static str> {
        let name = names.get(usize::from(value)).copied();
        if name.is_none() {
            self.minor(format!("invalid {chunk_type} {label} ({value})"));
        }
        name
    }

    pub(super) fn check_mhdr(&mut self, data: &[u8]) {
        let mhdr = ChunkType::Mhdr;
        if self.ctx.mng.is_some() {
            self.minor("multiple MHDR not allowed");
        }
        if !self.expect_length(mhdr, data.len() == 28 || data.len() == 12) {
            return;
        }
        let field = |i: usize| be_u32(data, i * 4);
        let header = MngHeader {
            frame_width: field(0),
            frame_height: field(1),
            ticks_per_second: field(2),
            layer_count: field(3),
            frame_count: field(4),
            play_time: field(5),
            simplicity_profile: field(6),
        };
        self.ctx.mng = Some(header);

        let profile = header.simplicity_profile;
        if profile & 1 == 0 && profile != 0 {
            self.minor(format!(
                "invalid MHDR simplicity profile (0x{profile:08x}): features listed without bit 0"
            ));
        } else if profile & 0x8000_0000 != 0 {
            self.minor(format!(
                "invalid MHDR simplicity profile (0x{profile:08x}): bit 31 set"
            ));
        }

        let ticks = match header.ticks_per_second {
            0 => "single frame".to_string(),
            tps => format!("{} per second", counted(tps, "tick", "ticks")),
        };
        self.detail(format!(
            "{} x {} frame size, {ticks}",
            header.frame_width, header.frame_height
        ));
        if data.len() == 28 {
            self.detail(format!(
                "layer count = {}, frame count = {}, play time = {}",
                or_unspecified(header.layer_count),
                or_unspecified(header.frame_count),
                or_unspecified(header.play_time)
            ));
            self.detail(format!("simplicity profile = 0x{profile:08x}"));
        }
    }

    pub(super) fn check_mend(&mut self, data: &[u8]) {
        self.expect_length(ChunkType::Mend, data.is_empty());
        if self.ctx.image.is_open() {
            self.minor("MEND inside an embedded image (missing IEND)");
            self.ctx.end_image();
        }
        self.ctx.terminated = true;
    }

    pub(super) fn check_dhdr(&mut self, data: &[u8]) {
        let dhdr = ChunkType::Dhdr;
        self.open_embedded_image();
        self.ctx.image.delta = true;
        if !self.expect_length(dhdr, matches!(data.len(), 4 | 12 | 20)) {
            return;
        }
        let object = be_u16(data, 0);
        let Some(image_type) = self.enumerated(dhdr, "image type", data[2], &DHDR_IMAGE_TYPES)
        else {
            return;
        };
        let delta = data[3];
        let Some(delta_name) = self.enumerated(dhdr, "delta type", delta, &DELTA_TYPES) else {
            return;
        };
        if (delta == 7 && data.len() > 4) || (delta == 0 && data.len() > 12) {
            self.minor(format!("invalid DHDR length for delta type {delta}"));
            return;
        }
        self.detail(format!(
            "object ID = {object}, image type = {image_type}, delta type = {delta_name}"
        ));
        if data.len() > 4 {
            self.detail(format!(
                "block width = {}, block height = {}",
                be_u32(data, 4),
                be_u32(data, 8)
            ));
        }
        if data.len() > 12 {
            self.detail(format!(
                "x offset = {}, y offset = {}",
                be_u32(data, 12),
                be_u32(data, 16)
            ));
        }
    }

    pub(super) fn check_fram(&mut self, data: &[u8]) {
        let fram = ChunkType::Fram;
        if data.is_empty() {
            self.detail("empty");
            return;
        }
        let Some(mode) = self.enumerated(fram, "framing mode", data[0], &FRAMING_MODES) else {
            return;
        };
        self.detail(mode);
        let rest = &data[1..];
        if rest.is_empty() {
            return;
        }
        let (name, mut fields) = split_nul(rest).unwrap_or((rest, &[][..]));
        if !name.is_empty() {
            let shown = self.printable(name);
            self.detail(format!("frame name = {shown}"));
        }
        if fields.is_empty() {
            return;
        }
        if !self.expect_length(fram, fields.len() >= 4) {
            return;
        }
        let (delay, timeout, clipping, sync) = (fields[0], fields[1], fields[2], fields[3]);
        if delay > 2 || timeout > 8 || clipping > 2 || sync > 2 {
            self.minor("invalid FRAM change flags");
            return;
        }
        fields = &fields[4..];

        let needed = 4 * usize::from(delay != 0)
            + 4 * usize::from(timeout != 0)
            + 17 * usize::from(clipping != 0);
        let sync_bytes = fields.len().saturating_sub(needed);
        if fields.len() < needed || (sync != 0 && sync_bytes % 4 != 0) || (sync == 0 && sync_bytes != 0) {
            self.major("invalid FRAM length");
            return;
        }
        if delay != 0 {
            let ticks = be_u32(fields, 0);
            self.detail(format!("new delay = {}", counted(ticks, "tick", "ticks")));
            fields = &fields[4..];
        }
        if timeout != 0 {
            let ticks = be_u32(fields, 0);
            if ticks == 0x7FFF_FFFF {
                self.detail("new timeout = infinite");
            } else {
                self.detail(format!("new timeout = {}", counted(ticks, "tick", "ticks")));
            }
            fields = &fields[4..];
        }
        if clipping != 0 {
            let kind = if fields[0] != 0 { "relative" } else { "absolute" };
            self.detail(format!(
                "new {kind} frame clipping: left = {}, right = {}, top = {}, bottom = {}",
                be_i32(fields, 1),
                be_i32(fields, 5),
                be_i32(fields, 9),
                be_i32(fields, 13)
            ));
            fields = &fields[17..];
        }
        if sync != 0 {
            let ids: Vec<String> = fields
                .chunks_exact(4)
                .map(|id| be_u32(id, 0).to_string())
                .collect();
            if ids.is_empty() {
                self.detail("sync ID list: [empty]");
            } else {
                self.detail(format!("sync ID list: {}", ids.join(", ")));
            }
        }
    }

    pub(super) fn check_save(&mut self, data: &[u8]) {
        let save = ChunkType::Save;
        if data.is_empty() {
            self.detail("empty");
            return;
        }
        let offset_size = usize::from(data[0]);
        if offset_size != 4 && offset_size != 8 {
            self.minor(format!("invalid SAVE offset size ({offset_size} bytes)"));
            return;
        }
        self.detail(format!("offset size = {offset_size} bytes"));

        let mut rest = &data[1..];
        let mut entries = 0u32;
        while !rest.is_empty() {
            let entry_type = rest[0];
            let Some(type_name) = self.enumerated(save, "entry type", entry_type, &SAVE_ENTRY_TYPES)
            else {
                return;
            };
            let fixed = match entry_type {
                0 => 1 + 2 * offset_size + 4,
                1 => 1 + offset_size,
                _ => 1,
            };
            if rest.len() < fixed {
                self.major("invalid SAVE length");
                return;
            }
            rest = &rest[fixed..];
            let (name, remaining) = split_nul(rest).unwrap_or((rest, &[][..]));
            rest = remaining;
            entries += 1;
            let shown = self.printable(name);
            self.detail(format!("entry type = {type_name}, name = {shown}"));
        }
        self.detail(format!("{} listed", counted(entries, "entry", "entries")));
    }

    pub(super) fn check_seek(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        if self.check_keyword(ChunkType::Seek, data, "segment name") {
            let shown = self.printable(data);
            self.detail(format!("segment name = {shown}"));
        }
    }

    pub(super) fn check_need(&mut self, data: &[u8]) {
        let need = ChunkType::Need;
        if !self.expect_length(need, !data.is_empty()) {
            return;
        }
        let mut shown = Vec::new();
        for keyword in data.split(|&b| b == 0) {
            if !self.check_keyword(need, keyword, "keyword") {
                return;
            }
            shown.push(self.printable(keyword));
        }
        self.detail(shown.join("; "));
    }

    pub(super) fn check_defi(&mut self, data: &[u8]) {
        let defi = ChunkType::Defi;
        if !self.expect_length(defi, matches!(data.len(), 2 | 3 | 4 | 12 | 28)) {
            return;
        }
        let object = be_u16(data, 0);
        let Some(visibility) = self.enumerated(defi, "do_not_show flag", byte(data, 2), &VISIBILITY)
        else {
            return;
        };
        let Some(concrete) = self.enumerated(defi, "concrete flag", byte(data, 3), &CONCRETENESS)
        else {
            return;
        };
        self.detail(format!(
            "object ID = {object}, {visibility}, {concrete}, x = {}, y = {}",
            be_i32(data, 4),
            be_i32(data, 8)
        ));
        if data.len() == 28 {
            self.detail(format!(
                "clipping: left = {}, right = {}, top = {}, bottom = {}",
                be_i32(data, 12),
                be_i32(data, 16),
                be_i32(data, 20),
                be_i32(data, 24)
            ));
        }
    }

    pub(super) fn check_back(&mut self, data: &[u8]) {
        let back = ChunkType::Back;
        if !self.expect_length(back, matches!(data.len(), 6 | 7 | 9 | 10)) {
            return;
        }
        let mandatory = byte(data, 6);
        if mandatory > 1 {
            self.minor(format!("invalid BACK mandatory flag ({mandatory})"));
            return;
        }
        let tile = byte(data, 9);
        if tile > 1 {
            self.minor(format!("invalid BACK tiling flag ({tile})"));
            return;
        }
        self.detail(format!(
            "red = {}, green = {}, blue = {} ({})",
            be_u16(data, 0),
            be_u16(data, 2),
            be_u16(data, 4),
            if mandatory == 1 { "mandatory" } else { "advisory" }
        ));
        if data.len() >= 9 {
            self.detail(format!(
                "background image ID = {}, {}",
                be_u16(data, 7),
                if tile == 1 { "tiled" } else { "not tiled" }
            ));
        }
    }

    pub(super) fn check_move(&mut self, data: &[u8]) {
        let mv = ChunkType::Move;
        if !self.expect_length(mv, data.len() == 13) {
            return;
        }
        let Some(kind) = self.enumerated(mv, "position type", data[4], &POSITION_TYPES) else {
            return;
        };
        self.detail(format!(
            "first object ID = {}, last object ID = {}, {kind} position: x = {}, y = {}",
            be_u16(data, 0),
            be_u16(data, 2),
            be_i32(data, 5),
            be_i32(data, 9)
        ));
    }

    pub(super) fn check_clon(&mut self, data: &[u8]) {
        let clon = ChunkType::Clon;
        if !self.expect_length(clon, matches!(data.len(), 4 | 5 | 6 | 7 | 16)) {
            return;
        }
        let clone_type = if data.len() > 4 { data[4] } else { 0 };
        let Some(clone_name) = self.enumerated(clon, "clone type", clone_type, &CLONE_TYPES) else {
            return;
        };
        if data.len() > 5 && data[5] > 1 {
            self.minor(format!("invalid CLON do_not_show flag ({})", data[5]));
            return;
        }
        if data.len() > 6 && data[6] > 1 {
            self.minor(format!("invalid CLON concreteness flag ({})", data[6]));
            return;
        }
        let position = if data.len() > 7 { data[7] } else { 1 };
        let Some(position_name) =
            self.enumerated(clon, "location delta type", position, &POSITION_TYPES)
        else {
            return;
        };
        self.detail(format!(
            "parent object ID = {}, clone object ID = {}, {clone_name} clone",
            be_u16(data, 0),
            be_u16(data, 2)
        ));
        if data.len() == 16 {
            self.detail(format!(
                "{position_name} position: x = {}, y = {}",
                be_i32(data, 8),
                be_i32(data, 12)
            ));
        }
    }

    pub(super) fn check_show(&mut self, data: &[u8]) {
        let show = ChunkType::Show;
        if !self.expect_length(show, matches!(data.len(), 0 | 2 | 4 | 5)) {
            return;
        }
        let first = if data.len() >= 2 { be_u16(data, 0) } else { 0 };
        let last = match data.len() {
            0 => u16::MAX,
            2 => first,
            _ => be_u16(data, 2),
        };
        let mode = if data.len() == 5 { data[4] } else { 0 };
        let Some(mode_name) = self.enumerated(show, "show mode", mode, &SHOW_MODES) else {
            return;
        };
        self.detail(format!("first object = {first}, last object = {last}"));
        self.detail(mode_name);
    }

    pub(super) fn check_clip(&mut self, data: &[u8]) {
        let clip = ChunkType::Clip;
        if !self.expect_length(clip, data.len() == 21) {
            return;
        }
        let Some(kind) = self.enumerated(clip, "delta type", data[4], &POSITION_TYPES) else {
            return;
        };
        self.detail(format!(
            "first object = {}, last object = {}, {kind} clip boundaries",
            be_u16(data, 0),
            be_u16(data, 2)
        ));
        self.detail(format!(
            "left = {}, right = {}, top = {}, bottom = {}",
            be_i32(data, 5),
            be_i32(data, 9),
            be_i32(data, 13),
            be_i32(data, 17)
        ));
    }

    pub(super) fn check_loop(&mut self, data: &[u8]) {
        let lp = ChunkType::Loop;
        let len = data.len();
        let legal = matches!(len, 5 | 6 | 10) || (len >= 14 && (len - 14) % 4 == 0);
        if !self.expect_length(lp, legal) {
            return;
        }
        let level = data[0];
        self.ctx.loop_levels.push(level);
        let count = be_u32(data, 1);
        let termination = if len > 5 { data[5] } else { 0 };
        let Some(termination_name) =
            self.enumerated(lp, "termination condition", termination, &TERMINATIONS)
        else {
            return;
        };
        self.detail(format!(
            "nest level = {level}, iteration count = {count}, termination = {termination_name}"
        ));
        if len >= 14 {
            self.detail(format!(
                "iteration min = {}, max = {}, {}",
                be_u32(data, 6),
                be_u32(data, 10),
                counted(((len - 14) / 4) as u32, "signal", "signals")
            ));
        }
    }

    pub(super) fn check_endl(&mut self, data: &[u8]) {
        if !self.expect_length(ChunkType::Endl, data.len() == 1) {
            return;
        }
        let level = data[0];
        if self.ctx.loop_levels.last() == Some(&level) {
            self.ctx.loop_levels.pop();
        } else {
            self.note(format!("ENDL nest level {level} does not close an open LOOP"));
        }
        self.detail(format!("nest level = {level}"));
    }

    pub(super) fn check_term(&mut self, data: &[u8]) {
        let term = ChunkType::Term;
        let action = byte(data, 0);
        let expected = if action == 3 { 10 } else { 1 };
        if !self.expect_length(term, data.len() == expected) {
            return;
        }
        let Some(action_name) = self.enumerated(term, "termination action", action, &TERM_ACTIONS)
        else {
            return;
        };
        self.detail(action_name);
        if action == 3 {
            let Some(after) =
                self.enumerated(term, "action after iterations", data[1], &AFTER_REPEAT_ACTIONS)
            else {
                return;
            };
            self.detail(format!(
                "then {after}, delay = {}, max iterations = {}",
                counted(be_u32(data, 2), "tick", "ticks"),
                be_u32(data, 6)
            ));
        }
    }

    pub(super) fn check_prom(&mut self, data: &[u8]) {
        let prom = ChunkType::Prom;
        if !self.expect_length(prom, data.len() == 3) {
            return;
        }
        let (color_type, depth, fill) = (data[0], data[1], data[2]);
        if !matches!(color_type, 0 | 2 | 3 | 4 | 6) {
            self.minor(format!("invalid PROM color type ({color_type})"));
            return;
        }
        if !matches!(depth, 1 | 2 | 4 | 8 | 16) {
            self.minor(format!("invalid PROM bit depth ({depth})"));
            return;
        }
        if fill > 1 {
            self.minor(format!("invalid PROM fill method ({fill})"));
            return;
        }
        self.detail(format!(
            "new color type = {}, new bit depth = {depth}, fill method = {}",
            crate::context::color_type_name(color_type),
            if fill == 1 { "zero fill" } else { "left bit replication" }
        ));
    }

    pub(super) fn check_fpri(&mut self, data: &[u8]) {
        let fpri = ChunkType::Fpri;
        if !self.expect_length(fpri, data.len() == 2) {
            return;
        }
        if data[0] > 1 {
            self.minor(format!("invalid fPRI delta type ({})", data[0]));
            return;
        }
        self.detail(format!(
            "{}priority = {}",
            if data[0] == 1 { "delta " } else { "" },
            data[1]
        ));
    }

    pub(super) fn check_expi(&mut self, data: &[u8]) {
        let expi = ChunkType::Expi;
        if !self.expect_length(expi, data.len() > 2) {
            return;
        }
        let name = &data[2..];
        if self.check_keyword(expi, name, "snapshot name") {
            let shown = self.printable(name);
            self.detail(format!(
                "snapshot ID = {}, snapshot name = {shown}",
                be_u16(data, 0)
            ));
        }
    }

    pub(super) fn check_basi(&mut self, data: &[u8]) {
        let basi = ChunkType::Basi;
        self.open_embedded_image();
        self.once(basi);
        if !self.expect_length(basi, matches!(data.len(), 13 | 19 | 21 | 22)) {
            return;
        }
        let header = ImageHeader {
            width: be_u32(data, 0),
            height: be_u32(data, 4),
            bit_depth: data[8],
            color_type: data[9],
            interlaced: data[12] == 1,
        };
        self.check_image_header(basi, header, data[10], data[11], data[12]);

        if data.len() >= 19 {
            self.detail(format!(
                "initial fill: red = {}, green = {}, blue = {}",
                be_u16(data, 13),
                be_u16(data, 15),
                be_u16(data, 17)
            ));
        }
        if data.len() >= 21 {
            self.detail(format!("initial alpha = {}", be_u16(data, 19)));
        }
        if data.len() == 22 && data[21] > 1 {
            self.minor(format!("invalid BASI viewable flag ({})", data[21]));
        }
    }

    pub(super) fn check_ipng(&mut self, data: &[u8]) {
        self.expect_length(ChunkType::Ipng, data.is_empty());
    }

    pub(super) fn check_pplt(&mut self, data: &[u8]) {
        let pplt = ChunkType::Pplt;
        if !self.expect_length(pplt, !data.is_empty()) {
            return;
        }
        let Some(&(delta_name, sample_size)) = PPLT_DELTA_TYPES.get(usize::from(data[0])) else {
            self.minor(format!("invalid PPLT delta type ({})", data[0]));
            return;
        };

        let palette = match self.ctx.image.palette_entries {
            0 => self.ctx.last_palette_entries,
            entries => entries,
        };
        let mut rest = &data[1..];
        let (mut groups, mut entries) = (0u32, 0u32);
        while !rest.is_empty() {
            if rest.len() < 2 {
                self.major("invalid PPLT length");
                return;
            }
            let (first, last) = (rest[0], rest[1]);
            if first > last {
                self.minor(format!("invalid PPLT index range ({first} > {last})"));
                return;
            }
            if palette > 0 && u32::from(last) >= palette {
                self.minor(format!("PPLT index ({last}) falls outside PLTE ({palette})"));
                return;
            }
            let count = usize::from(last - first) + 1;
            let size = 2 + count * sample_size;
            if rest.len() < size {
                self.major("invalid PPLT length");
                return;
            }
            rest = &rest[size..];
            groups += 1;
            entries += count as u32;
        }
        self.detail(format!(
            "{delta_name}, {} in {}",
            counted(entries, "entry", "entries"),
            counted(groups, "group", "groups")
        ));
    }
}
