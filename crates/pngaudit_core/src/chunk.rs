use std::fmt;

/// A raw chunk name. Bit 5 of each byte carries one property flag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkName(pub [u8; 4]);

impl ChunkName {
    #[inline]
    #[must_use]
    pub const fn is_ancillary(&self) -> bool {
        self.0[0] & 0x20 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        !self.is_ancillary()
    }

    #[inline]
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.0[1] & 0x20 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_reserved_set(&self) -> bool {
        self.0[2] & 0x20 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_safe_to_copy(&self) -> bool {
        self.0[3] & 0x20 != 0
    }

    /// Chunk names are four ASCII letters, nothing else.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.iter().all(u8::is_ascii_alphabetic)
    }

    /// Hex rendition for names that are not printable.
    #[must_use]
    pub fn hex(&self) -> String {
        let [a, b, c, d] = self.0;
        format!("{a:02x} {b:02x} {c:02x} {d:02x}")
    }
}

impl fmt::Display for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_well_formed() {
            for &b in &self.0 {
                write!(f, "{}", char::from(b))?;
            }
            Ok(())
        } else {
            f.write_str(&self.hex())
        }
    }
}

impl fmt::Debug for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkName({self})")
    }
}

/// Which format defines a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFamily {
    Png,
    Jng,
    Mng,
    Private,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Ihdr,
    Plte,
    Idat,
    Iend,
    Bkgd,
    Chrm,
    Gama,
    Hist,
    Iccp,
    Itxt,
    Offs,
    Pcal,
    Phys,
    Sbit,
    Scal,
    Splt,
    Srgb,
    Ster,
    Text,
    Time,
    Trns,
    Ztxt,
    Gifg,
    Gifx,
    Jhdr,
    Jdat,
    Jdaa,
    Jsep,
    Mhdr,
    Mend,
    Dhdr,
    Fram,
    Save,
    Seek,
    Need,
    Defi,
    Back,
    Move,
    Clon,
    Show,
    Clip,
    Loop,
    Endl,
    Term,
    Prom,
    Fpri,
    Expi,
    Basi,
    Ipng,
    Pplt,
    MkBf,
    MkBs,
    MkBt,
    MkTs,
    PrVw,
    Other([u8; 4]),
}

impl ChunkType {
    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        match bytes {
            b"IHDR" => Self::Ihdr,
            b"PLTE" => Self::Plte,
            b"IDAT" => Self::Idat,
            b"IEND" => Self::Iend,
            b"bKGD" => Self::Bkgd,
            b"cHRM" => Self::Chrm,
            b"gAMA" => Self::Gama,
            b"hIST" => Self::Hist,
            b"iCCP" => Self::Iccp,
            b"iTXt" => Self::Itxt,
            b"oFFs" => Self::Offs,
            b"pCAL" => Self::Pcal,
            b"pHYs" => Self::Phys,
            b"sBIT" => Self::Sbit,
            b"sCAL" => Self::Scal,
            b"sPLT" => Self::Splt,
            b"sRGB" => Self::Srgb,
            b"sTER" => Self::Ster,
            b"tEXt" => Self::Text,
            b"tIME" => Self::Time,
            b"tRNS" => Self::Trns,
            b"zTXt" => Self::Ztxt,
            b"gIFg" => Self::Gifg,
            b"gIFx" => Self::Gifx,
            b"JHDR" => Self::Jhdr,
            b"JDAT" => Self::Jdat,
            b"JDAA" => Self::Jdaa,
            b"JSEP" => Self::Jsep,
            b"MHDR" => Self::Mhdr,
            b"MEND" => Self::Mend,
            b"DHDR" => Self::Dhdr,
            b"FRAM" => Self::Fram,
            b"SAVE" => Self::Save,
            b"SEEK" => Self::Seek,
            b"nEED" => Self::Need,
            b"DEFI" => Self::Defi,
            b"BACK" => Self::Back,
            b"MOVE" => Self::Move,
            b"CLON" => Self::Clon,
            b"SHOW" => Self::Show,
            b"CLIP" => Self::Clip,
            b"LOOP" => Self::Loop,
            b"ENDL" => Self::Endl,
            b"TERM" => Self::Term,
            b"PROM" => Self::Prom,
            b"fPRI" => Self::Fpri,
            b"eXPI" => Self::Expi,
            b"BASI" => Self::Basi,
            b"IPNG" => Self::Ipng,
            b"PPLT" => Self::Pplt,
            b"mkBF" => Self::MkBf,
            b"mkBS" => Self::MkBs,
            b"mkBT" => Self::MkBt,
            b"mkTS" => Self::MkTs,
            b"prVW" => Self::PrVw,
            _ => Self::Other(*bytes),
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        match self {
            Self::Ihdr => *b"IHDR",
            Self::Plte => *b"PLTE",
            Self::Idat => *b"IDAT",
            Self::Iend => *b"IEND",
            Self::Bkgd => *b"bKGD",
            Self::Chrm => *b"cHRM",
            Self::Gama => *b"gAMA",
            Self::Hist => *b"hIST",
            Self::Iccp => *b"iCCP",
            Self::Itxt => *b"iTXt",
            Self::Offs => *b"oFFs",
            Self::Pcal => *b"pCAL",
            Self::Phys => *b"pHYs",
            Self::Sbit => *b"sBIT",
            Self::Scal => *b"sCAL",
            Self::Splt => *b"sPLT",
            Self::Srgb => *b"sRGB",
            Self::Ster => *b"sTER",
            Self::Text => *b"tEXt",
            Self::Time => *b"tIME",
            Self::Trns => *b"tRNS",
            Self::Ztxt => *b"zTXt",
            Self::Gifg => *b"gIFg",
            Self::Gifx => *b"gIFx",
            Self::Jhdr => *b"JHDR",
            Self::Jdat => *b"JDAT",
            Self::Jdaa => *b"JDAA",
            Self::Jsep => *b"JSEP",
            Self::Mhdr => *b"MHDR",
            Self::Mend => *b"MEND",
            Self::Dhdr => *b"DHDR",
            Self::Fram => *b"FRAM",
            Self::Save => *b"SAVE",
            Self::Seek => *b"SEEK",
            Self::Need => *b"nEED",
            Self::Defi => *b"DEFI",
            Self::Back => *b"BACK",
            Self::Move => *b"MOVE",
            Self::Clon => *b"CLON",
            Self::Show => *b"SHOW",
            Self::Clip => *b"CLIP",
            Self::Loop => *b"LOOP",
            Self::Endl => *b"ENDL",
            Self::Term => *b"TERM",
            Self::Prom => *b"PROM",
            Self::Fpri => *b"fPRI",
            Self::Expi => *b"eXPI",
            Self::Basi => *b"BASI",
            Self::Ipng => *b"IPNG",
            Self::Pplt => *b"PPLT",
            Self::MkBf => *b"mkBF",
            Self::MkBs => *b"mkBS",
            Self::MkBt => *b"mkBT",
            Self::MkTs => *b"mkTS",
            Self::PrVw => *b"prVW",
            Self::Other(b) => *b,
        }
    }

    #[inline]
    pub fn name(&self) -> ChunkName {
        ChunkName(self.to_bytes())
    }

    pub fn family(&self) -> ChunkFamily {
        match self {
            Self::Jhdr | Self::Jdat | Self::Jdaa | Self::Jsep => ChunkFamily::Jng,
            Self::Mhdr
            | Self::Mend
            | Self::Dhdr
            | Self::Fram
            | Self::Save
            | Self::Seek
            | Self::Need
            | Self::Defi
            | Self::Back
            | Self::Move
            | Self::Clon
            | Self::Show
            | Self::Clip
            | Self::Loop
            | Self::Endl
            | Self::Term
            | Self::Prom
            | Self::Fpri
            | Self::Expi
            | Self::Basi
            | Self::Ipng
            | Self::Pplt => ChunkFamily::Mng,
            Self::MkBf | Self::MkBs | Self::MkBt | Self::MkTs | Self::PrVw => {
                ChunkFamily::Private
            }
            Self::Other(_) => ChunkFamily::Unknown,
            _ => ChunkFamily::Png,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_bits() {
        let ihdr = ChunkName(*b"IHDR");
        assert!(ihdr.is_critical());
        assert!(!ihdr.is_private());
        assert!(!ihdr.is_safe_to_copy());

        let text = ChunkName(*b"tEXt");
        assert!(text.is_ancillary());
        assert!(text.is_safe_to_copy());

        let fireworks = ChunkName(*b"mkBF");
        assert!(fireworks.is_private());
        assert!(!fireworks.is_reserved_set());
    }

    #[test]
    fn test_well_formed_names() {
        assert!(ChunkName(*b"IdAT").is_well_formed());
        assert!(!ChunkName(*b"ID4T").is_well_formed());
        assert!(!ChunkName([0x00, 0x49, 0x44, 0x41]).is_well_formed());
    }

    #[test]
    fn test_display_falls_back_to_hex() {
        assert_eq!(ChunkName(*b"gAMA").to_string(), "gAMA");
        assert_eq!(ChunkName([0x49, 0x44, 0x00, 0xff]).to_string(), "49 44 00 ff");
    }

    #[test]
    fn test_chunk_type_roundtrip() {
        let types = [
            ChunkType::Ihdr,
            ChunkType::Idat,
            ChunkType::Jsep,
            ChunkType::Need,
            ChunkType::PrVw,
            ChunkType::Other(*b"xxxx"),
        ];

        for chunk_type in types {
            let bytes = chunk_type.to_bytes();
            assert_eq!(chunk_type, ChunkType::from_bytes(&bytes));
        }
    }

    #[test]
    fn test_family() {
        assert_eq!(ChunkType::Srgb.family(), ChunkFamily::Png);
        assert_eq!(ChunkType::Jdat.family(), ChunkFamily::Jng);
        assert_eq!(ChunkType::Loop.family(), ChunkFamily::Mng);
        assert_eq!(ChunkType::MkBt.family(), ChunkFamily::Private);
        assert_eq!(ChunkType::from_bytes(b"zzZz").family(), ChunkFamily::Unknown);
    }
}
