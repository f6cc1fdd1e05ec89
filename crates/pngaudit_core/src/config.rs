//! Validation options

/// How much per-chunk detail to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Plain,
    /// Chunk listing plus decoded fields
    Verbose,
    /// Also decode the image data far enough to list row filters
    VeryVerbose,
}

/// Options for checking one or more streams. Never mutated during a check.
#[derive(Debug, Clone, Default)]
pub struct CheckConfig {
    pub verbosity: Verbosity,
    /// Only report errors
    pub quiet: bool,
    /// Keep going after major errors
    pub force: bool,
    /// Print tEXt, zTXt and iTXt contents
    pub print_text: bool,
    /// Escape every byte >= 0x7F when printing text
    pub seven_bit: bool,
    /// Print PLTE, tRNS, hIST and sPLT entries
    pub print_palette: bool,
}

impl CheckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the verbosity. Anything above plain turns quiet mode off.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        if verbosity > Verbosity::Plain {
            self.quiet = false;
        }
        self
    }

    /// Quiet mode drops verbosity back to plain.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        if quiet {
            self.verbosity = Verbosity::Plain;
        }
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_print_text(mut self, print_text: bool) -> Self {
        self.print_text = print_text;
        self
    }

    /// 7-bit escaping implies printing text.
    pub fn with_seven_bit(mut self, seven_bit: bool) -> Self {
        self.seven_bit = seven_bit;
        if seven_bit {
            self.print_text = true;
        }
        self
    }

    pub fn with_print_palette(mut self, print_palette: bool) -> Self {
        self.print_palette = print_palette;
        self
    }

    #[inline]
    pub fn verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    /// Whether row filters should be decoded. Needs the `inspect` feature.
    #[inline]
    pub fn inspect_filters(&self) -> bool {
        cfg!(feature = "inspect") && self.verbosity >= Verbosity::VeryVerbose
    }
}
