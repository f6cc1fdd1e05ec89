use std::fmt;

/// Ordinal error level. Later levels always dominate earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Clean = 0,
    /// Recoverable irregularity: ordering, ranges, CRC mismatch.
    Minor = 1,
    /// Length or framing problem; processing stops unless forced.
    Major = 2,
    /// Missing bytes. Nothing can follow.
    Fatal = 3,
}

impl Severity {
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity ratchet for one stream, combined with the force policy.
///
/// The stream-wide level only ever rises. A separate per-chunk level is
/// reset at every chunk boundary so extraction can tell which chunks were
/// themselves clean.
#[derive(Debug, Clone, Copy)]
pub struct Status {
    worst: Severity,
    chunk: Severity,
    force: bool,
}

impl Status {
    #[must_use]
    pub const fn new(force: bool) -> Self {
        Self {
            worst: Severity::Clean,
            chunk: Severity::Clean,
            force,
        }
    }

    pub fn raise(&mut self, severity: Severity) {
        self.worst = self.worst.max(severity);
        self.chunk = self.chunk.max(severity);
    }

    pub fn begin_chunk(&mut self) {
        self.chunk = Severity::Clean;
    }

    #[inline]
    #[must_use]
    pub const fn worst(&self) -> Severity {
        self.worst
    }

    #[inline]
    #[must_use]
    pub const fn chunk(&self) -> Severity {
        self.chunk
    }

    #[inline]
    #[must_use]
    pub const fn force(&self) -> bool {
        self.force
    }

    /// True when the stream has reached `level` and force does not excuse it.
    #[must_use]
    pub fn is_err(&self, level: Severity) -> bool {
        self.worst > level || (!self.force && self.worst == level)
    }

    #[must_use]
    pub fn no_err(&self, level: Severity) -> bool {
        self.worst < level || (self.force && self.worst == level)
    }

    /// Fatal always stops; major stops unless forced.
    #[must_use]
    pub fn should_abort(&self) -> bool {
        self.is_err(Severity::Major)
    }

    /// Whether the chunk just processed may be copied to an extract stream.
    #[must_use]
    pub fn chunk_copyable(&self) -> bool {
        self.chunk == Severity::Clean || (self.force && self.chunk < Severity::Fatal)
    }
}
