use super::ChunkChecker;

impl ChunkChecker<'_> {
    /// mkBF, mkBS, mkBT and mkTS carry Fireworks' editable document state.
    pub(super) fn check_fireworks(&mut self, data: &[u8]) {
        self.detail(format!(
            "Macromedia Fireworks private chunk, {} bytes",
            data.len()
        ));
    }

    pub(super) fn check_preview(&mut self, data: &[u8]) {
        self.detail(format!(
            "Macromedia Fireworks preview chunk, {} bytes",
            data.len()
        ));
    }

    pub(super) fn check_unknown(&mut self) {
        let name = self.current;
        if name.is_critical() && name.is_safe_to_copy() {
            self.minor(format!("illegal critical, safe-to-copy chunk {name}"));
            return;
        }
        self.detail(format!(
            "unknown {}{}{}{} chunk",
            if name.is_ancillary() { "ancillary " } else { "critical " },
            if name.is_private() { "private " } else { "" },
            if name.is_reserved_set() { "reserved-bit-set " } else { "" },
            if name.is_safe_to_copy() { "safe-to-copy" } else { "unsafe-to-copy" }
        ));
    }
}
