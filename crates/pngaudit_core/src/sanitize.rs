//! Escaping of untrusted text before it reaches a terminal.

/// Escapes control bytes and collects line-ending and control findings.
///
/// A single sanitizer is used per chunk; [`TextSanitizer::finish`] turns the
/// accumulated flags into warning messages for that chunk.
#[derive(Debug, Default)]
pub struct TextSanitizer {
    seven_bit: bool,
    saw_cr: bool,
    saw_lf: bool,
    saw_nul: bool,
    saw_control: bool,
    saw_esc: bool,
}

impl TextSanitizer {
    #[must_use]
    pub fn new(seven_bit: bool) -> Self {
        Self {
            seven_bit,
            ..Self::default()
        }
    }

    fn needs_escape(&self, c: u8) -> bool {
        if c < 0x20 {
            return c != b'\t' && c != b'\n';
        }
        if self.seven_bit {
            c >= 0x7F
        } else {
            (0x7F..0xA0).contains(&c)
        }
    }

    fn note(&mut self, c: u8) {
        match c {
            b'\n' => self.saw_lf = true,
            b'\r' => self.saw_cr = true,
            0 => self.saw_nul = true,
            b'\t' => {}
            0x1B => {
                self.saw_control = true;
                self.saw_esc = true;
            }
            c if c < 0x20 || (0x7F..0xA0).contains(&c) => self.saw_control = true,
            _ => {}
        }
    }

    fn push_byte(&mut self, out: &mut String, c: u8) {
        self.note(c);
        if c == b'\\' {
            out.push_str("\\\\");
        } else if self.needs_escape(c) {
            out.push_str(&format!("\\{c:02X}"));
        } else {
            out.push(char::from(c));
        }
    }

    /// Returns a printable rendition of `bytes`, treating them as Latin-1.
    pub fn escape(&mut self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for &c in bytes {
            self.push_byte(&mut out, c);
        }
        out
    }

    /// Like [`escape`](Self::escape), for UTF-8 text such as iTXt.
    ///
    /// Malformed sequences come out as hex escapes. In 7-bit mode every
    /// non-ASCII byte is escaped.
    pub fn escape_utf8(&mut self, bytes: &[u8]) -> String {
        if self.seven_bit {
            return self.escape(bytes);
        }
        let mut out = String::with_capacity(bytes.len());
        for piece in bytes.utf8_chunks() {
            for c in piece.valid().chars() {
                if let Ok(b) = u8::try_from(c) {
                    if b < 0x80 {
                        self.push_byte(&mut out, b);
                        continue;
                    }
                }
                if c.is_control() {
                    self.saw_control = true;
                    out.extend(c.escape_unicode());
                } else {
                    out.push(c);
                }
            }
            for &b in piece.invalid() {
                out.push_str(&format!("\\{b:02X}"));
            }
        }
        out
    }

    /// Consumes the sanitizer and reports what it saw, one message per finding.
    #[must_use]
    pub fn finish(self, chunk_name: &str) -> Vec<String> {
        let mut findings = Vec::new();
        if self.saw_cr && self.saw_lf {
            findings.push(format!(
                "{chunk_name} chunk contains both CR and LF as line terminators"
            ));
        } else if self.saw_cr {
            findings.push(format!(
                "{chunk_name} chunk contains only CR as line terminator"
            ));
        }
        if self.saw_nul {
            findings.push(format!("{chunk_name} chunk contains null bytes"));
        }
        if self.saw_control {
            let esc = if self.saw_esc { " including Escape" } else { "" };
            findings.push(format!(
                "{chunk_name} chunk contains control characters{esc}"
            ));
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        let mut s = TextSanitizer::new(false);
        assert_eq!(s.escape(b"Title\tline\n"), "Title\tline\n");
        assert!(s.finish("tEXt").is_empty());
    }

    #[test]
    fn test_escape_sequences() {
        let mut s = TextSanitizer::new(false);
        assert_eq!(s.escape(b"\x1b[31mred"), "\\1B[31mred");
        let findings = s.finish("tEXt");
        assert_eq!(
            findings,
            vec!["tEXt chunk contains control characters including Escape"]
        );
    }

    #[test]
    fn test_backslash_doubled() {
        let mut s = TextSanitizer::new(false);
        assert_eq!(s.escape(b"C:\\dir"), "C:\\\\dir");
    }

    #[test]
    fn test_seven_bit_mode() {
        let mut eight = TextSanitizer::new(false);
        assert_eq!(eight.escape(&[0xE9, 0x85]), "\u{e9}\\85");

        let mut seven = TextSanitizer::new(true);
        assert_eq!(seven.escape(&[0xE9, 0x7F]), "\\E9\\7F");
    }

    #[test]
    fn test_line_endings() {
        let mut mixed = TextSanitizer::new(false);
        mixed.escape(b"a\r\nb");
        assert_eq!(
            mixed.finish("zTXt"),
            vec!["zTXt chunk contains both CR and LF as line terminators"]
        );

        let mut cr_only = TextSanitizer::new(false);
        cr_only.escape(b"a\rb");
        assert_eq!(
            cr_only.finish("tEXt"),
            vec!["tEXt chunk contains only CR as line terminator"]
        );
    }

    #[test]
    fn test_utf8_text() {
        let mut s = TextSanitizer::new(false);
        assert_eq!(s.escape_utf8("caf\u{e9} \u{65e5}".as_bytes()), "caf\u{e9} \u{65e5}");
        assert!(s.finish("iTXt").is_empty());

        let mut bad = TextSanitizer::new(false);
        assert_eq!(bad.escape_utf8(b"a\xFFb"), "a\\FFb");

        let mut c1 = TextSanitizer::new(false);
        assert_eq!(c1.escape_utf8("x\u{85}".as_bytes()), "x\\u{85}");
        assert_eq!(
            c1.finish("iTXt"),
            vec!["iTXt chunk contains control characters"]
        );

        let mut seven = TextSanitizer::new(true);
        assert_eq!(seven.escape_utf8("\u{e9}".as_bytes()), "\\C3\\A9");
    }

    #[test]
    fn test_nul_bytes() {
        let mut s = TextSanitizer::new(false);
        assert_eq!(s.escape(b"a\0b"), "a\\00b");
        assert_eq!(s.finish("iTXt"), vec!["iTXt chunk contains null bytes"]);
    }
}
