//! tEXt, zTXt and iTXt, plus the keyword rules several other chunks share.

use super::ChunkChecker;
use super::fields::split_nul;
use crate::chunk::ChunkType;
use crate::sanitize::TextSanitizer;

const MAX_KEYWORD_LEN: usize = 79;

#[cfg(feature = "inspect")]
const TEXT_LIMIT: usize = crate::io::BUFFER_CAP;

fn is_keyword_control(b: u8) -> bool {
    b < 32 || (127..=160).contains(&b)
}

impl ChunkChecker<'_> {
    /// Applies the PNG keyword rules. Reports the first violation only.
    pub(super) fn check_keyword(&mut self, chunk_type: ChunkType, keyword: &[u8], what: &str) -> bool {
        let problem = if keyword.is_empty() {
            Some(format!("zero length {chunk_type} {what}"))
        } else if keyword.len() > MAX_KEYWORD_LEN {
            Some(format!("{chunk_type} {what} longer than {MAX_KEYWORD_LEN} characters"))
        } else if keyword.first() == Some(&b' ') {
            Some(format!("{chunk_type} {what} has leading space(s)"))
        } else if keyword.last() == Some(&b' ') {
            Some(format!("{chunk_type} {what} has trailing space(s)"))
        } else if keyword.windows(2).any(|w| w == b"  ") {
            Some(format!("{chunk_type} {what} has consecutive spaces"))
        } else if keyword.iter().copied().any(is_keyword_control) {
            Some(format!("{chunk_type} {what} has control characters"))
        } else {
            None
        };
        match problem {
            Some(message) => {
                self.minor(message);
                false
            }
            None => true,
        }
    }

    pub(super) fn check_text(&mut self, data: &[u8]) {
        let text = ChunkType::Text;
        let Some((keyword, body)) = split_nul(data) else {
            self.major("missing NUL after tEXt keyword");
            return;
        };
        if !self.check_keyword(text, keyword, "keyword") {
            return;
        }
        self.show_text(keyword, body, false);
    }

    pub(super) fn check_ztxt(&mut self, data: &[u8]) {
        let ztxt = ChunkType::Ztxt;
        let Some((keyword, rest)) = split_nul(data) else {
            self.major("missing NUL after zTXt keyword");
            return;
        };
        if !self.check_keyword(ztxt, keyword, "keyword") {
            return;
        }
        if !self.expect_length(ztxt, !rest.is_empty()) {
            return;
        }
        let method = rest[0];
        if method != 0 {
            self.minor(format!("invalid zTXt compression method ({method})"));
            return;
        }
        self.show_compressed_text(keyword, &rest[1..], false);
    }

    pub(super) fn check_itxt(&mut self, data: &[u8]) {
        let itxt = ChunkType::Itxt;
        let Some((keyword, rest)) = split_nul(data) else {
            self.major("missing NUL after iTXt keyword");
            return;
        };
        if !self.check_keyword(itxt, keyword, "keyword") {
            return;
        }
        if !self.expect_length(itxt, rest.len() >= 2) {
            return;
        }
        let (flag, method) = (rest[0], rest[1]);
        if flag > 1 {
            self.minor(format!("invalid iTXt compression flag ({flag})"));
            return;
        }
        if method != 0 {
            self.minor(format!("invalid iTXt compression method ({method})"));
            return;
        }
        let Some((language, rest)) = split_nul(&rest[2..]) else {
            self.major("missing NUL after iTXt language tag");
            return;
        };
        let Some((translated, body)) = split_nul(rest) else {
            self.major("missing NUL after iTXt translated keyword");
            return;
        };

        if !language
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'-')
        {
            let shown = self.printable(language);
            self.minor(format!("invalid iTXt language tag ({shown})"));
        }
        if std::str::from_utf8(translated).is_err() {
            self.minor("iTXt translated keyword is not valid UTF-8");
        }
        let compressed = flag == 1;
        if !compressed && std::str::from_utf8(body).is_err() {
            self.minor("iTXt text is not valid UTF-8");
        }

        if self.config.verbose() {
            let language = if language.is_empty() {
                "unspecified".to_string()
            } else {
                self.printable(language)
            };
            let translated = TextSanitizer::new(self.config.seven_bit).escape_utf8(translated);
            self.detail(format!(
                "{}, language = {language}, translated keyword = {translated}",
                if compressed { "compressed" } else { "uncompressed" }
            ));
        }
        if compressed {
            self.show_compressed_text(keyword, body, true);
        } else {
            self.show_text(keyword, body, true);
        }
    }

    /// Shows the keyword when verbose and the text when asked to.
    fn show_text(&mut self, keyword: &[u8], body: &[u8], utf8: bool) {
        let shown = self.printable(keyword);
        if !self.config.print_text {
            self.detail(format!("keyword: {shown}"));
            return;
        }
        let mut sanitizer = TextSanitizer::new(self.config.seven_bit);
        let body = if utf8 {
            sanitizer.escape_utf8(body)
        } else {
            sanitizer.escape(body)
        };
        self.listing(format!("{shown}: {body}"));
        self.sanitizer_findings(sanitizer);
    }

    #[cfg(feature = "inspect")]
    fn show_compressed_text(&mut self, keyword: &[u8], compressed: &[u8], utf8: bool) {
        if !self.config.print_text {
            let shown = self.printable(keyword);
            self.detail(format!("keyword: {shown}"));
            return;
        }
        match crate::inflate::inflate_text(compressed, TEXT_LIMIT) {
            Ok((body, truncated)) => {
                self.show_text(keyword, &body, utf8);
                if truncated {
                    self.note(format!("{} text truncated to {TEXT_LIMIT} bytes", self.current));
                }
            }
            Err(e) => self.minor(format!("{} text: {e}", self.current)),
        }
    }

    #[cfg(not(feature = "inspect"))]
    fn show_compressed_text(&mut self, keyword: &[u8], _compressed: &[u8], _utf8: bool) {
        let shown = self.printable(keyword);
        if self.config.print_text {
            self.listing(format!("{shown}: (compressed {} text)", self.current));
        } else {
            self.detail(format!("keyword: {shown}"));
        }
    }
}
