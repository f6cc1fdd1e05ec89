//! Locating PNG, MNG and JNG streams inside arbitrary data.

use crate::io::BUFFER_CAP;
use crate::signature::SIGNATURE_LEN;
use crate::types::StreamKind;
use memchr::memmem::Finder;
use std::io::{self, Read};

/// Bytes 2..8 are shared by all three signatures.
const SIGNATURE_TAIL: &[u8] = b"NG\r\n\x1a\n";

/// Scans a byte stream for embedded signatures.
///
/// After [`next_signature`](Self::next_signature) reports a hit, the search
/// itself is the reader for the embedded stream: reading drains the scan
/// buffer first, then continues with the underlying reader. Scanning picks
/// up wherever reading stopped.
pub struct SignatureSearch<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    /// Stream offset of `buf[pos]`.
    offset: u64,
    finder: Finder<'static>,
    eof: bool,
}

impl<R: Read> SignatureSearch<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(BUFFER_CAP),
            pos: 0,
            offset: 0,
            finder: Finder::new(SIGNATURE_TAIL),
            eof: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Advances past the next signature, returning its format and offset.
    pub fn next_signature(&mut self) -> io::Result<Option<(StreamKind, u64)>> {
        loop {
            if let Some((kind, start)) = self.find_buffered() {
                let signature_offset = self.offset + start as u64;
                self.consume(start + SIGNATURE_LEN);
                return Ok(Some((kind, signature_offset)));
            }

            let window = self.buf.len() - self.pos;
            if self.eof {
                self.consume(window);
                return Ok(None);
            }
            // A signature may straddle the refill; keep its possible head.
            let keep = window.min(SIGNATURE_LEN - 1);
            self.consume(window - keep);
            self.buf.drain(..self.pos);
            self.pos = 0;
            self.fill()?;
        }
    }

    fn find_buffered(&self) -> Option<(StreamKind, usize)> {
        let window = &self.buf[self.pos..];
        self.finder.find_iter(window).find_map(|tail| {
            let start = tail.checked_sub(2)?;
            let candidate = window.get(start..start + SIGNATURE_LEN)?;
            StreamKind::ALL
                .into_iter()
                .find(|kind| kind.signature().as_slice() == candidate)
                .map(|kind| (kind, start))
        })
    }

    fn consume(&mut self, n: usize) {
        self.pos += n;
        self.offset += n as u64;
    }

    fn fill(&mut self) -> io::Result<()> {
        let start = self.buf.len();
        self.buf.resize(start + BUFFER_CAP, 0);
        let read = loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        };
        self.buf.truncate(start + read);
        self.eof = read == 0;
        Ok(())
    }
}

impl<R: Read> Read for SignatureSearch<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let buffered = &self.buf[self.pos..];
        if !buffered.is_empty() {
            let n = buffered.len().min(out.len());
            out[..n].copy_from_slice(&buffered[..n]);
            self.consume(n);
            return Ok(n);
        }
        let n = self.inner.read(out)?;
        self.offset += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out a few bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(out.len()).min(self.data.len());
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_finds_each_kind() {
        let mut data = b"junk".to_vec();
        data.extend_from_slice(StreamKind::Png.signature());
        data.extend_from_slice(b"more junk");
        data.extend_from_slice(StreamKind::Jng.signature());
        data.extend_from_slice(StreamKind::Mng.signature());

        let mut search = SignatureSearch::new(&data[..]);
        assert_eq!(search.next_signature().unwrap(), Some((StreamKind::Png, 4)));
        assert_eq!(search.offset(), 12);
        assert_eq!(search.next_signature().unwrap(), Some((StreamKind::Jng, 21)));
        assert_eq!(search.next_signature().unwrap(), Some((StreamKind::Mng, 29)));
        assert_eq!(search.next_signature().unwrap(), None);
    }

    #[test]
    fn test_ignores_partial_signatures() {
        let data = b"\x89PNG\r\n\x1a\x00 and \x8cNG\r\n\x1a\n".to_vec();
        let mut search = SignatureSearch::new(&data[..]);
        assert_eq!(search.next_signature().unwrap(), None);
        assert_eq!(search.offset(), data.len() as u64);
    }

    #[test]
    fn test_signature_across_reads() {
        let mut data = vec![0u8; BUFFER_CAP - 3];
        data.extend_from_slice(StreamKind::Png.signature());
        data.extend_from_slice(b"tail");
        let mut search = SignatureSearch::new(Trickle {
            data: &data,
            step: BUFFER_CAP,
        });
        let hit = search.next_signature().unwrap();
        assert_eq!(hit, Some((StreamKind::Png, (BUFFER_CAP - 3) as u64)));

        let mut rest = Vec::new();
        search.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"tail");
    }

    #[test]
    fn test_read_drains_buffer_then_inner() {
        let mut data = StreamKind::Mng.signature().to_vec();
        data.extend((0..100u8).collect::<Vec<_>>());
        let mut search = SignatureSearch::new(Trickle {
            data: &data,
            step: 20,
        });
        assert_eq!(search.next_signature().unwrap(), Some((StreamKind::Mng, 0)));
        let mut rest = Vec::new();
        search.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, (0..100u8).collect::<Vec<_>>());
        assert_eq!(search.offset(), 108);
    }
}
