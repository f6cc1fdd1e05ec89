use crate::crc::Crc32;
use crate::{CoreError, Result};
use std::io::{ErrorKind, Read};

/// Largest single read issued for chunk data.
pub const BUFFER_CAP: usize = 32_000;

/// Sequential reader over one stream, tracking the absolute offset.
///
/// Every read names the field it is after so a short read can be reported
/// as "EOF while reading <field>".
pub struct ChunkReader<R> {
    inner: R,
    offset: u64,
    peeked: Option<u8>,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            peeked: None,
        }
    }

    /// Starts counting from `offset`, for streams found mid-file.
    pub fn with_offset(inner: R, offset: u64) -> Self {
        Self {
            inner,
            offset,
            peeked: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_exact(&mut self, buf: &mut [u8], field: &'static str) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut start = 0;
        if let Some(byte) = self.peeked.take() {
            buf[0] = byte;
            start = 1;
        }
        self.inner
            .read_exact(&mut buf[start..])
            .map_err(|e| CoreError::from_read(e, field))?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    pub fn read_u32_be(&mut self, field: &'static str) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, field)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_tag(&mut self, field: &'static str) -> Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, field)?;
        Ok(buf)
    }

    /// Reads `len` bytes of chunk data in capped segments, feeding each to `crc`.
    ///
    /// The buffer only grows as data actually arrives, so a bogus length on a
    /// short stream fails with EOF instead of a huge allocation.
    pub fn read_data(&mut self, len: u32, crc: &mut Crc32) -> Result<Vec<u8>> {
        let len = len as usize;
        let mut data = Vec::with_capacity(len.min(BUFFER_CAP));
        while data.len() < len {
            let start = data.len();
            let step = (len - start).min(BUFFER_CAP);
            data.resize(start + step, 0);
            self.read_exact(&mut data[start..], "chunk data")?;
            crc.update(&data[start..]);
        }
        Ok(data)
    }

    /// Reads one byte, or `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if let Some(byte) = self.peeked.take() {
            self.offset += 1;
            return Ok(Some(byte));
        }
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CoreError::Io(e)),
            }
        }
    }

    /// True when no more bytes are available. Does not consume input.
    pub fn at_eof(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        match self.read_byte()? {
            Some(byte) => {
                self.offset -= 1;
                self.peeked = Some(byte);
                Ok(false)
            }
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_u32_be() {
        let mut reader = ChunkReader::new(Cursor::new(vec![0x00, 0x00, 0x01, 0x02]));
        assert_eq!(reader.read_u32_be("chunk length").unwrap(), 258);
        assert_eq!(reader.offset(), 4);
    }

    #[test]
    fn test_short_read_names_field() {
        let mut reader = ChunkReader::new(Cursor::new(vec![0x00, 0x01]));
        match reader.read_u32_be("crc value") {
            Err(CoreError::UnexpectedEof { field }) => assert_eq!(field, "crc value"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = ChunkReader::new(Cursor::new(b"IEND".to_vec()));
        assert!(!reader.at_eof().unwrap());
        assert_eq!(reader.offset(), 0);
        assert_eq!(&reader.read_tag("chunk type").unwrap(), b"IEND");
        assert!(reader.at_eof().unwrap());
        assert_eq!(reader.offset(), 4);
    }

    #[test]
    fn test_read_data_in_segments() {
        let payload: Vec<u8> = (0..(BUFFER_CAP * 2 + 17)).map(|i| i as u8).collect();
        let mut reader = ChunkReader::new(Cursor::new(payload.clone()));
        let mut crc = Crc32::new();
        let data = reader.read_data(payload.len() as u32, &mut crc).unwrap();
        assert_eq!(data, payload);
        assert_eq!(crc.finish(), crate::crc::crc32(&payload));
    }

    #[test]
    fn test_read_data_bogus_length() {
        let mut reader = ChunkReader::new(Cursor::new(vec![1, 2, 3]));
        let mut crc = Crc32::new();
        assert!(matches!(
            reader.read_data(u32::MAX, &mut crc),
            Err(CoreError::UnexpectedEof { field: "chunk data" })
        ));
    }
}
