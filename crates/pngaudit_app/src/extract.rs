//! Writing embedded streams out to their own files.

use pngaudit_core::{ChunkName, ChunkSink, StreamKind};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output path for the `index`-th stream found in `input`: `<stem>-<index>.<ext>`
/// in the input's directory.
pub fn output_path(input: &Path, index: usize, kind: StreamKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string());
    let name = format!("{stem}-{index}.{}", kind.extension());
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// [`ChunkSink`] that creates its file when the stream begins.
pub struct FileExtractor {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileExtractor {
    pub fn new(path: PathBuf) -> Self {
        Self { path, writer: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the file. Returns false if nothing was ever written.
    pub fn finish(self) -> std::io::Result<bool> {
        match self.writer {
            Some(mut writer) => {
                writer.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn writer(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("extraction file was never opened"))
    }
}

impl ChunkSink for FileExtractor {
    fn begin(&mut self, kind: StreamKind) -> std::io::Result<()> {
        debug!(path = %self.path.display(), %kind, "creating extraction file");
        let mut writer = BufWriter::new(File::create(&self.path)?);
        writer.write_all(kind.signature())?;
        self.writer = Some(writer);
        Ok(())
    }

    fn chunk(&mut self, name: ChunkName, data: &[u8], crc: u32) -> std::io::Result<()> {
        let len = u32::try_from(data.len()).map_err(std::io::Error::other)?;
        let writer = self.writer()?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&name.0)?;
        writer.write_all(data)?;
        writer.write_all(&crc.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/data/dump.bin"), 3, StreamKind::Mng);
        assert_eq!(path, PathBuf::from("/data/dump-3.mng"));

        let path = output_path(Path::new("disk.img"), 1, StreamKind::Png);
        assert_eq!(path, PathBuf::from("disk-1.png"));
    }

    #[test]
    fn test_writes_signature_and_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut extractor = FileExtractor::new(path.clone());
        extractor.begin(StreamKind::Png).unwrap();
        extractor
            .chunk(ChunkName(*b"IEND"), &[], 0xAE42_6082)
            .unwrap();
        assert!(extractor.finish().unwrap());

        let mut expected = StreamKind::Png.signature().to_vec();
        expected.extend_from_slice(&[0, 0, 0, 0]);
        expected.extend_from_slice(b"IEND");
        expected.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
        assert_eq!(std::fs::read(path).unwrap(), expected);
    }

    #[test]
    fn test_unopened_extractor() {
        let mut extractor = FileExtractor::new(PathBuf::from("never-created.png"));
        assert!(extractor.chunk(ChunkName(*b"IEND"), &[], 0).is_err());
        assert!(!extractor.finish().unwrap());
    }
}
