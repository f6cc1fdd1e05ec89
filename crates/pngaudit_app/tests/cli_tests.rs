use pngaudit_core::StreamKind;
use pngaudit_core::crc::chunk_crc;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn chunk(name: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(name);
    out.extend_from_slice(data);
    out.extend_from_slice(&chunk_crc(name, data).to_be_bytes());
    out
}

fn tiny_png() -> Vec<u8> {
    let mut out = StreamKind::Png.signature().to_vec();
    out.extend(chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
    out.extend(chunk(
        b"IDAT",
        &[0x78, 0x01, 0x01, 0x02, 0x00, 0xFD, 0xFF, 0, 0, 0, 2, 0, 1],
    ));
    out.extend(chunk(b"IEND", &[]));
    out
}

fn pngaudit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pngaudit"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .unwrap()
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path.display().to_string()
}

#[test]
fn test_clean_file_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ok.png", &tiny_png());
    let output = pngaudit(&[&path]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(&format!("OK: {path} (1x1, 8-bit grayscale, non-interlaced")));
}

#[test]
fn test_quiet_clean_file_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ok.png", &tiny_png());
    let output = pngaudit(&["-q", &path]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_crc_error_exits_two() {
    let mut bytes = tiny_png();
    bytes[8 + 4 + 4 + 13] ^= 1;
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "bad.png", &bytes);
    let output = pngaudit(&[&path]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("CRC error in chunk IHDR"));
    assert!(stdout.ends_with(&format!("ERROR: {path}\n")));
}

#[test]
fn test_verbose_listing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "ok.png", &tiny_png());
    let output = pngaudit(&["-v", &path]);

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], format!("File: {path} (70 bytes)"));
    assert_eq!(lines[1], "  chunk IHDR at offset 0x0000c, length 13");
    assert_eq!(lines[2], "    1 x 1 image, 8-bit grayscale, non-interlaced");
    assert!(lines.last().unwrap().starts_with(&format!("No errors detected in {path}")));
}

#[test]
fn test_output_follows_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<String> = (0..12)
        .map(|i| write_file(dir.path(), &format!("f{i}.png"), &tiny_png()))
        .collect();
    let args: Vec<&str> = ["-j", "4"]
        .into_iter()
        .chain(paths.iter().map(String::as_str))
        .collect();
    let output = pngaudit(&args);

    let stdout = String::from_utf8(output.stdout).unwrap();
    let verdicts: Vec<&str> = stdout.lines().collect();
    assert_eq!(verdicts.len(), paths.len());
    for (line, path) in verdicts.iter().zip(&paths) {
        assert!(line.starts_with(&format!("OK: {path} ")));
    }
}

#[test]
fn test_missing_file() {
    let output = pngaudit(&["/no/such/file.png"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("cannot open /no/such/file.png"));
}

#[test]
fn test_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pngaudit"))
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&tiny_png()).unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("OK: stdin (1x1"));
}

#[test]
fn test_extract_embedded_streams() {
    let image = tiny_png();
    let mut blob = b"leading junk".to_vec();
    blob.extend_from_slice(&image);
    blob.extend_from_slice(b"middle");
    blob.extend_from_slice(&image);

    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "dump.bin", &blob);
    let output = pngaudit(&["-x", &path]);

    assert_eq!(output.status.code(), Some(0));
    for n in 1..=2 {
        let extracted = std::fs::read(dir.path().join(format!("dump-{n}.png"))).unwrap();
        assert_eq!(extracted, image);
    }
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("(PNG at offset 0xc)"));
}

#[test]
fn test_text_printing() {
    let mut bytes = StreamKind::Png.signature().to_vec();
    bytes.extend(chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
    bytes.extend(chunk(b"tEXt", b"Author\0someone"));
    bytes.extend_from_slice(&tiny_png()[8 + 25..]);

    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "text.png", &bytes);
    let output = pngaudit(&["-t", &path]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("    Author: someone\n"));
}
