//! Payload routing between files and the standard streams.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Marker filename selecting standard input.
pub const STDIN_MARKER: &str = "-";

/// Read the whole payload from `source`, or from `fallback` when the source
/// is absent or the stdin marker.
pub fn read_payload(source: Option<&str>, fallback: &mut impl Read) -> CliResult<Vec<u8>> {
    match source {
        None | Some(STDIN_MARKER) => {
            let mut buf = Vec::new();
            fallback.read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => fs::read(path).map_err(|source| CliError::ReadInput {
            path: path.to_string(),
            source,
        }),
    }
}

/// Write the whole payload to `path`, or to `fallback` (flushed) when absent.
pub fn write_payload(data: &[u8], path: Option<&Path>, fallback: &mut impl Write) -> CliResult<()> {
    match path {
        None => {
            fallback.write_all(data)?;
            fallback.flush()?;
            Ok(())
        }
        Some(path) => fs::write(path, data).map_err(|source| CliError::WriteOutput {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_read_from_fallback() {
        let mut stdin = Cursor::new(vec![0u8, 1, 2]);
        assert_eq!(read_payload(None, &mut stdin).unwrap(), vec![0, 1, 2]);

        let mut stdin = Cursor::new(b"abc".to_vec());
        assert_eq!(read_payload(Some(STDIN_MARKER), &mut stdin).unwrap(), b"abc");
    }

    #[test]
    fn test_read_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload.bin");
        fs::write(&path, b"contents").unwrap();

        let mut stdin = Cursor::new(Vec::new());
        let data = read_payload(Some(path.to_str().unwrap()), &mut stdin).unwrap();
        assert_eq!(data, b"contents");
    }

    #[test]
    fn test_read_missing_file() {
        let mut stdin = Cursor::new(Vec::new());
        let err = read_payload(Some("/nonexistent/payload.bin"), &mut stdin).unwrap_err();
        assert!(matches!(err, CliError::ReadInput { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to read input from file"));
    }

    #[test]
    fn test_write_to_fallback() {
        let mut sink = Vec::new();
        write_payload(b"hello", None, &mut sink).unwrap();
        assert_eq!(sink, b"hello");
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        let mut sink = Vec::new();
        write_payload(b"hello", Some(&path), &mut sink).unwrap();
        assert!(sink.is_empty());
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_write_failure() {
        let mut sink = Vec::new();
        let err =
            write_payload(b"x", Some(Path::new("/nonexistent/dir/out.bin")), &mut sink).unwrap_err();
        assert!(matches!(err, CliError::WriteOutput { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to write data to output file"));
    }
}
