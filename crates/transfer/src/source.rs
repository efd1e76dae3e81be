//! File sources for upload tasks.
//!
//! A [`SourceFile`] owns the bytes and metadata of one candidate file for
//! the lifetime of its task. Bytes live either in memory (files handed over
//! by the dashboard) or on disk (read per span).

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chunker::ChunkSpan;

/// Where a source file's bytes live.
#[derive(Debug, Clone)]
pub enum FileData {
    Memory(Arc<Vec<u8>>),
    Disk(PathBuf),
}

/// One candidate file: name, size, content type, and owned bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    size: u64,
    content_type: String,
    data: FileData,
}

impl SourceFile {
    /// Wraps in-memory bytes. The content type is inferred from the
    /// file name's extension.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let size = bytes.len() as u64;
        let content_type = content_type_for(&name).to_string();
        Self {
            name,
            size,
            content_type,
            data: FileData::Memory(Arc::new(bytes)),
        }
    }

    /// Opens a file on disk, recording its current length. Bytes are read
    /// lazily per span.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type_for(&name).to_string();
        Ok(Self {
            name,
            size: metadata.len(),
            content_type,
            data: FileData::Disk(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Reads exactly the bytes of `span`.
    ///
    /// Fails if the span reaches past the recorded size (e.g. the file was
    /// truncated on disk after the task was created).
    pub fn read_span(&self, span: &ChunkSpan) -> std::io::Result<Vec<u8>> {
        if span.end() > self.size {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "span {}..{} exceeds file size {}",
                    span.offset,
                    span.end(),
                    self.size
                ),
            ));
        }
        match &self.data {
            FileData::Memory(bytes) => {
                let start = span.offset as usize;
                let end = span.end() as usize;
                Ok(bytes[start..end].to_vec())
            }
            FileData::Disk(path) => {
                let mut file = std::fs::File::open(path)?;
                file.seek(SeekFrom::Start(span.offset))?;
                let mut buf = vec![0u8; span.len as usize];
                file.read_exact(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

/// Maps a file extension to a content type for the document types the
/// backend accepts; everything else is sent as a generic byte stream.
pub(crate) fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Lowercase extension of `name`, or empty when there is none.
pub(crate) fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_bytes_records_size_and_type() {
        let file = SourceFile::from_bytes("notes.md", b"# hi".to_vec());
        assert_eq!(file.size(), 4);
        assert_eq!(file.content_type(), "text/markdown");
        assert_eq!(file.name(), "notes.md");
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        let file = SourceFile::from_bytes("dump.bin", vec![0u8; 8]);
        assert_eq!(file.content_type(), "application/octet-stream");
    }

    #[test]
    fn read_span_from_memory() {
        let file = SourceFile::from_bytes("a.txt", b"0123456789".to_vec());
        let span = ChunkSpan {
            index: 1,
            offset: 4,
            len: 4,
        };
        assert_eq!(file.read_span(&span).unwrap(), b"4567");
    }

    #[test]
    fn read_span_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, b"abcdefgh").unwrap();

        let file = SourceFile::open(&path).unwrap();
        assert_eq!(file.size(), 8);
        let span = ChunkSpan {
            index: 0,
            offset: 2,
            len: 3,
        };
        assert_eq!(file.read_span(&span).unwrap(), b"cde");
    }

    #[test]
    fn read_span_past_end_fails() {
        let file = SourceFile::from_bytes("a.txt", b"short".to_vec());
        let span = ChunkSpan {
            index: 0,
            offset: 3,
            len: 10,
        };
        assert!(file.read_span(&span).is_err());
    }

    #[test]
    fn truncated_disk_file_fails_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, vec![0u8; 100]).unwrap();
        let file = SourceFile::open(&path).unwrap();

        // Shrink the file after the source was created.
        std::fs::write(&path, b"tiny").unwrap();
        let span = ChunkSpan {
            index: 0,
            offset: 0,
            len: 100,
        };
        assert!(file.read_span(&span).is_err());
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("REPORT.PDF"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
    }
}
