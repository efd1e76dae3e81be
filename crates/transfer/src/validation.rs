//! Pre-flight screening of candidate files.
//!
//! Rejections are reported synchronously at add-time; a rejected file never
//! becomes a task and is never retried.

use crate::source::{SourceFile, extension_of};
use crate::types::{BatchLimits, Rejection};

/// Why a candidate file was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("unsupported file type: {extension:?}")]
    UnsupportedType { extension: String },

    #[error("a file with the same name and size is already in the batch")]
    DuplicateFile,

    #[error("batch is full ({max} files)")]
    BatchFull { max: usize },
}

/// Screens `candidates` against the batch limits and the files already in
/// the batch, preserving input order.
///
/// Per file, first failure wins: remaining capacity, then size, then
/// extension allow-list, then `(name, size)` duplicate (against both the
/// live batch and earlier accepted candidates). A rejected file does not
/// consume a batch slot.
pub fn screen_files(
    candidates: Vec<SourceFile>,
    existing: &[(String, u64)],
    limits: &BatchLimits,
) -> (Vec<SourceFile>, Vec<Rejection>) {
    let mut accepted: Vec<SourceFile> = Vec::new();
    let mut rejected: Vec<Rejection> = Vec::new();
    let capacity = limits.max_files.saturating_sub(existing.len());

    for file in candidates {
        let reason = check_one(&file, &accepted, existing, limits, capacity);
        match reason {
            Some(reason) => rejected.push(Rejection {
                file_name: file.name().to_string(),
                reason,
            }),
            None => accepted.push(file),
        }
    }

    (accepted, rejected)
}

fn check_one(
    file: &SourceFile,
    accepted: &[SourceFile],
    existing: &[(String, u64)],
    limits: &BatchLimits,
    capacity: usize,
) -> Option<ValidationError> {
    if accepted.len() >= capacity {
        return Some(ValidationError::BatchFull {
            max: limits.max_files,
        });
    }
    if file.size() > limits.max_file_size {
        return Some(ValidationError::FileTooLarge {
            size: file.size(),
            limit: limits.max_file_size,
        });
    }
    let extension = extension_of(file.name());
    if !limits.accepted_extensions.iter().any(|e| *e == extension) {
        return Some(ValidationError::UnsupportedType { extension });
    }
    let duplicate = existing
        .iter()
        .any(|(name, size)| *name == file.name() && *size == file.size())
        || accepted
            .iter()
            .any(|a| a.name() == file.name() && a.size() == file.size());
    if duplicate {
        return Some(ValidationError::DuplicateFile);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> SourceFile {
        SourceFile::from_bytes(name, vec![0u8; size])
    }

    fn limits() -> BatchLimits {
        BatchLimits {
            max_files: 3,
            max_file_size: 100,
            accepted_extensions: vec!["pdf".into(), "txt".into()],
            ..BatchLimits::default()
        }
    }

    #[test]
    fn accepts_valid_files_in_order() {
        let (accepted, rejected) =
            screen_files(vec![file("a.pdf", 10), file("b.txt", 20)], &[], &limits());
        assert_eq!(rejected.len(), 0);
        let names: Vec<&str> = accepted.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["a.pdf", "b.txt"]);
    }

    #[test]
    fn rejects_oversized_file() {
        let (accepted, rejected) = screen_files(vec![file("big.pdf", 101)], &[], &limits());
        assert!(accepted.is_empty());
        assert_eq!(
            rejected[0].reason,
            ValidationError::FileTooLarge {
                size: 101,
                limit: 100
            }
        );
    }

    #[test]
    fn rejects_unsupported_extension() {
        let (_, rejected) = screen_files(vec![file("movie.mp4", 10)], &[], &limits());
        assert_eq!(
            rejected[0].reason,
            ValidationError::UnsupportedType {
                extension: "mp4".into()
            }
        );
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let (accepted, rejected) = screen_files(vec![file("REPORT.PDF", 10)], &[], &limits());
        assert_eq!(accepted.len(), 1);
        assert!(rejected.is_empty());
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let (_, rejected) = screen_files(vec![file("README", 10)], &[], &limits());
        assert!(matches!(
            rejected[0].reason,
            ValidationError::UnsupportedType { .. }
        ));
    }

    #[test]
    fn rejects_duplicate_against_batch() {
        let existing = vec![("a.pdf".to_string(), 10u64)];
        let (_, rejected) = screen_files(vec![file("a.pdf", 10)], &existing, &limits());
        assert_eq!(rejected[0].reason, ValidationError::DuplicateFile);
    }

    #[test]
    fn same_name_different_size_is_not_duplicate() {
        let existing = vec![("a.pdf".to_string(), 10u64)];
        let (accepted, _) = screen_files(vec![file("a.pdf", 11)], &existing, &limits());
        assert_eq!(accepted.len(), 1);
    }

    #[test]
    fn rejects_duplicate_within_same_call() {
        let (accepted, rejected) =
            screen_files(vec![file("a.pdf", 10), file("a.pdf", 10)], &[], &limits());
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected[0].reason, ValidationError::DuplicateFile);
    }

    #[test]
    fn truncates_to_remaining_capacity() {
        let existing = vec![("x.pdf".to_string(), 1u64), ("y.pdf".to_string(), 2u64)];
        let (accepted, rejected) = screen_files(
            vec![file("a.pdf", 10), file("b.pdf", 10)],
            &existing,
            &limits(),
        );
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].reason, ValidationError::BatchFull { max: 3 });
    }

    #[test]
    fn invalid_file_does_not_consume_a_slot() {
        // Capacity 3: one oversized file in the middle must not push the
        // fourth valid file over the limit.
        let (accepted, rejected) = screen_files(
            vec![
                file("a.pdf", 10),
                file("big.pdf", 500),
                file("b.pdf", 10),
                file("c.pdf", 10),
            ],
            &[],
            &limits(),
        );
        assert_eq!(accepted.len(), 3);
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn eleventh_file_rejected_with_defaults() {
        let limits = BatchLimits::default();
        let candidates: Vec<SourceFile> = (0..11)
            .map(|i| file(&format!("doc{i}.pdf"), 100 + i))
            .collect();
        let (accepted, rejected) = screen_files(candidates, &[], &limits);
        assert_eq!(accepted.len(), 10);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].file_name, "doc10.pdf");
        assert_eq!(rejected[0].reason, ValidationError::BatchFull { max: 10 });
    }
}
