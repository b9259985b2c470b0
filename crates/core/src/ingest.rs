use crate::chunking::{chunk_pages, ChunkingConfig};
use crate::error::IngestError;
use crate::extractor::extract_page_texts;
use crate::models::{DocumentRecord, Passage};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn build_document_record(path: &Path) -> Result<DocumentRecord, IngestError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })?;
    let checksum = digest_file(path)?;

    Ok(DocumentRecord {
        document_id: name.to_string(),
        source_path: path.to_string_lossy().to_string(),
        checksum,
        loaded_at: Utc::now(),
    })
}

/// Load-then-chunk stage for one file: extracts page texts and windows
/// them into passages with document-wide ordinals starting at `cursor`.
/// Any failure names the offending file; a text-free PDF yields zero
/// passages.
pub fn collect_file_passages(
    path: &Path,
    config: ChunkingConfig,
    cursor: u64,
) -> Result<(DocumentRecord, Vec<Passage>, u64), IngestError> {
    let pages = extract_page_texts(path)?;
    let record = build_document_record(path)?;
    let (passages, next_cursor) = chunk_pages(&record.document_id, &pages, config, cursor);
    Ok((record, passages, next_cursor))
}

#[cfg(test)]
mod tests {
    use super::{build_document_record, collect_file_passages, digest_file, discover_pdf_files};
    use crate::chunking::ChunkingConfig;
    use crate::error::IngestError;
    use crate::extractor::pdf_fixtures::write_single_page_pdf;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.pdf"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt")).and_then(|mut file| file.write_all(b"not a pdf"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn checksum_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a.pdf");
        fs::write(&file_path, b"abc")?;

        let first = digest_file(&file_path)?;
        let second = digest_file(&file_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn document_record_uses_filename_as_id() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("manual.pdf");
        fs::write(&file_path, b"%PDF-1.4\n%fake")?;

        let record = build_document_record(&file_path)?;
        assert_eq!(record.document_id, "manual.pdf");
        assert!(!record.checksum.is_empty());
        Ok(())
    }

    #[test]
    fn readable_pdf_produces_passages() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("facts.pdf");
        write_single_page_pdf(&file_path, "The quick brown fox jumps over the lazy dog.");

        let config = ChunkingConfig {
            max_chars: 1_000,
            overlap_chars: 150,
        };
        let (record, passages, next) = collect_file_passages(&file_path, config, 0)?;

        assert_eq!(record.document_id, "facts.pdf");
        assert_eq!(passages.len(), 1);
        assert!(passages[0].text.contains("quick brown fox"));
        assert_eq!(next, 1);
        Ok(())
    }

    #[test]
    fn corrupt_pdf_aborts_naming_the_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("unreadable.pdf");
        fs::write(&file_path, b"%PDF-1.4\n%broken")?;

        let config = ChunkingConfig {
            max_chars: 1_000,
            overlap_chars: 150,
        };
        let error = collect_file_passages(&file_path, config, 0)
            .expect_err("corrupt pdf should abort");

        match error {
            IngestError::DocumentLoad { path, .. } => assert!(path.ends_with("unreadable.pdf")),
            other => panic!("expected DocumentLoad, got {other:?}"),
        }
        Ok(())
    }
}
