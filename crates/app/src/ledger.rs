use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Ledger of uploaded document filenames, kept as one JSON file next to
/// the index snapshot. Re-uploading a filename keeps its first upload
/// timestamp.
pub struct DocumentLedger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
}

impl DocumentLedger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading document ledger {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing document ledger {}", path.display()))?
        } else {
            Vec::new()
        };

        Ok(Self { path, entries })
    }

    pub fn record(&mut self, filename: &str) -> Result<()> {
        if self.entries.iter().any(|entry| entry.filename == filename) {
            return Ok(());
        }

        self.entries.push(LedgerEntry {
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
        });
        self.save()
    }

    pub fn newest_first(&self) -> Vec<LedgerEntry> {
        let mut listed = self.entries.clone();
        listed.sort_by(|left, right| right.uploaded_at.cmp(&left.uploaded_at));
        listed
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating data dir {}", parent.display()))?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&tmp_path, json)
            .with_context(|| format!("writing document ledger {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("replacing document ledger {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentLedger;
    use tempfile::tempdir;

    #[test]
    fn records_survive_reopen() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("documents.json");

        let mut ledger = DocumentLedger::open(&path)?;
        ledger.record("a.pdf")?;
        ledger.record("b.pdf")?;

        let reopened = DocumentLedger::open(&path)?;
        let names: Vec<String> = reopened
            .newest_first()
            .into_iter()
            .map(|entry| entry.filename)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.pdf".to_string()));
        assert!(names.contains(&"b.pdf".to_string()));
        Ok(())
    }

    #[test]
    fn duplicate_uploads_keep_the_first_timestamp() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("documents.json");

        let mut ledger = DocumentLedger::open(&path)?;
        ledger.record("a.pdf")?;
        let first = ledger.newest_first()[0].uploaded_at;

        ledger.record("a.pdf")?;
        let listed = ledger.newest_first();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uploaded_at, first);
        Ok(())
    }
}
