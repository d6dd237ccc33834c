//! JSONL persistence for in-memory storage.
//!
//! One serialized [`Issue`] per line. Loading is resilient: bad lines are
//! skipped and reported, never fatal. Saving writes a `.tmp` sibling first
//! and renames it over the target.

use super::inner::InMemoryStoreInner;
use crate::domain::{Issue, IssueId};
use crate::error::{Error, Result};
use crate::storage::IssueStore;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Non-fatal problems found while loading a JSONL file.
///
/// The offending line is skipped; every other record still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line that is not a valid serialized issue.
    MalformedJson {
        /// 1-based line number in the file.
        line_number: usize,
        /// Parser message.
        error: String,
    },

    /// A second record with an identifier already loaded.
    ///
    /// The first occurrence wins.
    DuplicateId {
        /// The repeated identifier.
        id: IssueId,
        /// 1-based line number of the duplicate.
        line_number: usize,
    },
}

/// Load a store from a JSONL file.
///
/// Blank lines are ignored. Returns the store together with every warning
/// raised while reading.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read.
pub async fn load_from_jsonl(path: &Path) -> Result<(Box<dyn IssueStore>, Vec<LoadWarning>)> {
    let contents = tokio::fs::read_to_string(path).await?;

    let mut inner = InMemoryStoreInner::new();
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let issue: Issue = match serde_json::from_str(line) {
            Ok(issue) => issue,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if !seen.insert(issue.id) {
            warnings.push(LoadWarning::DuplicateId {
                id: issue.id,
                line_number,
            });
            continue;
        }
        inner.issues.push(issue);
    }

    tracing::debug!(
        path = %path.display(),
        loaded = inner.issues.len(),
        warnings = warnings.len(),
        "Loaded issues from JSONL"
    );

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

/// Save every issue in `storage` to a JSONL file with an atomic rename.
///
/// # Errors
///
/// Returns `Error::Io` on any filesystem failure and `Error::Json` if a
/// record cannot be serialized. On error the target file is unchanged.
pub async fn save_to_jsonl(storage: &dyn IssueStore, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    for issue in storage.export_all().await? {
        let json = serde_json::to_string(&issue).map_err(Error::Json)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    writer.get_ref().sync_all().await?;
    drop(writer);

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}
