// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON Lines interchange for example sets and raw records.
//!
//! One record per line keeps datasets diffable and lets offline tools stream
//! them. Export writes to a temporary sibling and renames it into place, so a
//! reader never sees a half-written dataset.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use switchyard_core::text::normalize_query;
use switchyard_core::{SwitchyardError, TrainingExample};
use tracing::info;

/// Write examples to `path`, sorted by normalized query. Returns the count written.
pub fn export_examples(
    examples: &[TrainingExample],
    path: &Path,
) -> Result<usize, SwitchyardError> {
    let mut sorted: Vec<&TrainingExample> = examples.iter().collect();
    sorted.sort_by_cached_key(|e| (normalize_query(&e.query), e.expected_tool.clone()));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write_lines(&mut writer, sorted.iter().copied())?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), count = sorted.len(), "exported examples");
    Ok(sorted.len())
}

/// Read an example set previously written by [`export_examples`].
pub fn import_examples(path: &Path) -> Result<Vec<TrainingExample>, SwitchyardError> {
    read_records(path)
}

/// Serialize each item as one JSON line.
pub fn write_lines<'a, T, W>(
    writer: &mut W,
    items: impl IntoIterator<Item = &'a T>,
) -> Result<(), SwitchyardError>
where
    T: Serialize + 'a,
    W: Write,
{
    for item in items {
        serde_json::to_writer(&mut *writer, item)
            .map_err(|e| SwitchyardError::Internal(format!("failed to serialize record: {e}")))?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Read a JSON Lines file of any record type. Blank lines are skipped.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SwitchyardError> {
    let file = File::open(path)?;
    parse_lines(BufReader::new(file), &path.display().to_string())
}

/// Parse JSON Lines from any reader; `origin` labels error messages.
pub fn parse_lines<T: DeserializeOwned, R: BufRead>(
    reader: R,
    origin: &str,
) -> Result<Vec<T>, SwitchyardError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| {
            SwitchyardError::InvalidInput(format!("{origin}:{}: {e}", index + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use switchyard_core::{Arguments, Provenance, SourceKind};

    use super::*;

    fn example(query: &str, tool: &str) -> TrainingExample {
        TrainingExample {
            query: query.into(),
            expected_tool: tool.into(),
            expected_arguments: Arguments::new(),
            provenance: Provenance {
                source: SourceKind::History,
                timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                correction_id: None,
            },
        }
    }

    #[test]
    fn export_writes_one_sorted_line_per_example() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dataset.jsonl");
        let examples = vec![example("zip the logs", "archive"), example("Add a note", "note")];

        let written = export_examples(&examples, &path).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Add a note"));
        assert!(!path.with_extension("jsonl.tmp").exists());

        let imported = import_examples(&path).unwrap();
        assert_eq!(imported[0], examples[1]);
        assert_eq!(imported[1], examples[0]);
    }

    #[test]
    fn malformed_line_reports_position() {
        let input = "{\"query\": 1}\n";
        let err = parse_lines::<TrainingExample, _>(input.as_bytes(), "corrections.jsonl")
            .unwrap_err();
        assert!(err.to_string().contains("corrections.jsonl:1"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let line = serde_json::to_string(&example("open readme", "read_file")).unwrap();
        let input = format!("\n{line}\n\n");
        let parsed: Vec<TrainingExample> = parse_lines(input.as_bytes(), "inline").unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
