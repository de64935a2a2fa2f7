//! Line-delimited record files shared by the collector and the generator.

mod literal;

pub use literal::parse_literal;

use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::model::{InstructionExample, TranscriptRecord};

/// Result of reading one persisted line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Valid JSON
    Strict(Value),
    /// Not JSON, but valid in the older literal syntax
    Legacy(Value),
    /// Neither parser accepted the line
    Unparseable(String),
}

impl ParsedLine {
    pub fn value(&self) -> Option<&Value> {
        match self {
            ParsedLine::Strict(value) | ParsedLine::Legacy(value) => Some(value),
            ParsedLine::Unparseable(_) => None,
        }
    }
}

/// Parse a line as JSON, falling back to the legacy literal syntax
pub fn parse_line(line: &str) -> ParsedLine {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => ParsedLine::Strict(value),
        Err(json_err) => match parse_literal(line) {
            Ok(value) => ParsedLine::Legacy(value),
            Err(literal_err) => ParsedLine::Unparseable(format!(
                "not JSON ({}) nor a legacy literal ({})",
                json_err, literal_err
            )),
        },
    }
}

/// Identifiers already present in a transcript file, with per-format line counts
#[derive(Debug, Clone, Default)]
pub struct ProcessedIds {
    pub ids: HashSet<String>,
    pub strict_lines: usize,
    pub legacy_lines: usize,
    pub non_mapping_lines: usize,
    pub unparseable_lines: usize,
}

impl ProcessedIds {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns false if the id was already known
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Collect the top-level keys of every mapping line in `path`
///
/// A missing file yields an empty set. Lines that are neither JSON nor
/// legacy literals are counted and logged, never fatal.
pub fn load_processed_ids(path: &Path) -> Result<ProcessedIds, PipelineError> {
    let mut processed = ProcessedIds::default();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist yet, starting fresh", path.display());
            return Ok(processed);
        }
        Err(e) => return Err(e.into()),
    };

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = parse_line(line);
        match &parsed {
            ParsedLine::Strict(_) => processed.strict_lines += 1,
            ParsedLine::Legacy(_) => processed.legacy_lines += 1,
            ParsedLine::Unparseable(reason) => {
                warn!("{}:{}: skipping line: {}", path.display(), index + 1, reason);
                processed.unparseable_lines += 1;
                continue;
            }
        }

        match parsed.value() {
            Some(Value::Object(map)) => processed.ids.extend(map.keys().cloned()),
            _ => processed.non_mapping_lines += 1,
        }
    }

    Ok(processed)
}

/// Append-only writer that makes every record durable before returning
pub struct TranscriptWriter {
    file: File,
    path: PathBuf,
}

impl TranscriptWriter {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        create_parent_dir(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one line, then flush and sync it to disk
    pub fn append(&mut self, record: &TranscriptRecord) -> Result<(), PipelineError> {
        let mut line = record.to_line()?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// Read every transcript record from `path`
///
/// Each non-blank line must be a JSON object with exactly one string
/// value. The first line that is not aborts the load with its line number.
pub fn load_transcripts(path: &Path) -> Result<Vec<TranscriptRecord>, PipelineError> {
    let file = File::open(path)?;
    let mut records = Vec::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(parse_transcript_line(line, index + 1)?);
    }

    debug!("Loaded {} transcripts from {}", records.len(), path.display());
    Ok(records)
}

fn parse_transcript_line(line: &str, number: usize) -> Result<TranscriptRecord, PipelineError> {
    let parse_error = |reason: String| PipelineError::Parse {
        line: number,
        reason,
    };

    let value = match parse_line(line) {
        ParsedLine::Strict(value) => value,
        ParsedLine::Legacy(_) => {
            return Err(parse_error(
                "line uses the legacy literal format, re-save it as JSON".to_string(),
            ))
        }
        ParsedLine::Unparseable(reason) => return Err(parse_error(reason)),
    };

    let map = match value {
        Value::Object(map) => map,
        other => return Err(parse_error(format!("expected an object, found {}", other))),
    };
    if map.len() != 1 {
        return Err(parse_error(format!(
            "expected exactly one entry, found {}",
            map.len()
        )));
    }

    let Some((id, text)) = map.into_iter().next() else {
        return Err(parse_error("expected exactly one entry, found 0".to_string()));
    };
    match text {
        Value::String(text) => Ok(TranscriptRecord { id, text }),
        other => Err(parse_error(format!(
            "transcript for '{}' is not a string: {}",
            id, other
        ))),
    }
}

/// Write the whole dataset in one pass, replacing any previous file
pub fn write_dataset(path: &Path, examples: &[InstructionExample]) -> Result<(), PipelineError> {
    create_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for example in examples {
        serde_json::to_writer(&mut writer, example)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn create_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_parse_line_tags_format() {
        assert_eq!(
            parse_line(r#"{"a": "b"}"#),
            ParsedLine::Strict(json!({"a": "b"}))
        );
        assert_eq!(
            parse_line("{'a': 'b'}"),
            ParsedLine::Legacy(json!({"a": "b"}))
        );
        assert!(matches!(
            parse_line("{a: b}"),
            ParsedLine::Unparseable(_)
        ));
    }

    #[test]
    fn test_load_processed_ids_missing_file() {
        let dir = tempdir().unwrap();
        let processed = load_processed_ids(&dir.path().join("nope.jsonl")).unwrap();
        assert!(processed.is_empty());
    }

    #[test]
    fn test_load_processed_ids_mixed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"aaa\": \"one\"}\n",
                "{'bbb': 'two'}\n",
                "\n",
                "[\"not\", \"a\", \"mapping\"]\n",
                "{broken\n",
                "{\"ccc\": \"three\", \"ddd\": \"four\"}\n",
            ),
        )
        .unwrap();

        let processed = load_processed_ids(&path).unwrap();
        for id in ["aaa", "bbb", "ccc", "ddd"] {
            assert!(processed.contains(id), "missing {id}");
        }
        assert_eq!(processed.len(), 4);
        assert_eq!(processed.strict_lines, 3);
        assert_eq!(processed.legacy_lines, 1);
        assert_eq!(processed.non_mapping_lines, 1);
        assert_eq!(processed.unparseable_lines, 1);
    }

    #[test]
    fn test_load_processed_ids_survives_deeply_nested_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        fs::write(
            &path,
            format!("{{\"ok\": \"fine\"}}\n{}\n", "[".repeat(200_000)),
        )
        .unwrap();

        let processed = load_processed_ids(&path).unwrap();
        assert!(processed.contains("ok"));
        assert_eq!(processed.len(), 1);
        assert_eq!(processed.unparseable_lines, 1);
    }

    #[test]
    fn test_writer_appends_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("transcript.jsonl");

        let records = vec![
            TranscriptRecord::new("abc123", "chop onions dice garlic"),
            TranscriptRecord::new("q\"uote", "line one\nline two — 200°C"),
        ];

        let mut writer = TranscriptWriter::open(&path).unwrap();
        writer.append(&records[0]).unwrap();
        drop(writer);

        // Reopening appends rather than truncating
        let mut writer = TranscriptWriter::open(&path).unwrap();
        writer.append(&records[1]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert_eq!(load_transcripts(&path).unwrap(), records);
    }

    #[test]
    fn test_load_transcripts_rejects_multi_key_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        fs::write(&path, "{\"a\": \"x\"}\n{\"b\": \"y\", \"c\": \"z\"}\n").unwrap();

        match load_transcripts(&path) {
            Err(PipelineError::Parse { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("exactly one entry"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_transcripts_rejects_non_string_and_legacy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");

        fs::write(&path, "{\"a\": 42}\n").unwrap();
        assert!(matches!(
            load_transcripts(&path),
            Err(PipelineError::Parse { line: 1, .. })
        ));

        fs::write(&path, "\n{'a': 'x'}\n").unwrap();
        assert!(matches!(
            load_transcripts(&path),
            Err(PipelineError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_transcripts_keeps_empty_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        fs::write(&path, "{\"a\": \"\"}\n").unwrap();
        assert_eq!(
            load_transcripts(&path).unwrap(),
            vec![TranscriptRecord::new("a", "")]
        );
    }

    #[test]
    fn test_write_dataset_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.jsonl");
        fs::write(&path, "stale\nstale\nstale\n").unwrap();

        let example = InstructionExample {
            instruction: "do it".to_string(),
            input: "T".to_string(),
            output: "R".to_string(),
        };
        write_dataset(&path, &[example.clone()]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: InstructionExample = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, example);
    }
}
