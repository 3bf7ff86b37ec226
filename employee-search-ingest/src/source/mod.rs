//! CSV source for the employee search ingest.
//!
//! Reads a delimited file with a header row, decodes it with the configured
//! text encoding and turns every data row into a `Document`.

mod values;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::errors::IngestError;
use employee_search_shared::Document;

pub use values::{infer_column_type, is_missing, to_json, ColumnType, NA_MARKERS};

/// Default source file.
pub const DEFAULT_SOURCE_PATH: &str = "EmployeeSampleData1.csv";

/// Default text encoding label.
pub const DEFAULT_ENCODING: &str = "ISO-8859-1";

/// Configuration for a CSV source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Path of the file to read.
    pub path: PathBuf,
    /// WHATWG encoding label used to decode the file.
    pub encoding: String,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SOURCE_PATH),
            encoding: DEFAULT_ENCODING.to_string(),
            delimiter: b',',
        }
    }
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create a config with a custom encoding label.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Create a config with a custom delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Rows read from a source, ready for indexing.
#[derive(Debug, Clone, Default)]
pub struct SourceRecords {
    /// Column names in header order, after exclusion.
    pub columns: Vec<String>,
    /// One document per data row.
    pub documents: Vec<Document>,
    /// The excluded column, if it was present.
    pub dropped_column: Option<String>,
}

/// A CSV file decoded with a configurable encoding.
#[derive(Debug, Clone)]
pub struct CsvSource {
    config: SourceConfig,
}

impl CsvSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Read the file into documents, dropping `excluded` if it is a column.
    ///
    /// Missing cells become `null` and every column gets a single inferred
    /// type. Rows with fewer fields than the header are padded with `null`;
    /// rows with more are rejected.
    #[instrument(skip(self), fields(path = %self.config.path.display()))]
    pub async fn read(&self, excluded: Option<&str>) -> Result<SourceRecords, IngestError> {
        let bytes = tokio::fs::read(&self.config.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    IngestError::SourceNotFound(self.config.path.display().to_string())
                }
                _ => IngestError::read(format!("{}: {}", self.config.path.display(), e)),
            })?;

        let text = self.decode(&bytes)?;
        let (columns, rows) = self.parse(&text)?;
        let records = build_records(columns, rows, excluded);

        info!(
            rows = records.documents.len(),
            columns = records.columns.len(),
            "Source read"
        );
        Ok(records)
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, IngestError> {
        // WHATWG resolves latin-1 labels to windows-1252, which remaps 0x80..=0x9F.
        if is_latin1_label(&self.config.encoding) {
            debug!(encoding = "ISO-8859-1", "Source decoded");
            return Ok(bytes.iter().copied().map(char::from).collect());
        }

        let encoding = Encoding::for_label(self.config.encoding.as_bytes()).ok_or_else(|| {
            IngestError::read(format!("unknown encoding label '{}'", self.config.encoding))
        })?;

        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(IngestError::read(format!(
                "{} is not valid {}",
                self.config.path.display(),
                used.name()
            )));
        }

        debug!(encoding = used.name(), "Source decoded");
        Ok(text.into_owned())
    }

    fn parse(&self, text: &str) -> Result<(Vec<String>, Vec<Vec<Option<String>>>), IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns = dedupe_headers(reader.headers()?.iter());
        let mut rows = Vec::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() > columns.len() {
                return Err(IngestError::malformed_row(
                    line,
                    format!("expected {} fields, saw {}", columns.len(), record.len()),
                ));
            }

            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
                .collect();
            row.resize(columns.len(), None);
            rows.push(row);
        }

        Ok((columns, rows))
    }
}

/// True for labels naming ISO-8859-1 proper, where every byte is its own code point.
fn is_latin1_label(label: &str) -> bool {
    let normalized: String = label
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "iso88591" | "iso8859" | "latin1" | "latin" | "l1" | "cp819" | "8859"
    )
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        let mut n = 0;
        while columns.contains(&name) {
            n += 1;
            name = format!("{}.{}", header, n);
        }
        columns.push(name);
    }
    columns
}

fn build_records(
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    excluded: Option<&str>,
) -> SourceRecords {
    let dropped_index = excluded.and_then(|name| columns.iter().position(|c| c == name));
    if let (Some(name), None) = (excluded, dropped_index) {
        warn!(column = %name, "Excluded column is not in the source; nothing dropped");
    }

    let types: Vec<ColumnType> = (0..columns.len())
        .map(|i| infer_column_type(rows.iter().map(|row| row[i].as_deref())))
        .collect();

    let documents = rows
        .iter()
        .map(|row| {
            let mut doc = Document::new();
            for (i, column) in columns.iter().enumerate() {
                if Some(i) == dropped_index {
                    continue;
                }
                let value: Value = to_json(row[i].as_deref(), types[i]);
                doc.insert(column.clone(), value);
            }
            doc
        })
        .collect();

    let dropped_column = dropped_index.map(|i| columns[i].clone());
    let columns = columns
        .into_iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != dropped_index)
        .map(|(_, c)| c)
        .collect();

    SourceRecords {
        columns,
        documents,
        dropped_column,
    }
}
