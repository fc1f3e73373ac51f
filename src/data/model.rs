use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// CellValue – a single field of a data row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value produced by permissive type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceFile – the raw file as dropped by the user
// ---------------------------------------------------------------------------

/// A file handed to the client, with the media type it was declared as.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original file name, preserved for the upload.
    pub name: String,
    /// Declared media type, e.g. `text/csv`.
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Build a file whose media type is derived from its extension.
    ///
    /// Used when the platform reports no MIME type (file dialogs, most
    /// native drag and drop implementations).
    pub fn from_extension(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let media_type = media_type_for(Path::new(&name));
        Self::new(name, media_type, bytes)
    }
}

/// A file accepted for ingestion: either already in memory (dropped with its
/// bytes) or still on disk, read by the parse job.
#[derive(Debug, Clone)]
pub enum FileInput {
    Loaded(SourceFile),
    OnDisk {
        path: PathBuf,
        name: String,
        media_type: String,
    },
}

impl FileInput {
    /// A file on disk; `declared` overrides the extension-derived media type.
    pub fn on_disk(path: impl Into<PathBuf>, declared: Option<&str>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = declared.unwrap_or_else(|| media_type_for(&path)).to_string();
        FileInput::OnDisk {
            path,
            name,
            media_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FileInput::Loaded(file) => &file.name,
            FileInput::OnDisk { name, .. } => name,
        }
    }

    pub fn media_type(&self) -> &str {
        match self {
            FileInput::Loaded(file) => &file.media_type,
            FileInput::OnDisk { media_type, .. } => media_type,
        }
    }
}

impl From<SourceFile> for FileInput {
    fn from(file: SourceFile) -> Self {
        FileInput::Loaded(file)
    }
}

/// Map a file extension to the media type a browser would declare for it.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => "text/csv",
        "tsv" | "tab" => "text/tab-separated-values",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Dataset – the parsed table
// ---------------------------------------------------------------------------

/// One data row: column name → value.
pub type Row = BTreeMap<String, CellValue>;

/// A validated, non-empty table together with the file it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: SourceFile,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Assemble a dataset, enforcing the schema invariants.
    ///
    /// * column names are unique
    /// * there is at least one row
    /// * every row has exactly the columns of the header
    pub fn new(source: SourceFile, columns: Vec<String>, rows: Vec<Row>) -> Result<Self, ParseError> {
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(ParseError::MalformedInput {
                    message: format!("duplicate column name '{col}'"),
                });
            }
        }

        if rows.is_empty() {
            return Err(ParseError::EmptyDataset);
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() || !columns.iter().all(|c| row.contains_key(c)) {
                return Err(ParseError::MalformedInput {
                    message: format!("row {} does not match the header", i + 1),
                });
            }
        }

        Ok(Self {
            source,
            columns,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed dataset.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
