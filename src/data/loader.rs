use std::collections::BTreeMap;

use crate::error::ParseError;

use super::model::{CellValue, Dataset, FileInput, Row, SourceFile};

/// Media types accepted as comma-separated input.
///
/// `application/vnd.ms-excel` is what Windows reports for `.csv` files when
/// Excel is installed.
pub const CSV_MEDIA_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "text/comma-separated-values",
    "text/x-csv",
    "application/vnd.ms-excel",
];

/// Media types accepted as tab-separated input.
pub const TSV_MEDIA_TYPES: &[&str] = &["text/tab-separated-values"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse a dropped file into a [`Dataset`].  Dispatch by declared media type.
///
/// The media type is checked before any byte is read, so a non-tabular file
/// fails with [`ParseError::InvalidFileType`] regardless of its content.
pub fn parse(file: &SourceFile) -> Result<Dataset, ParseError> {
    let delimiter = delimiter_for(&file.media_type)?;
    let (columns, rows) = read_table(&file.bytes, delimiter)?;
    Dataset::new(file.clone(), columns, rows)
}

/// Read (when still on disk) and parse an accepted file. Non-tabular files
/// are rejected before any I/O happens.
pub fn load(input: &FileInput) -> Result<Dataset, ParseError> {
    match input {
        FileInput::Loaded(file) => parse(file),
        FileInput::OnDisk {
            path,
            name,
            media_type,
        } => {
            delimiter_for(media_type)?;
            let bytes = std::fs::read(path).map_err(|e| ParseError::MalformedInput {
                message: format!("failed to read {name}: {e}"),
            })?;
            parse(&SourceFile::new(name.clone(), media_type.clone(), bytes))
        }
    }
}

/// Resolve the field delimiter for a media type, rejecting non-tabular types.
pub fn delimiter_for(media_type: &str) -> Result<u8, ParseError> {
    // Ignore parameters such as `; charset=utf-8`.
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if CSV_MEDIA_TYPES.contains(&essence.as_str()) {
        Ok(b',')
    } else if TSV_MEDIA_TYPES.contains(&essence.as_str()) {
        Ok(b'\t')
    } else {
        Err(ParseError::InvalidFileType {
            media_type: if media_type.is_empty() {
                "unknown type".to_string()
            } else {
                media_type.to_string()
            },
        })
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Layout: header row with column names, one record per data row.
/// Every record must have as many fields as the header.
fn read_table(bytes: &[u8], delimiter: u8) -> Result<(Vec<String>, Vec<Row>), ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.map_err(malformed)?;

        let row: BTreeMap<String, CellValue> = columns
            .iter()
            .zip(record.iter())
            .map(|(col, raw)| (col.clone(), infer_value(raw)))
            .collect();

        rows.push(row);
    }

    log::debug!("parsed {} columns and {} rows", columns.len(), rows.len());
    Ok((columns, rows))
}

fn malformed(err: csv::Error) -> ParseError {
    ParseError::MalformedInput {
        message: err.to_string(),
    }
}

/// Permissive type inference for a single field.
///
/// Empty → null, `true`/`false` (lower or upper case) → bool, integer literal
/// → integer, finite decimal literal → float, anything else stays text.
/// An explicit leading `+` is not a number literal.
pub fn infer_value(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    match s {
        "true" | "TRUE" => return CellValue::Bool(true),
        "false" | "FALSE" => return CellValue::Bool(false),
        _ => {}
    }
    if s.starts_with('+') {
        return CellValue::Text(raw.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if looks_numeric(s) {
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
    }
    CellValue::Text(raw.to_string())
}

/// `f64::from_str` also accepts `inf` and `NaN`; only plain decimal and
/// exponent notation counts as numeric here.
fn looks_numeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
