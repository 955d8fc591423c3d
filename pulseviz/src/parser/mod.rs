//! CSV loader with encoding and delimiter auto-detection.
//!
//! Produces a [`RawTable`] where every cell is either a value or an explicit
//! missing marker. No pulse-specific logic here.

use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{RawRecord, RawTable};

/// Cell texts treated as missing (compared case-insensitively after trimming).
pub const DEFAULT_MISSING_MARKERS: [&str; 6] = ["NA", "N/A", "NaN", "null", "None", "-"];

pub fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS.iter().map(|m| m.to_string()).collect()
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed wide table
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl ParseResult {
    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }
}

/// Detect the encoding of raw bytes.
///
/// Bytes that are valid UTF-8 are always reported as `utf-8`; chardet is only
/// consulted for anything else, where an undecided guess falls back to Latin-1.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "" | "ascii" => "iso-8859-1".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
        // WHATWG maps the Latin-1 label onto windows-1252, a superset.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => Ok(enc.decode(bytes).0.into_owned()),
            None => Err(CsvError::EncodingError(format!("unsupported encoding '{}'", other))),
        },
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

fn is_missing(value: &str, markers: &[String]) -> bool {
    let value = value.trim();
    value.is_empty() || markers.iter().any(|m| m.trim().eq_ignore_ascii_case(value))
}

/// Parse CSV from a reader with an explicit delimiter.
///
/// Blank header cells are named `Unnamed: <index>`. Short rows are padded
/// with missing cells; extra cells are ignored.
pub fn parse_csv<R: Read>(reader: R, delimiter: char, markers: &[String]) -> CsvResult<RawTable> {
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(1, &e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.is_empty() {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(line, &e)
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let cells = (0..headers.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|v| !is_missing(v, markers))
                    .map(str::to_string)
            })
            .collect();

        records.push(RawRecord::new(line, cells));
    }

    Ok(RawTable::new(headers, records))
}

fn malformed(line: u64, err: &csv::Error) -> CsvError {
    CsvError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Parse CSV bytes, auto-detecting the encoding and, unless given, the delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>, markers: &[String]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let content = content.trim_start_matches('\u{feff}');

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(content));
    let table = parse_csv(content.as_bytes(), delimiter, markers)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse CSV bytes with auto-detection and the default missing markers.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    parse_bytes(bytes, None, &default_missing_markers())
}

/// Parse CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("exercise.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Records: {}", result.table.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}
