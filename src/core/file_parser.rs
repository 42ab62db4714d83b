//! File import front-end
//!
//! Reads CSV and Excel files for the user import and feeds them through the
//! same header mapping and row validation as in-memory text.
//!
//! ## Features
//!
//! - **Formats**: CSV (`.csv`) and Excel (`.xlsx`/`.xls`), allow-listed by [`ImportConfig`]
//! - **Size limit**: files above `max_file_size_bytes` are rejected before reading
//! - **Encodings**: BOM sniffing, UTF-8, and legacy Arabic-script code pages
//!   (windows-1256, ISO-8859-6) detected with chardetng
//! - **Row numbers**: Excel records are numbered by worksheet row

use calamine::{open_workbook_auto, DataType, Reader};
use chardetng::EncodingDetector as ChardetngDetector;
use encoding_rs::{Encoding, ISO_8859_6, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1256};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc, time::Instant};
use tracing::{debug, error, info, warn};

use crate::core::config::ImportConfig;
use crate::core::importer::build_report;
use crate::core::models::{trim_cell, ImportError, ImportReport, ImportResult, Row};
use crate::core::schema::{RecordValidator, UserSchema};
use crate::core::tokenizer;
use crate::utils::file_utils::get_file_extension;

/// Statistics of one file import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseStats {
    /// Records returned (blank rows excluded)
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    /// Encoding the text was decoded with
    pub detected_encoding: String,
    pub file_format: FileFormat,
    pub file_size: u64,
    /// Wall time in milliseconds
    pub parse_time_ms: u64,
}

/// Supported file formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    /// XLS/XLSX workbooks, first worksheet only
    Excel,
}

/// Picks the text encoding of an uploaded CSV.
///
/// Order: BOM, valid UTF-8, chardetng's guess, then the priority list. A
/// legacy guess is only trusted when it decodes cleanly into text that
/// contains Arabic-script letters.
pub struct EncodingDetector {
    /// Top-level domain hint passed to chardetng
    tld_hint: Option<&'static [u8]>,
    priority_encodings: Vec<&'static Encoding>,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            tld_hint: Some(&b"ir"[..]),
            priority_encodings: vec![UTF_8, WINDOWS_1256, ISO_8859_6],
        }
    }
}

impl EncodingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tld_hint(mut self, tld: Option<&'static [u8]>) -> Self {
        self.tld_hint = tld;
        self
    }

    pub fn with_priority_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.priority_encodings = encodings;
        self
    }

    /// Detect the encoding of raw file bytes
    pub fn detect(&self, data: &[u8]) -> &'static Encoding {
        if data.is_empty() {
            return UTF_8;
        }

        if let Some(encoding) = detect_bom(data) {
            debug!("Encoding from BOM: {}", encoding.name());
            return encoding;
        }

        if std::str::from_utf8(data).is_ok() {
            return UTF_8;
        }

        let mut detector = ChardetngDetector::new();
        detector.feed(data, true);
        let guess = detector.guess(self.tld_hint, false);
        if decodes_to_persian(data, guess) {
            debug!("Encoding from chardetng: {}", guess.name());
            return guess;
        }

        for &encoding in &self.priority_encodings {
            if encoding == UTF_8 {
                continue;
            }
            if decodes_to_persian(data, encoding) {
                debug!("Encoding from priority list: {}", encoding.name());
                return encoding;
            }
        }

        let (_, _, has_errors) = guess.decode(data);
        if has_errors {
            warn!("No clean decoding found, falling back to {}", WINDOWS_1256.name());
            WINDOWS_1256
        } else {
            guess
        }
    }

    /// Decode bytes to text, dropping any BOM
    pub fn decode(&self, data: &[u8]) -> (String, &'static Encoding) {
        let encoding = self.detect(data);
        let (text, actual, has_errors) = encoding.decode(data);
        if has_errors {
            warn!("Malformed sequences replaced while decoding as {}", actual.name());
        }
        (text.into_owned(), actual)
    }
}

fn detect_bom(data: &[u8]) -> Option<&'static Encoding> {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(UTF_8)
    } else if data.starts_with(&[0xFF, 0xFE]) {
        Some(UTF_16LE)
    } else if data.starts_with(&[0xFE, 0xFF]) {
        Some(UTF_16BE)
    } else {
        None
    }
}

fn decodes_to_persian(data: &[u8], encoding: &'static Encoding) -> bool {
    let (decoded, has_errors) = encoding.decode_without_bom_handling(data);
    !has_errors && is_reasonable_text(&decoded)
}

/// Few control characters and at least one Arabic-script letter
fn is_reasonable_text(text: &str) -> bool {
    let mut total = 0usize;
    let mut control = 0usize;
    let mut arabic_script = 0usize;

    for ch in text.chars() {
        total += 1;
        match ch {
            '\t' | '\n' | '\r' => {}
            c if c.is_control() => control += 1,
            '\u{0600}'..='\u{06FF}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFC}' => {
                arabic_script += 1
            }
            _ => {}
        }
    }

    total > 0 && arabic_script > 0 && (control as f64 / total as f64) <= 0.1
}

/// Imports user files according to an [`ImportConfig`]
pub struct UserImporter {
    config: ImportConfig,
    encoding_detector: EncodingDetector,
    validator: Arc<dyn RecordValidator + Send + Sync>,
}

impl Default for UserImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserImporter {
    pub fn new() -> Self {
        Self::with_config(ImportConfig::default())
    }

    pub fn with_config(config: ImportConfig) -> Self {
        Self {
            config,
            encoding_detector: EncodingDetector::new(),
            validator: Arc::new(UserSchema::new()),
        }
    }

    /// Replace the default [`UserSchema`]
    pub fn with_validator(mut self, validator: Arc<dyn RecordValidator + Send + Sync>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_encoding_detector(mut self, detector: EncodingDetector) -> Self {
        self.encoding_detector = detector;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import a CSV or Excel file
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> ImportResult<(ImportReport, ParseStats)> {
        let path = file_path.as_ref();
        info!("Importing users from {}", path.display());
        let start_time = Instant::now();

        let format = self.detect_file_format(path)?;

        let file_size = tokio::fs::metadata(path).await?.len();
        if file_size > self.config.max_file_size_bytes {
            warn!(
                "Rejecting {}: {} bytes exceeds limit of {}",
                path.display(),
                file_size,
                self.config.max_file_size_bytes
            );
            return Err(ImportError::FileTooLarge {
                size: file_size,
                limit: self.config.max_file_size_bytes,
            });
        }

        let result = match format {
            FileFormat::Csv => {
                let bytes = tokio::fs::read(path).await?;
                self.import_csv_bytes(&bytes)
                    .map(|(report, encoding)| (report, encoding.name().to_string()))
            }
            FileFormat::Excel => self
                .import_excel(path)
                .map(|report| (report, UTF_8.name().to_string())),
        };

        match result {
            Ok((report, detected_encoding)) => {
                let summary = report.summary();
                let stats = ParseStats {
                    total_rows: summary.total_rows,
                    valid_rows: summary.valid_rows,
                    invalid_rows: summary.invalid_rows,
                    detected_encoding,
                    file_format: format,
                    file_size,
                    parse_time_ms: start_time.elapsed().as_millis() as u64,
                };

                info!(
                    "Import of {} finished: {} rows, {} valid, {} invalid, encoding {}, {}ms",
                    path.display(),
                    stats.total_rows,
                    stats.valid_rows,
                    stats.invalid_rows,
                    stats.detected_encoding,
                    stats.parse_time_ms
                );
                Ok((report, stats))
            }
            Err(e) => {
                error!("Import of {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Decode raw CSV bytes and run the text pipeline
    pub fn import_csv_bytes(
        &self,
        bytes: &[u8],
    ) -> ImportResult<(ImportReport, &'static Encoding)> {
        let (text, encoding) = self.encoding_detector.decode(bytes);
        debug!("Decoded {} bytes as {}", bytes.len(), encoding.name());

        let rows = tokenizer::parse(&text);
        let report = build_report(rows, self.config.has_header, self.validator.as_ref())?;
        Ok((report, encoding))
    }

    fn import_excel(&self, path: &Path) -> ImportResult<ImportReport> {
        let rows = read_excel_rows(path)?;
        build_report(rows, self.config.has_header, self.validator.as_ref())
    }

    /// Classify the file by extension, honouring the configured allow-list
    pub fn detect_file_format(&self, path: &Path) -> ImportResult<FileFormat> {
        let Some(ext) = get_file_extension(path) else {
            return Err(ImportError::UnsupportedFileType(path.display().to_string()));
        };

        if !self.config.allows_extension(ext) {
            return Err(ImportError::UnsupportedFileType(ext.to_string()));
        }

        match ext.to_lowercase().as_str() {
            "csv" | "txt" => Ok(FileFormat::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(FileFormat::Excel),
            _ => Err(ImportError::UnsupportedFileType(ext.to_string())),
        }
    }
}

/// Read the first worksheet into non-blank rows
pub fn read_excel_rows(path: &Path) -> ImportResult<Vec<Row>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ImportError::Excel(format!("Failed to open workbook: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => {
            range.map_err(|e| ImportError::Excel(format!("Failed to read sheet: {}", e)))?
        }
        None => return Err(ImportError::EmptyFile),
    };

    let first_record = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let (height, width) = range.get_size();
    debug!("Worksheet size: {} rows x {} columns", height, width);

    Ok(rows_from_cells(first_record, range.rows()))
}

/// Convert worksheet rows, numbering them from `first_record`
pub fn rows_from_cells<'a, I>(first_record: usize, rows: I) -> Vec<Row>
where
    I: IntoIterator<Item = &'a [DataType]>,
{
    rows.into_iter()
        .enumerate()
        .filter_map(|(offset, cells)| {
            let cells: Vec<String> = cells
                .iter()
                .map(|cell| trim_cell(&datatype_to_string(cell)).to_string())
                .collect();
            let row = Row::new(first_record + offset, cells);
            (!row.is_blank()).then_some(row)
        })
        .collect()
}

/// Stringify a cell; integral floats lose their fraction.
///
/// Numeric cells carry no leading zeros, so a phone number typed into
/// Excel as a number comes back as `9123456789` rather than `09123456789`.
/// Only text-formatted cells keep the digits as entered.
pub fn datatype_to_string(data: &DataType) -> String {
    match data {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(dt) => dt.to_string(),
        DataType::Error(err) => format!("ERROR: {:?}", err),
        DataType::DurationIso(d) => d.to_string(),
        DataType::DateTimeIso(dt) => dt.to_string(),
        DataType::Duration(d) => format!("{}", d),
    }
}

#[cfg(test)]
impl EncodingDetector {
    pub(crate) fn test_detect_bom(&self, data: &[u8]) -> Option<&'static Encoding> {
        detect_bom(data)
    }

    pub(crate) fn test_is_reasonable_text(&self, text: &str) -> bool {
        is_reasonable_text(text)
    }
}
