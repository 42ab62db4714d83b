//! Core data models for the user import pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One tokenized CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based position of the logical record in the source text.
    /// Blank records still advance it; a quoted multi-line cell is one record.
    pub record: usize,

    pub cells: Vec<String>,
}

impl Row {
    pub fn new(record: usize, cells: Vec<String>) -> Self {
        Self { record, cells }
    }

    /// True when every cell is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| trim_cell(cell).is_empty())
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// Trim whitespace and byte-order marks from a cell.
pub fn trim_cell(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// User account status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,

    Inactive,

    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Banned => "banned",
        }
    }

    /// Label shown to admins and written by the exporter
    pub fn persian_label(&self) -> &'static str {
        match self {
            Self::Active => "فعال",
            Self::Inactive => "غیرفعال",
            Self::Banned => "مسدود",
        }
    }
}

/// Field values extracted from one data row, before acceptance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,

    pub email: String,

    pub phone: String,

    pub telegram_id: String,

    pub balance: f64,

    pub status: UserStatus,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            telegram_id: String::new(),
            balance: 0.0,
            status: UserStatus::Active,
        }
    }
}

/// Validation outcome for one data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    pub row_number: usize,

    pub data: UserDraft,

    pub errors: Vec<String>,

    pub is_valid: bool,
}

/// Counts shown after an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,

    pub valid_rows: usize,

    pub invalid_rows: usize,
}

/// Everything one import produces
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub id: Uuid,

    pub rows: Vec<ParsedRecord>,

    /// Header labels echoed back for display
    pub headers: Vec<String>,

    pub generated_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn new(rows: Vec<ParsedRecord>, headers: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            rows,
            headers,
            generated_at: Utc::now(),
        }
    }

    pub fn valid_rows(&self) -> impl Iterator<Item = &ParsedRecord> {
        self.rows.iter().filter(|row| row.is_valid)
    }

    pub fn invalid_rows(&self) -> impl Iterator<Item = &ParsedRecord> {
        self.rows.iter().filter(|row| !row.is_valid)
    }

    /// Drafts of the rows that passed validation, in file order
    pub fn valid_drafts(&self) -> Vec<UserDraft> {
        self.valid_rows().map(|row| row.data.clone()).collect()
    }

    pub fn summary(&self) -> ImportSummary {
        let valid_rows = self.valid_rows().count();
        ImportSummary {
            total_rows: self.rows.len(),
            valid_rows,
            invalid_rows: self.rows.len() - valid_rows,
        }
    }
}

/// Import error types

#[derive(Debug, thiserror::Error)]

pub enum ImportError {
    #[error("فایل خالی است")]
    EmptyFile,

    #[error("Unsupported file type: {0} (only CSV and Excel files are accepted)")]
    UnsupportedFileType(String),

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for import operations

pub type ImportResult<T> = Result<T, ImportError>;
