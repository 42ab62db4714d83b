//! Header resolution
//!
//! Maps header labels (Persian or English) to the six canonical user fields.
//! Persian labels must match exactly after trimming; English labels match the
//! canonical field name case-insensitively.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::models::{trim_cell, Row};

/// Canonical import fields, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Email,
    Phone,
    TelegramId,
    Balance,
    Status,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::TelegramId,
        Field::Balance,
        Field::Status,
    ];

    /// Canonical (English) field name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::TelegramId => "telegramId",
            Self::Balance => "balance",
            Self::Status => "status",
        }
    }

    /// Header label used in import files and the template
    pub fn persian_label(&self) -> &'static str {
        match self {
            Self::Name => "نام",
            Self::Email => "ایمیل",
            Self::Phone => "تلفن",
            Self::TelegramId => "تلگرام",
            Self::Balance => "موجودی",
            Self::Status => "وضعیت",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    fn from_label(label: &str) -> Option<Field> {
        let label = trim_cell(label);
        if let Some(field) = Self::ALL.iter().find(|f| f.persian_label() == label) {
            return Some(*field);
        }

        let lowered = label.to_lowercase();
        Self::ALL
            .iter()
            .find(|f| f.name().to_lowercase() == lowered)
            .copied()
    }
}

/// The six Persian labels, in field order
pub fn persian_headers() -> Vec<String> {
    Field::ALL
        .iter()
        .map(|f| f.persian_label().to_string())
        .collect()
}

/// Column index of every canonical field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: [Option<usize>; 6],
}

impl HeaderMap {
    /// Fields in canonical order at columns 0..=5
    pub fn positional() -> Self {
        let mut map = Self::default();
        for field in Field::ALL {
            map.columns[field.index()] = Some(field.index());
        }
        map
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    pub fn is_mapped(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    /// Trimmed cell for `field`, or "" when unmapped or out of range
    pub fn get<'a>(&self, row: &'a Row, field: Field) -> &'a str {
        self.column(field)
            .and_then(|index| row.cell(index))
            .map(trim_cell)
            .unwrap_or("")
    }

    fn insert(&mut self, field: Field, column: usize) {
        self.columns[field.index()] = Some(column);
    }
}

/// Build the header map for one import.
///
/// Unknown columns are ignored. When a field appears in more than one
/// column, the last one wins.
pub fn map_headers(header_row: Option<&Row>) -> HeaderMap {
    let Some(header_row) = header_row else {
        return HeaderMap::positional();
    };

    let mut map = HeaderMap::default();
    for (column, label) in header_row.cells.iter().enumerate() {
        match Field::from_label(label) {
            Some(field) => map.insert(field, column),
            None => debug!("Ignoring unknown header column {}: {:?}", column, label),
        }
    }

    debug!("Header mapping: {:?}", map);
    map
}
