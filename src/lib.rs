//! User import library
//!
//! Reads user lists for the marketplace admin panel from CSV and Excel
//! files, maps Persian or English headers onto user fields and validates
//! every row, reporting problems per row instead of failing the import.

pub mod core;
pub mod utils;

// Re-export commonly used types
pub use core::{
    config::ImportConfig,
    export::export_users_csv,
    file_parser::{FileFormat, ParseStats, UserImporter},
    header_map::{map_headers, Field, HeaderMap},
    importer::{parse_and_validate, parse_and_validate_with},
    models::{
        ImportError, ImportReport, ImportResult, ImportSummary, ParsedRecord, Row, UserDraft,
        UserStatus,
    },
    row_validator::validate_rows,
    schema::{RecordValidator, UserSchema, ValidationIssue},
    template::{generate_csv_template, write_csv_template},
    tokenizer::parse,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing();

    tracing::info!("{} v{} initialized", NAME, VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
        // second call must not fail on the already installed subscriber
        assert!(init().is_ok());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "asll-user-import");
    }

    #[test]
    fn test_public_api_round_trip() {
        let report = parse_and_validate(&generate_csv_template(), true).unwrap();
        assert_eq!(report.summary().valid_rows, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"][0]["rowNumber"], 2);
        assert_eq!(json["rows"][0]["isValid"], true);
        assert_eq!(json["rows"][0]["data"]["telegramId"], "@ali_mohammadi");
    }
}
