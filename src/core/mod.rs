//! Core import logic
//!
//! Tokenizing, header mapping and validation of user rows, plus the file
//! front-end, template and export built on top of them.

pub mod config;
pub mod export;
pub mod file_parser;
pub mod header_map;
pub mod importer;
pub mod models;
pub mod row_validator;
pub mod schema;
pub mod template;
pub mod tokenizer;


#[cfg(test)]
mod import_integration_tests;

// Re-export commonly used types
pub use config::ImportConfig;
pub use file_parser::UserImporter;
pub use importer::{parse_and_validate, parse_and_validate_with};
