//! Example CSV template for the user import

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::header_map::Field;
use crate::utils::file_utils::write_utf8_with_bom;

/// Example row shown under the header line, in field order
pub const EXAMPLE_ROW: [&str; 6] = [
    "علی محمدی",
    "ali@example.com",
    "09123456789",
    "@ali_mohammadi",
    "100000",
    "فعال",
];

/// Header line of Persian labels followed by one example row
pub fn generate_csv_template() -> String {
    let header: Vec<&str> = Field::ALL.iter().map(|f| f.persian_label()).collect();
    [header.join(","), EXAMPLE_ROW.join(",")].join("\n")
}

/// Write the template as BOM-prefixed UTF-8.
///
/// A directory path receives `file_name` inside it.
pub fn write_csv_template(path: &Path, file_name: &str) -> Result<PathBuf> {
    let target = if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    };

    write_utf8_with_bom(&target, &generate_csv_template())?;
    info!("Wrote import template to {}", target.display());
    Ok(target)
}
