//! Parse-and-validate orchestration for in-memory text

use tracing::{debug, info};

use crate::core::header_map::{map_headers, persian_headers};
use crate::core::models::{ImportError, ImportReport, ImportResult, Row};
use crate::core::row_validator::validate_rows;
use crate::core::schema::{RecordValidator, UserSchema};
use crate::core::tokenizer;
use crate::utils::encoding::strip_bom;

/// Tokenize `content`, resolve headers and validate every data row against
/// the default [`UserSchema`].
///
/// Fails only when the text holds no non-blank row at all.
pub fn parse_and_validate(content: &str, has_header: bool) -> ImportResult<ImportReport> {
    parse_and_validate_with(content, has_header, &UserSchema::new())
}

/// Same as [`parse_and_validate`] with a caller-supplied validator
pub fn parse_and_validate_with(
    content: &str,
    has_header: bool,
    validator: &dyn RecordValidator,
) -> ImportResult<ImportReport> {
    let rows = tokenizer::parse(strip_bom(content));
    build_report(rows, has_header, validator)
}

/// Shared tail of the CSV and Excel paths: rows are already tokenized.
pub(crate) fn build_report(
    rows: Vec<Row>,
    has_header: bool,
    validator: &dyn RecordValidator,
) -> ImportResult<ImportReport> {
    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let (header, data_rows) = if has_header {
        (Some(&rows[0]), &rows[1..])
    } else {
        (None, &rows[..])
    };

    let header_map = map_headers(header);
    let records = validate_rows(data_rows, &header_map, validator);
    let headers = header
        .map(|row| row.cells.clone())
        .unwrap_or_else(persian_headers);

    let report = ImportReport::new(records, headers);
    let summary = report.summary();
    debug!("Resolved headers: {:?}", report.headers);
    info!(
        "Validated {} rows ({} valid, {} invalid)",
        summary.total_rows, summary.valid_rows, summary.invalid_rows
    );

    Ok(report)
}
