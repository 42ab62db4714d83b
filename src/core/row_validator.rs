//! Row extraction and validation
//!
//! Turns data rows into [`ParsedRecord`]s. Balance and status coercion never
//! fail; only the [`RecordValidator`] produces errors.

use tracing::{debug, trace};

use crate::core::header_map::{Field, HeaderMap};
use crate::core::models::{ParsedRecord, Row, UserDraft, UserStatus};
use crate::core::schema::RecordValidator;

/// Validate every non-blank data row, keeping file order.
pub fn validate_rows(
    data_rows: &[Row],
    header_map: &HeaderMap,
    validator: &dyn RecordValidator,
) -> Vec<ParsedRecord> {
    let mut records = Vec::with_capacity(data_rows.len());

    for row in data_rows {
        if row.is_blank() {
            trace!("Skipping blank row at record {}", row.record);
            continue;
        }

        let data = extract_draft(row, header_map);
        let errors: Vec<String> = validator
            .validate(&data)
            .iter()
            .map(|issue| issue.render())
            .collect();

        if !errors.is_empty() {
            debug!("Row {} failed validation: {:?}", row.record, errors);
        }

        records.push(ParsedRecord {
            row_number: row.record,
            is_valid: errors.is_empty(),
            data,
            errors,
        });
    }

    records
}

/// Build a draft from one row using the header mapping
pub fn extract_draft(row: &Row, header_map: &HeaderMap) -> UserDraft {
    UserDraft {
        name: header_map.get(row, Field::Name).to_string(),
        email: header_map.get(row, Field::Email).to_string(),
        phone: header_map.get(row, Field::Phone).to_string(),
        telegram_id: header_map.get(row, Field::TelegramId).to_string(),
        balance: coerce_balance(header_map.get(row, Field::Balance)),
        status: coerce_status(header_map.get(row, Field::Status)),
    }
}

/// Strip thousands separators and read the leading number; 0 when there is none.
pub fn coerce_balance(raw: &str) -> f64 {
    if raw.is_empty() {
        return 0.0;
    }

    let cleaned = raw.replace(',', "");
    match leading_float(&cleaned) {
        Some(value) => value,
        None => {
            trace!("Balance {:?} is not numeric, using 0", raw);
            0.0
        }
    }
}

/// Map a status cell onto [`UserStatus`]; unknown values become active.
pub fn coerce_status(raw: &str) -> UserStatus {
    match raw.to_lowercase().as_str() {
        "active" | "فعال" | "1" | "true" => UserStatus::Active,
        "inactive" | "غیرفعال" | "0" | "false" => UserStatus::Inactive,
        "banned" | "مسدود" => UserStatus::Banned,
        other => {
            if !other.is_empty() {
                trace!("Unknown status {:?}, defaulting to active", other);
            }
            UserStatus::Active
        }
    }
}

/// Longest numeric prefix: whitespace, sign, digits, fraction, exponent, or `Infinity`.
fn leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        let value = f64::INFINITY;
        return Some(if bytes.first() == Some(&b'-') { -value } else { value });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
