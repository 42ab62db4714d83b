//! CSV export of user records
//!
//! Every value is quoted, embedded quotes are doubled, line breaks inside a
//! value are flattened to a space. Headers and status use Persian labels.

use anyhow::Result as AnyResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io;
use std::path::Path;
use tracing::info;

use crate::core::header_map::Field;
use crate::core::models::{ImportError, ImportResult, UserDraft};
use crate::utils::file_utils::write_utf8_with_bom;

/// Column header written for `field`
pub fn export_label(field: Field) -> &'static str {
    match field {
        Field::TelegramId => "آیدی تلگرام",
        other => other.persian_label(),
    }
}

fn export_value(user: &UserDraft, field: Field) -> String {
    let raw = match field {
        Field::Name => user.name.clone(),
        Field::Email => user.email.clone(),
        Field::Phone => user.phone.clone(),
        Field::TelegramId => user.telegram_id.clone(),
        Field::Balance => user.balance.to_string(),
        Field::Status => user.status.persian_label().to_string(),
    };
    raw.replace('\n', " ").replace('\r', "")
}

/// Render `users` as CSV text; lines are joined by `\n` with no trailing newline.
pub fn export_users_csv(
    users: &[UserDraft],
    columns: &[Field],
    include_headers: bool,
) -> ImportResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if include_headers {
        writer.write_record(columns.iter().map(|field| export_label(*field)))?;
    }

    for user in users {
        writer.write_record(columns.iter().map(|field| export_value(user, *field)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| ImportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    if text.ends_with('\n') {
        text.pop();
    }

    info!("Exported {} users in {} columns", users.len(), columns.len());
    Ok(text)
}

/// Write exported CSV as BOM-prefixed UTF-8 so spreadsheet apps read Persian text
pub fn write_export(path: &Path, content: &str) -> AnyResult<()> {
    write_utf8_with_bom(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::UserStatus;
    use tempfile::tempdir;

    fn user() -> UserDraft {
        UserDraft {
            name: "سارا \"کریمی\"".to_string(),
            email: "sara@example.com".to_string(),
            phone: "09121112233".to_string(),
            telegram_id: "sara".to_string(),
            balance: 2500.5,
            status: UserStatus::Banned,
        }
    }

    #[test]
    fn test_export_all_columns() {
        let text = export_users_csv(&[user()], &Field::ALL, true).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(
            lines,
            vec![
                "\"نام\",\"ایمیل\",\"تلفن\",\"آیدی تلگرام\",\"موجودی\",\"وضعیت\"",
                "\"سارا \"\"کریمی\"\"\",\"sara@example.com\",\"09121112233\",\"sara\",\"2500.5\",\"مسدود\"",
            ]
        );
    }

    #[test]
    fn test_export_selected_columns_without_header() {
        let text = export_users_csv(&[user()], &[Field::Status, Field::Email], false).unwrap();
        assert_eq!(text, "\"مسدود\",\"sara@example.com\"");
    }

    #[test]
    fn test_export_flattens_line_breaks() {
        let mut multi = user();
        multi.name = "خط اول\r\nخط دوم".to_string();

        let text = export_users_csv(&[multi], &[Field::Name], false).unwrap();
        assert_eq!(text, "\"خط اول خط دوم\"");
    }

    #[test]
    fn test_export_empty_list() {
        assert_eq!(export_users_csv(&[], &Field::ALL, false).unwrap(), "");
    }

    #[test]
    fn test_write_export_adds_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users-export.csv");
        write_export(&path, "\"a\"").unwrap();

        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    }
}
