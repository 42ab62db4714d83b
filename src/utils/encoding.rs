//! Encoding helpers shared by the readers and writers

/// UTF-8 byte-order mark; spreadsheet apps need it to open Persian CSV as UTF-8
pub const UTF8_BOM: &str = "\u{FEFF}";

/// Drop a leading byte-order mark, if any
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(UTF8_BOM).unwrap_or(text)
}

/// Prefix `content` with a UTF-8 byte-order mark
pub fn with_bom(content: &str) -> String {
    let mut out = String::with_capacity(UTF8_BOM.len() + content.len());
    out.push_str(UTF8_BOM);
    out.push_str(content);
    out
}
