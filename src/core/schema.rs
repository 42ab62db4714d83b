//! Field-level validation of user drafts
//!
//! [`RecordValidator`] is the seam between row extraction and the rules a
//! record must satisfy. [`UserSchema`] carries the admin panel's add-user
//! rules. Every failing check of every field is reported, so one row can
//! carry several messages for the same field.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::core::header_map::Field;
use crate::core::models::UserDraft;

/// Upper bound accepted for an imported balance, in toman
pub const MAX_BALANCE: f64 = 1_000_000_000.0;

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: Vec<String>,

    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.name().to_string()],
            message: message.into(),
        }
    }

    /// `"<path>: <message>"` with path segments joined by `.`
    pub fn render(&self) -> String {
        format!("{}: {}", self.path.join("."), self.message)
    }
}

/// Evaluates a draft and returns its failures in order (empty when valid)
pub trait RecordValidator {
    fn validate(&self, draft: &UserDraft) -> Vec<ValidationIssue>;
}

struct Patterns {
    persian_name: Regex,
    email: Regex,
    phone: Regex,
    telegram: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        persian_name: Regex::new(r"^[\x{0600}-\x{06FF}\s]+$").expect("static name pattern"),
        email: Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
            .expect("static email pattern"),
        phone: Regex::new(r"^[۰-۹0-9\s\-()]+$").expect("static phone pattern"),
        telegram: Regex::new(r"^@?[a-zA-Z0-9_]+$").expect("static telegram pattern"),
    })
}

/// Rules for a new user account
#[derive(Debug, Clone, Copy, Default)]
pub struct UserSchema;

impl UserSchema {
    pub fn new() -> Self {
        Self
    }

    fn check_name(&self, name: &str, issues: &mut Vec<ValidationIssue>) {
        // lengths count UTF-16 units, as the web form does
        let length = name.encode_utf16().count();
        if length < 2 {
            issues.push(ValidationIssue::new(Field::Name, "نام باید حداقل ۲ کاراکتر باشد"));
        }
        if length > 50 {
            issues.push(ValidationIssue::new(
                Field::Name,
                "نام نمی‌تواند بیشتر از ۵۰ کاراکتر باشد",
            ));
        }
        if !patterns().persian_name.is_match(name) {
            issues.push(ValidationIssue::new(Field::Name, "نام باید به فارسی باشد"));
        }
    }

    fn check_email(&self, email: &str, issues: &mut Vec<ValidationIssue>) {
        if email.is_empty() {
            issues.push(ValidationIssue::new(Field::Email, "ایمیل الزامی است"));
        }
        if !is_email(email) {
            issues.push(ValidationIssue::new(Field::Email, "فرمت ایمیل معتبر نیست"));
        }
    }

    fn check_phone(&self, phone: &str, issues: &mut Vec<ValidationIssue>) {
        if phone.is_empty() {
            issues.push(ValidationIssue::new(Field::Phone, "شماره تلفن الزامی است"));
        }
        if !patterns().phone.is_match(phone) {
            issues.push(ValidationIssue::new(Field::Phone, "فرمت شماره تلفن معتبر نیست"));
        }
        let digits = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || ('۰'..='۹').contains(c))
            .count();
        if !(10..=11).contains(&digits) {
            issues.push(ValidationIssue::new(
                Field::Phone,
                "شماره تلفن باید ۱۰ یا ۱۱ رقم باشد",
            ));
        }
    }

    fn check_telegram(&self, telegram_id: &str, issues: &mut Vec<ValidationIssue>) {
        if telegram_id.is_empty() {
            issues.push(ValidationIssue::new(Field::TelegramId, "آیدی تلگرام الزامی است"));
        }
        if !patterns().telegram.is_match(telegram_id) {
            issues.push(ValidationIssue::new(
                Field::TelegramId,
                "فرمت آیدی تلگرام معتبر نیست (مثال: @username یا username)",
            ));
        }
    }

    fn check_balance(&self, balance: f64, issues: &mut Vec<ValidationIssue>) {
        if balance < 0.0 {
            issues.push(ValidationIssue::new(Field::Balance, "موجودی نمی‌تواند منفی باشد"));
        }
        if balance > MAX_BALANCE {
            issues.push(ValidationIssue::new(
                Field::Balance,
                "موجودی نمی‌تواند بیشتر از ۱,۰۰۰,۰۰۰,۰۰۰ تومان باشد",
            ));
        }
    }
}

impl RecordValidator for UserSchema {
    fn validate(&self, draft: &UserDraft) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check_name(&draft.name, &mut issues);
        self.check_email(&draft.email, &mut issues);
        self.check_phone(&draft.phone, &mut issues);
        self.check_telegram(&draft.telegram_id, &mut issues);
        self.check_balance(draft.balance, &mut issues);
        // status is always one of the enum variants once coerced
        issues
    }
}

fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && patterns().email.is_match(value)
}
