use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const FULL_NAME_MAX: usize = 100;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 100;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").unwrap();
}

/// Which user field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Username,
    Email,
    FullName,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    InvalidLength,
    InvalidFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", describe(.field, .reason))]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

// Messages are shown as-is on the HTML forms.
fn describe(field: &Field, reason: &Reason) -> String {
    match (field, reason) {
        (Field::Username, Reason::InvalidLength) => format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        ),
        (Field::Username, Reason::InvalidFormat) => {
            "Username can only contain letters, numbers, and underscores".to_string()
        }
        (Field::Email, _) => "Email address is not valid".to_string(),
        (Field::FullName, _) => format!("Full name must be at most {} characters", FULL_NAME_MAX),
        (Field::Password, _) => format!(
            "Password must be between {} and {} characters",
            PASSWORD_MIN, PASSWORD_MAX
        ),
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_username(s: &str) -> Result<&str, ValidationError> {
    let len = char_len(s);
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ValidationError::new(Field::Username, Reason::InvalidLength));
    }
    if !USERNAME_RE.is_match(s) {
        return Err(ValidationError::new(Field::Username, Reason::InvalidFormat));
    }
    Ok(s)
}

pub fn validate_email(s: &str) -> Result<&str, ValidationError> {
    if !EMAIL_RE.is_match(s) {
        return Err(ValidationError::new(Field::Email, Reason::InvalidFormat));
    }
    Ok(s)
}

pub fn validate_full_name(s: Option<&str>) -> Result<Option<&str>, ValidationError> {
    match s {
        Some(name) if char_len(name) > FULL_NAME_MAX => {
            Err(ValidationError::new(Field::FullName, Reason::InvalidLength))
        }
        other => Ok(other),
    }
}

pub fn validate_password(s: &str) -> Result<&str, ValidationError> {
    let len = char_len(s);
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(ValidationError::new(Field::Password, Reason::InvalidLength));
    }
    Ok(s)
}
