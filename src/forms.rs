//! Submitted-form validation.
//!
//! Each form validates into either `Ok(())` or a [`FieldErrors`] map from
//! field name to human-readable messages. Validation never writes anything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required.";

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD: &str = "__all__";

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages for `field`, empty when the field is valid.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PcbTypeForm {
    pub name: String,
    pub description: String,
}

impl PcbTypeForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if is_blank(&self.name) {
            errors.add("name", REQUIRED);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl RegistrationForm {
    /// Checks everything that does not need the account store; username
    /// uniqueness is reported by the account service.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Err(message) = validate_username(&self.username) {
            errors.add("username", message);
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if let Err(message) = validate_password(&self.password1) {
            errors.add("password1", message);
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() && self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn’t match.");
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Where to go after a successful login.
    pub next: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if is_blank(&self.username) {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result()
    }
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err(REQUIRED.to_string());
    }

    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(format!(
            "Ensure this value has at most {USERNAME_MAX_LEN} characters."
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("This password is entirely numeric.".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcb_type_form_requires_name() {
        assert!(PcbTypeForm::new("Rev A", "").validate().is_ok());
        assert!(PcbTypeForm::new("Rev A", "four layer").validate().is_ok());

        let errors = PcbTypeForm::new("", "desc").validate().unwrap_err();
        assert!(errors.contains("name"));
        assert_eq!(errors.get("name"), [REQUIRED.to_string()]);
        assert!(!errors.contains("description"));

        assert!(PcbTypeForm::new("   \t", "").validate().is_err());
    }

    #[test]
    fn test_pcb_type_form_missing_fields_deserialize_empty() {
        let form: PcbTypeForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form, PcbTypeForm::default());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.b+c-d_e@f").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
        assert!(validate_username(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct horse").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_err());
    }

    #[test]
    fn test_registration_form() {
        let form = RegistrationForm {
            username: "bob".to_string(),
            password1: "s3cret-pass".to_string(),
            password2: "s3cret-pass".to_string(),
        };
        assert!(form.validate().is_ok());

        let mismatch = RegistrationForm {
            password2: "different-pass".to_string(),
            ..form.clone()
        };
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.contains("password2"));
        assert!(!errors.contains("password1"));

        let empty = RegistrationForm::default().validate().unwrap_err();
        assert_eq!(
            empty.fields().collect::<Vec<_>>(),
            vec!["password1", "password2", "username"]
        );
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            username: "bob".to_string(),
            password: "pw".to_string(),
            next: String::new(),
        };
        assert!(form.validate().is_ok());
        assert!(LoginForm::default().validate().is_err());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("name", REQUIRED);
        assert_eq!(errors.to_string(), "name: This field is required.");
    }
}
