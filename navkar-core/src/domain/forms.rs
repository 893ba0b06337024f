//! Field-level validation for the login and signup forms
//!
//! This is the instant-feedback layer shown inline under each field. The
//! session store repeats the password checks as the authoritative step.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::credentials::{LoginRequest, SignupRequest, MIN_PASSWORD_LEN};

/// Minimum length of a signup name
pub const MIN_NAME_LEN: usize = 2;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("static email pattern")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+]?[\d\s\-\(\)]{10,}$").expect("static phone pattern"))
}

/// Syntactic e-mail check (local part up to 64 chars, whole address up to 254)
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    email.len() <= 254 && local.len() <= 64 && email_regex().is_match(email)
}

/// At least ten digits/spaces/dashes/parentheses, optional leading `+`
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    Address,
}

impl FormField {
    pub const LOGIN: &'static [FormField] = &[FormField::Email, FormField::Password];

    pub const SIGNUP: &'static [FormField] = &[
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::Password,
        FormField::ConfirmPassword,
        FormField::Address,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Password => "Password",
            FormField::ConfirmPassword => "ConfirmPassword",
            FormField::Address => "Address",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldError {
    Required,
    InvalidEmail,
    TooShort { min: usize },
    InvalidPhone,
}

impl FieldError {
    /// Inline text shown under `field`
    pub fn message(&self, field: FormField) -> String {
        match self {
            FieldError::Required => format!("{} is required", field.label()),
            FieldError::InvalidEmail => "Please enter a valid email address".to_string(),
            FieldError::TooShort { min } => match field {
                FormField::Name => format!("Name must be at least {} characters long", min),
                _ => format!("Password must be at least {} characters long", min),
            },
            FieldError::InvalidPhone => "Please enter a valid phone number".to_string(),
        }
    }
}

/// Outcome of validating a whole form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: BTreeMap<FormField, FieldError>,
    /// Form-level: password and confirmation differ
    pub password_mismatch: bool,
}

impl FormErrors {
    pub fn is_valid(&self) -> bool {
        self.fields.is_empty() && !self.password_mismatch
    }

    pub fn get(&self, field: FormField) -> Option<FieldError> {
        self.fields.get(&field).copied()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages: Vec<String> = self
            .fields
            .iter()
            .map(|(field, error)| error.message(*field))
            .collect();
        if self.password_mismatch {
            messages.push("Passwords do not match".to_string());
        }
        write!(f, "{}", messages.join("; "))
    }
}

fn check_required(value: &str) -> Option<FieldError> {
    value.is_empty().then_some(FieldError::Required)
}

fn check_email(email: &str) -> Option<FieldError> {
    check_required(email).or_else(|| (!is_valid_email(email)).then_some(FieldError::InvalidEmail))
}

fn check_min_len(value: &str, min: usize) -> Option<FieldError> {
    check_required(value)
        .or_else(|| (value.chars().count() < min).then_some(FieldError::TooShort { min }))
}

fn check_phone(phone: &str) -> Option<FieldError> {
    check_required(phone).or_else(|| (!is_valid_phone(phone)).then_some(FieldError::InvalidPhone))
}

pub fn validate_login(request: &LoginRequest) -> FormErrors {
    let mut errors = FormErrors::default();
    let checks = [
        (FormField::Email, check_email(&request.email)),
        (FormField::Password, check_min_len(&request.password, MIN_PASSWORD_LEN)),
    ];
    for (field, error) in checks {
        if let Some(error) = error {
            errors.fields.insert(field, error);
        }
    }
    errors
}

pub fn validate_signup(request: &SignupRequest) -> FormErrors {
    let mut errors = FormErrors::default();
    let checks = [
        (FormField::Name, check_min_len(&request.name, MIN_NAME_LEN)),
        (FormField::Email, check_email(&request.email)),
        (FormField::Phone, check_phone(&request.phone)),
        (FormField::Password, check_min_len(&request.password, MIN_PASSWORD_LEN)),
        (FormField::ConfirmPassword, check_required(&request.confirm_password)),
    ];
    for (field, error) in checks {
        if let Some(error) = error {
            errors.fields.insert(field, error);
        }
    }
    errors.password_mismatch = !request.passwords_match();
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("demo@navkarbesan.com"));
        assert!(is_valid_email("a.b+c@x.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("space in@x.com"));
    }

    #[test]
    fn test_phone_pattern() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 98765 43210"));
        assert!(is_valid_phone("(022) 555-12345"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("98765abc43210"));
    }

    #[test]
    fn test_login_validation() {
        assert!(validate_login(&LoginRequest::demo()).is_valid());

        let errors = validate_login(&LoginRequest::new("", "abc"));
        assert_eq!(errors.get(FormField::Email), Some(FieldError::Required));
        assert_eq!(
            errors.get(FormField::Password),
            Some(FieldError::TooShort { min: 6 })
        );
    }

    #[test]
    fn test_signup_validation_collects_every_field() {
        let request = SignupRequest::new("A", "bad", "123", "secret1", "secret2");
        let errors = validate_signup(&request);

        assert_eq!(errors.get(FormField::Name), Some(FieldError::TooShort { min: 2 }));
        assert_eq!(errors.get(FormField::Email), Some(FieldError::InvalidEmail));
        assert_eq!(errors.get(FormField::Phone), Some(FieldError::InvalidPhone));
        assert_eq!(errors.get(FormField::Password), None);
        assert!(errors.password_mismatch);
        assert!(!errors.is_valid());
    }

    #[test]
    fn test_field_messages() {
        assert_eq!(FieldError::Required.message(FormField::Email), "Email is required");
        assert_eq!(
            FieldError::TooShort { min: 2 }.message(FormField::Name),
            "Name must be at least 2 characters long"
        );
        assert_eq!(
            FieldError::TooShort { min: 6 }.message(FormField::Password),
            "Password must be at least 6 characters long"
        );
    }
}
