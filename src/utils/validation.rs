use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

lazy_static! {
    static ref STUDENT_ID: Regex = Regex::new(r"^\d{8}$").unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        let mut error = ValidationError::new("too_short");
        error.message = Some(Cow::from("The password must be at least 8 characters long"));
        return Err(error);
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        let mut error = ValidationError::new("too_weak");
        error.message = Some(Cow::from(
            "The password must contain at least one letter and one number",
        ));
        return Err(error);
    }

    Ok(())
}

pub fn validate_student_id(student_id: &str) -> Result<(), ValidationError> {
    if !STUDENT_ID.is_match(student_id) {
        let mut error = ValidationError::new("invalid_format");
        error.message = Some(Cow::from("The student id must be exactly 8 digits"));
        return Err(error);
    }

    Ok(())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::from("This field cannot be empty"));
        return Err(error);
    }

    Ok(())
}

/// Emails compare case-insensitively, so every lookup and insert goes through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// An empty allow-list accepts every domain. Subdomains of an allowed domain are accepted.
pub fn email_domain_allowed(email: &str, allowed_domains: &[String]) -> bool {
    if allowed_domains.is_empty() {
        return true;
    }

    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_lowercase();

    allowed_domains.iter().any(|allowed| {
        let allowed = allowed.to_lowercase();
        domain == allowed || domain.ends_with(&format!(".{allowed}"))
    })
}

pub fn domain_not_allowed(field: &'static str) -> ValidationErrors {
    let mut error = ValidationError::new("domain_not_allowed");
    error.message = Some(Cow::from("Please register with your university email address"));

    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

/// First human readable message found in a set of field errors.
pub fn first_message(errors: &ValidationErrors) -> Option<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(_, errors)| errors.iter())
        .find_map(|error| error.message.as_ref().map(|msg| msg.to_string()))
}
