// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Field validation for feedback submissions.
//!
//! Email accepts either a bare address (`ada@example.com`) or a display-name
//! form (`Ada Lovelace <ada@example.com>`). Source must be an absolute URL
//! with a scheme and a host.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::ValidationErrors;
use crate::types::FeedbackInput;

static ADDR_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
    )
    .expect("address regex is valid")
});

static NAME_ADDR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^<>]*?)\s*<([^<>\s]+)>$").expect("name-addr regex is valid")
});

/// Returns `true` if `value` is a syntactically valid mail address.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    match NAME_ADDR.captures(value) {
        Some(caps) => caps
            .get(1)
            .map(|m| ADDR_SPEC.is_match(m.as_str()))
            .unwrap_or(false),
        None => ADDR_SPEC.is_match(value),
    }
}

/// Returns `true` if `value` is an absolute URL with a host.
pub fn is_valid_source(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => url.has_host() && !url.cannot_be_a_base(),
        Err(_) => false,
    }
}

/// Validates every field of `input`, collecting all failures.
pub fn validate_input(input: &FeedbackInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !is_valid_email(&input.email) {
        errors.push("email", format!("'{}' is not a valid mail address", input.email));
    }
    if !is_valid_source(&input.source) {
        errors.push("source", format!("'{}' is not an absolute URL", input.source));
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        for email in [
            "ada@example.com",
            "first.last+tag@mail.example.org",
            "Ada Lovelace <ada@example.com>",
            "<ada@example.com>",
            "user@localhost",
        ] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "",
            "plainaddress",
            "@example.com",
            "ada@",
            "ada@@example.com",
            ".ada@example.com",
            "ada..l@example.com",
            "ada@-example.com",
            "Ada <not-an-address>",
        ] {
            assert!(!is_valid_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn test_sources() {
        assert!(is_valid_source("https://example.com/form"));
        assert!(is_valid_source("http://localhost:8080/a?b=c"));

        assert!(!is_valid_source(""));
        assert!(!is_valid_source("example.com"));
        assert!(!is_valid_source("/relative/path"));
        assert!(!is_valid_source("mailto:ada@example.com"));
    }

    #[test]
    fn test_validate_input_collects_all() {
        let input = FeedbackInput::new("Ada", "nope", "text", "nope");
        let errors = validate_input(&input).unwrap_err();
        assert_eq!(errors.errors().len(), 2);
        assert!(errors.has_field("email"));
        assert!(errors.has_field("source"));

        let ok = FeedbackInput::new("Ada", "ada@example.com", "text", "https://example.com");
        assert!(validate_input(&ok).is_ok());
    }
}
