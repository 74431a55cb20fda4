// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built inputs and configuration documents shared across suites.

use std::io::Write;

use feedback_core::FeedbackInput;
use tempfile::NamedTempFile;

/// Signing secret used by the harness.
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A different secret, for credentials the harness must reject.
pub const OTHER_SECRET: &str = "some-other-signing-secret-abcdef0123456789";

// =============================================================================
// Feedback Fixtures
// =============================================================================

/// Factory for feedback inputs.
pub struct FeedbackFixtures;

impl FeedbackFixtures {
    /// A submission that passes validation.
    pub fn valid() -> FeedbackInput {
        FeedbackInput::new(
            "Ada Lovelace",
            "ada@example.com",
            "The checkout flow is much faster now.",
            "https://shop.example.com/checkout",
        )
    }

    /// The `n`-th submission of a numbered batch.
    pub fn numbered(n: usize) -> FeedbackInput {
        FeedbackInput::new(
            format!("Customer {n}"),
            format!("customer{n}@example.com"),
            format!("Feedback number {n}"),
            format!("https://example.com/pages/{n}"),
        )
    }

    /// `count` numbered submissions, starting at 1.
    pub fn batch(count: usize) -> Vec<FeedbackInput> {
        (1..=count).map(Self::numbered).collect()
    }

    /// A submission with a bad mail address.
    pub fn invalid_email() -> FeedbackInput {
        FeedbackInput {
            email: "not-an-address".to_string(),
            ..Self::valid()
        }
    }

    /// A submission with a relative source.
    pub fn invalid_source() -> FeedbackInput {
        FeedbackInput {
            source: "/checkout".to_string(),
            ..Self::valid()
        }
    }

    /// A submission failing both field checks.
    pub fn invalid_both() -> FeedbackInput {
        FeedbackInput {
            email: "nobody".to_string(),
            source: "checkout page".to_string(),
            ..Self::valid()
        }
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Factory for configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Smallest valid YAML: memory backends and a secret.
    pub fn minimal_yaml() -> String {
        format!("security:\n  secret: {TEST_SECRET}\n")
    }

    /// A YAML document exercising every section.
    pub fn full_yaml() -> String {
        format!(
            r#"server:
  host: 127.0.0.1
  port: 9090
  request_timeout: 15s
  shutdown_timeout: 2s
security:
  secret: {TEST_SECRET}
  token:
    default_ttl_minutes: 5
    max_ttl_minutes: 60
storage:
  backend: memory
cache:
  backend: memory
  ttl_secs: 30
broker:
  backend: memory
  topic: customer-feedback
  capacity: 64
logging:
  level: debug
  format: json
"#
        )
    }

    /// The same shape as [`ConfigFixtures::minimal_yaml`] in TOML.
    pub fn minimal_toml() -> String {
        format!("[security]\nsecret = \"{TEST_SECRET}\"\n")
    }

    /// Writes `content` to a temp file with the given extension.
    pub fn write(content: &str, extension: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .expect("Failed to create temp config");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp config");
        file
    }
}
