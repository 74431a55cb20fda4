// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # feedback-tests
//!
//! Cross-crate tests for the feedback service and the support code they
//! share under [`common`].
//!
//! | Suite                    | Covers                                          |
//! |--------------------------|-------------------------------------------------|
//! | `integration_api`        | token route, gate, role matrix, response cache  |
//! | `integration_pagination` | `url-cursor-next` walks and page parameters     |
//! | `integration_service`    | `FeedbackService` without HTTP                  |
//! | `integration_config`     | config files and a runtime served over TCP      |
//!
//! ```rust,ignore
//! use feedback_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn reads_back_a_record() {
//!     let app = TestApp::new();
//!     let id = app.create(&FeedbackFixtures::valid()).await;
//!     let response = app.get(&format!("/feedback/{id}"), Some(&app.token(Role::ReadOnly))).await;
//!     assert_eq!(response.status, StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Everything a suite usually needs.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;

    pub use axum::http::StatusCode;
    pub use feedback_api::Role;
    pub use feedback_core::{FeedbackId, FeedbackInput};
}
