// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # feedback-bin
//!
//! The `feedback` executable: parses the command line, loads configuration,
//! connects the configured backends and serves the HTTP API until a
//! termination signal arrives.
//!
//! ```text
//! main ──► cli ──► commands::execute
//!                     ├── run ──────► runtime ──► backends + ApiServer
//!                     │                 └──────── shutdown (signals)
//!                     ├── validate
//!                     ├── token
//!                     └── version
//! ```
//!
//! ```bash
//! feedback -c /etc/feedback/feedback.yaml          # serve (default)
//! feedback -c feedback.yaml validate --show-config
//! feedback -c feedback.yaml token -m 30 -r read-only
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{FeedbackRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
