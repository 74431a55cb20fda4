// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Chatty dependency
//! targets are capped at `warn` either way.

use std::io::IsTerminal;

use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::cli::LogFormat;

/// Dependency targets capped at `warn`.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "tower=warn", "sqlx=warn", "redis=warn"];

/// Installs the global subscriber.
///
/// Only the first call in a process takes effect; later calls are ignored so
/// tests and embedded callers can initialise freely.
pub fn init_logging(level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(build_filter(level));
    let ansi = std::io::stdout().is_terminal();

    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_ansi(ansi))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_ansi(ansi))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(level, format = ?format, "Logging initialised");
    }
}

/// Builds the event filter from `RUST_LOG`, or from `level` when unset.
pub fn build_filter(level: &str) -> EnvFilter {
    let base = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(parse_level(level).into()));

    QUIET_TARGETS
        .iter()
        .filter_map(|target| target.parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
}

/// Parses a level name. `warning` is accepted; anything unknown means `info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => LevelFilter::WARN,
        other => other.parse().unwrap_or(LevelFilter::INFO),
    }
}
