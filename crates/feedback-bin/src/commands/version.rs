// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `feedback version`: component versions and build target.

use crate::cli::{Cli, OutputFormat};
use crate::error::BinResult;

fn components() -> [(&'static str, &'static str); 4] {
    [
        ("feedback-bin", crate::VERSION),
        ("feedback-api", feedback_api::VERSION),
        ("feedback-core", feedback_core::VERSION),
        ("feedback-config", feedback_config::VERSION),
    ]
}

/// Prints version information.
pub fn version(_cli: &Cli, format: OutputFormat) -> BinResult<()> {
    let signing = format!("{:?}", feedback_api::auth::SIGNING_ALGORITHM);
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    match format {
        OutputFormat::Text => {
            println!("feedback {}", crate::VERSION);
            for (name, version) in components() {
                println!("  {name:<16} {version}");
            }
            println!("  {:<16} {signing}", "token signing");
            println!("  {:<16} {target}", "target");
        }
        OutputFormat::Json => {
            let crates: serde_json::Map<String, serde_json::Value> = components()
                .into_iter()
                .map(|(name, version)| (name.to_string(), version.into()))
                .collect();
            let output = serde_json::json!({
                "version": crate::VERSION,
                "crates": crates,
                "signing": signing,
                "target": target,
            });
            println!("{output}");
        }
    }

    Ok(())
}
