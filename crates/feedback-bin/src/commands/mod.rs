// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subcommands. `run` is the default when none is given.

mod run;
mod token;
mod validate;
mod version;

pub use run::run;
pub use token::{mint, token};
pub use validate::{collect_warnings, validate};
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Dispatches the parsed command line.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run => run(&cli).await,
        Commands::Validate(args) => validate(&cli, args),
        Commands::Version(args) => version(&cli, args.format),
        Commands::Token(args) => token(&cli, args),
    }
}
