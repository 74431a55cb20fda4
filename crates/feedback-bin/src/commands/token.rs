// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `token` command.
//!
//! Mints the same credential `GET /token` would, without a running server.

use std::sync::Arc;

use feedback_api::{SigningKeys, TokenIssuer};
use feedback_config::{load_config, FeedbackConfig};

use crate::cli::{Cli, TokenArgs};
use crate::error::{BinError, BinResult};

/// Executes the `token` command and prints `Bearer <token>`.
pub fn token(cli: &Cli, args: TokenArgs) -> BinResult<()> {
    let config = load_config(&cli.config)
        .map_err(|e| BinError::from(e).with_context(cli.config.display().to_string()))?;

    println!("{}", mint(&config, &args)?);
    Ok(())
}

/// Mints a credential with the configured secret and token limits.
pub fn mint(config: &FeedbackConfig, args: &TokenArgs) -> BinResult<String> {
    let secret = config
        .security
        .secret
        .as_ref()
        .ok_or_else(|| BinError::config("security.secret is not set"))?;

    let keys = Arc::new(SigningKeys::from_secret(secret.expose())?);
    let issuer = TokenIssuer::from_config(keys, &config.security.token);
    let token = issuer.issue_from_params(args.minutes.as_deref(), args.role.as_deref())?;

    Ok(format!("Bearer {}", token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_config::SecretValue;

    fn config() -> FeedbackConfig {
        let mut config = FeedbackConfig::default();
        config.security.secret = Some(SecretValue::new("token-command-secret-0123456789abcd"));
        config
    }

    #[test]
    fn test_mint_defaults() {
        let credential = mint(&config(), &TokenArgs::default()).unwrap();
        let token = credential.strip_prefix("Bearer ").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_mint_rejects_bad_minutes() {
        let args = TokenArgs {
            minutes: Some("0".to_string()),
            role: None,
        };
        let err = mint(&config(), &args).unwrap_err();
        assert!(matches!(err, BinError::Api(_)));

        let args = TokenArgs {
            minutes: Some("100000".to_string()),
            role: Some("read-only".to_string()),
        };
        assert!(mint(&config(), &args).is_err());
    }

    #[test]
    fn test_mint_rejects_unknown_role() {
        let args = TokenArgs {
            minutes: None,
            role: Some("admin".to_string()),
        };
        assert!(mint(&config(), &args).is_err());
    }

    #[test]
    fn test_mint_requires_secret() {
        let err = mint(&FeedbackConfig::default(), &TokenArgs::default()).unwrap_err();
        assert!(matches!(err, BinError::Configuration(_)));
    }
}
