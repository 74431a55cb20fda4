// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use feedback_config::{load_config, BrokerBackend, CacheBackend, FeedbackConfig, StorageBackend};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = load_config(config_path).map_err(|e| {
        BinError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:  {}", config.server.socket_addr());
            println!("  Storage: {}", storage_name(config.storage.backend));
            println!(
                "  Cache:   {} (ttl {}s)",
                cache_name(config.cache.backend),
                config.cache.ttl_secs
            );
            println!(
                "  Broker:  {} (topic {})",
                broker_name(config.broker.backend),
                config.broker.topic
            );
            println!(
                "  Tokens:  default {}m, max {}m",
                config.security.token.default_ttl_minutes, config.security.token.max_ttl_minutes
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{:#?}", config);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "storage": storage_name(config.storage.backend),
                    "cache": cache_name(config.cache.backend),
                    "cache_ttl_secs": config.cache.ttl_secs,
                    "broker": broker_name(config.broker.backend),
                    "topic": config.broker.topic,
                    "token_default_minutes": config.security.token.default_ttl_minutes,
                    "token_max_minutes": config.security.token.max_ttl_minutes,
                },
                "warnings": warnings,
                "config": args.show_config.then(|| format!("{:#?}", config)),
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::Io(e.into()))?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Settings that load fine but are unlikely to be intended.
pub fn collect_warnings(config: &FeedbackConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.storage.backend == StorageBackend::Memory {
        warnings.push("Storage is in-memory; records are lost on restart".to_string());
    }
    if config.broker.backend == BrokerBackend::Memory {
        warnings.push("Broker is in-memory; no external consumer will see messages".to_string());
    }
    if let Some(secret) = &config.security.secret {
        if secret.expose().len() < feedback_config::schema::MIN_SECRET_LEN {
            warnings.push(format!(
                "Signing secret is shorter than {} bytes",
                feedback_config::schema::MIN_SECRET_LEN
            ));
        }
    }
    let cache_url = config.cache.url.as_ref().map(|u| u.expose());
    let broker_url = config.broker.url.as_ref().map(|u| u.expose());
    if config.cache.backend == CacheBackend::Redis
        && config.broker.backend == BrokerBackend::Redis
        && cache_url == broker_url
    {
        warnings.push("Cache and broker share one Redis instance".to_string());
    }

    warnings
}

fn storage_name(backend: StorageBackend) -> &'static str {
    match backend {
        StorageBackend::Memory => "memory",
        StorageBackend::Postgres => "postgres",
    }
}

fn cache_name(backend: CacheBackend) -> &'static str {
    match backend {
        CacheBackend::Memory => "memory",
        CacheBackend::Redis => "redis",
    }
}

fn broker_name(backend: BrokerBackend) -> &'static str {
    match backend {
        BrokerBackend::Memory => "memory",
        BrokerBackend::Redis => "redis",
    }
}
