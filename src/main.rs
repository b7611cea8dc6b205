//! Locale Cache - command line lookup of repository translations
//!
//! Prints translations for each key or `prefix*` group given on the command line.

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locale_cache::i18n::is_group_key;
use locale_cache::{CachedLangService, Config, HttpLangService};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the HTTP source and the configured cache
/// 4. Look up every argument, printing `key=value` lines
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locale_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let names: Vec<String> = env::args().skip(1).collect();
    if names.is_empty() {
        eprintln!("usage: locale_cache <key|prefix*>...");
        return Ok(ExitCode::from(2));
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, lang={:?}, cache={:?}, ttl={}s",
        config.base_url, config.lang, config.cache_kind, config.cache_ttl
    );

    let source = HttpLangService::new(&config.base_url).context("invalid LOCALE_BASE_URL")?;
    let mut service = CachedLangService::new(source)
        .lang(config.lang.clone())
        .ttl(config.cache_ttl);
    if let Some(store) = config.open_store().context("failed to open translation cache")? {
        service = service.cache(store);
    }

    let mut failed = false;
    for name in &names {
        if is_group_key(name) {
            match service.get_translations(name).await {
                Ok(group) => {
                    let mut members: Vec<_> = group.into_iter().collect();
                    members.sort();
                    for (key, value) in members {
                        println!("{key}={value}");
                    }
                }
                Err(err) => {
                    error!("Failed to load {}: {}", name, err);
                    failed = true;
                }
            }
        } else {
            match service.translate(name).await {
                Ok(value) => println!("{name}={value}"),
                Err(err) => {
                    error!("Failed to translate {}: {}", name, err);
                    failed = true;
                }
            }
        }
    }

    let stats = service.stats();
    info!(
        "Lookups done: hits={}, misses={}, fallbacks={}, group_hits={}, group_fetches={}",
        stats.hits, stats.misses, stats.fallbacks, stats.group_hits, stats.group_fetches
    );

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
