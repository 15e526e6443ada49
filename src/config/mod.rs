//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{
    CliArgs, Command, DatabaseOverride, ListArgs, ListingOverrides, LoggingOverrides, MigrateArgs,
    OrderArg, OutputFormat, PageSelection, PlanArgs,
};

use std::{
    num::{NonZeroU32, NonZeroU64},
    str::FromStr,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "stickypage";
const ENV_PREFIX: &str = "STICKYPAGE";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_LISTING_PER_PAGE: u64 = 20;
const DEFAULT_LISTING_MAX_PER_PAGE: u64 = 100;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub listing: ListingSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub default_per_page: NonZeroU64,
    pub max_per_page: NonZeroU64,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(environment_source());

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_command_overrides(&cli.command);

    Settings::from_raw(raw)
}

/// Variables named `STICKYPAGE_<SECTION>__<KEY>`, e.g. `STICKYPAGE_LISTING__MAX_PER_PAGE`.
fn environment_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    listing: RawListingSettings,
}

impl RawSettings {
    fn apply_command_overrides(&mut self, command: &Command) {
        match command {
            Command::List(args) => {
                self.apply_logging_overrides(&args.logging);
                self.apply_database_override(&args.database);
                self.apply_listing_overrides(&args.listing);
            }
            Command::Plan(args) => {
                self.apply_logging_overrides(&args.logging);
                self.apply_listing_overrides(&args.listing);
            }
            Command::Migrate(args) => {
                self.apply_logging_overrides(&args.logging);
                self.apply_database_override(&args.database);
            }
        }
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
    }

    fn apply_listing_overrides(&mut self, overrides: &ListingOverrides) {
        if let Some(per_page) = overrides.default_per_page {
            self.listing.default_per_page = Some(per_page);
        }
        if let Some(max) = overrides.max_per_page {
            self.listing.max_per_page = Some(max);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            database,
            listing,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            listing: build_listing_settings(listing)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = NonZeroU32::new(max_connections).ok_or_else(|| {
        LoadError::invalid("database.max_connections", "must be greater than zero")
    })?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    let default_per_page = non_zero_u64(
        listing.default_per_page.unwrap_or(DEFAULT_LISTING_PER_PAGE),
        "listing.default_per_page",
    )?;
    let max_per_page = non_zero_u64(
        listing.max_per_page.unwrap_or(DEFAULT_LISTING_MAX_PER_PAGE),
        "listing.max_per_page",
    )?;

    if default_per_page > max_per_page {
        return Err(LoadError::invalid(
            "listing.default_per_page",
            format!("must not exceed listing.max_per_page ({max_per_page})"),
        ));
    }
    i64::try_from(max_per_page.get()).map_err(|_| {
        LoadError::invalid(
            "listing.max_per_page",
            "value exceeds supported range for i64",
        )
    })?;

    Ok(ListingSettings {
        default_per_page,
        max_per_page,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    default_per_page: Option<u64>,
    max_per_page: Option<u64>,
}

fn non_zero_u64(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
