use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

/// Command-line arguments for the stickypage binary.
#[derive(Debug, Parser)]
#[command(
    name = "stickypage",
    version,
    about = "Paginated topic listings with sticky topics floated to the front"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "STICKYPAGE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print one page of a topic listing from the database.
    List(Box<ListArgs>),
    /// Compose a page over a synthetic forum and show how it was planned.
    Plan(PlanArgs),
    /// Apply pending database migrations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListingOverrides {
    /// Override the page size used when a request does not name one.
    #[arg(long = "listing-default-per-page", value_name = "COUNT")]
    pub default_per_page: Option<u64>,

    /// Override the largest page size a request may ask for.
    #[arg(long = "listing-max-per-page", value_name = "COUNT")]
    pub max_per_page: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OrderArg {
    #[default]
    Newest,
    Popular,
    Unreplied,
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Page selection shared by `list` and `plan`.
#[derive(Debug, Args, Default, Clone)]
pub struct PageSelection {
    /// 1-indexed page to show.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub page: Option<i64>,

    /// Items per page.
    #[arg(long = "per-page", value_name = "N", allow_negative_numbers = true)]
    pub per_page: Option<i64>,

    /// Float sticky topics to the front; defaults to on for forums only.
    #[arg(
        long,
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub stickies: Option<bool>,

    /// Cap on the total number of topics listed; 0 means no cap.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max: Option<i64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Prefix for generated page links.
    #[arg(long = "link-base", value_name = "URL", default_value = "")]
    pub link_base: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub database: DatabaseOverride,

    #[command(flatten)]
    pub listing: ListingOverrides,

    /// List a single forum.
    #[arg(long, value_name = "ID", conflicts_with = "user")]
    pub forum: Option<i64>,

    /// List topics started by one member.
    #[arg(long, value_name = "ID")]
    pub user: Option<i64>,

    /// Listing order.
    #[arg(long, value_enum, default_value_t = OrderArg::Newest)]
    pub order: OrderArg,

    /// Tag to filter by; required with `--order tags`.
    #[arg(long, value_name = "TAG", required_if_eq("order", "tags"))]
    pub tag: Option<String>,

    /// Only topics whose title contains this term.
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    #[command(flatten)]
    pub selection: PageSelection,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub listing: ListingOverrides,

    /// Sticky topics in the synthetic forum.
    #[arg(long, value_name = "COUNT", default_value_t = 3)]
    pub pinned: u64,

    /// Ordinary topics in the synthetic forum.
    #[arg(long, value_name = "COUNT", default_value_t = 45)]
    pub ordinary: u64,

    #[command(flatten)]
    pub selection: PageSelection,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub database: DatabaseOverride,
}
