use std::{process, sync::Arc};

use serde_json::json;
use sqlx::postgres::PgPool;
use stickypage::{
    application::{
        error::AppError,
        listing::{ListingLimits, ListingQuery, TopicListingService},
    },
    config::{self, ListArgs, OrderArg, OutputFormat, PageSelection, PlanArgs},
    domain::types::{OrderingMode, ScopeTarget},
    infra::{db::PostgresTopics, error::InfraError, memory::InMemoryTopics, telemetry},
    presentation::views::{
        PagePlanTemplate, TemplateRenderError, TopicListTemplate, TopicListView, render_template,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

const SYNTHETIC_FORUM_ID: i64 = 1;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %report.chain(), source = report.source, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %report.chain(), source = report.source, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        config::Command::List(args) => run_list(&settings, &args).await,
        config::Command::Plan(args) => run_plan(&settings, &args).await,
        config::Command::Migrate(_) => run_migrate(&settings).await,
    }
}

async fn connect_pool(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    PostgresTopics::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn run_list(settings: &config::Settings, args: &ListArgs) -> Result<(), AppError> {
    let query = list_query(args)?;
    let pool = connect_pool(settings).await?;
    let topics = Arc::new(PostgresTopics::new(pool));
    let service = TopicListingService::from_store(topics, ListingLimits::from(&settings.listing));

    let page = service.list(&query).await?;
    info!(
        scope = %page.scope.target,
        page = page.page,
        items = page.items.len(),
        total = page.total_items,
        "listing composed"
    );

    let view = TopicListView::from_page(&page, &args.selection.link_base);
    match args.selection.format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Text => {
            println!("{}", render_text(TopicListTemplate { view: &view })?);
            Ok(())
        }
    }
}

async fn run_plan(settings: &config::Settings, args: &PlanArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryTopics::synthetic(
        SYNTHETIC_FORUM_ID,
        args.pinned,
        args.ordinary,
    ));
    let service = TopicListingService::from_store(store, ListingLimits::from(&settings.listing));

    let mut query = ListingQuery::new(ScopeTarget::Forum(SYNTHETIC_FORUM_ID));
    apply_selection(&mut query, &args.selection);

    let request = service.request(&query)?;
    let pinned = if request.do_pinned() { args.pinned } else { 0 };
    let plan = request.plan(pinned, args.pinned.saturating_add(args.ordinary));
    let page = service.list(&query).await?;
    let view = TopicListView::from_page(&page, &args.selection.link_base);

    match args.selection.format {
        OutputFormat::Json => print_json(&json!({ "plan": plan, "page": view })),
        OutputFormat::Text => {
            println!("{}", render_text(PagePlanTemplate { plan: &plan })?);
            println!();
            println!("{}", render_text(TopicListTemplate { view: &view })?);
            Ok(())
        }
    }
}

async fn run_migrate(settings: &config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(settings).await?;
    PostgresTopics::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    info!("database migrations applied");
    Ok(())
}

fn list_query(args: &ListArgs) -> Result<ListingQuery, AppError> {
    let target = match (args.forum, args.user) {
        (Some(forum_id), _) => ScopeTarget::Forum(forum_id),
        (None, Some(user_id)) => ScopeTarget::StartedBy(user_id),
        (None, None) => ScopeTarget::All,
    };

    let ordering = match args.order {
        OrderArg::Newest => OrderingMode::Newest,
        OrderArg::Popular => OrderingMode::Popular,
        OrderArg::Unreplied => OrderingMode::Unreplied,
        OrderArg::Tags => {
            let tag = args
                .tag
                .clone()
                .ok_or_else(|| AppError::validation("--order tags needs --tag"))?;
            OrderingMode::Tagged(tag)
        }
    };

    let mut query = ListingQuery::new(target);
    query.ordering = ordering;
    query.search = args.search.clone();
    apply_selection(&mut query, &args.selection);
    Ok(query)
}

fn apply_selection(query: &mut ListingQuery, selection: &PageSelection) {
    query.page = selection.page;
    query.per_page = selection.per_page;
    query.stickies = selection.stickies;
    query.max = selection.max;
}

fn render_text<T: askama::Template>(template: T) -> Result<String, AppError> {
    render_template(template).map_err(|err: TemplateRenderError| {
        AppError::unexpected(format!("{} ({})", err, err.origin()))
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode listing: {err}")))?;
    println!("{rendered}");
    Ok(())
}
