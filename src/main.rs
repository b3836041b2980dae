use anyhow::{Context, Result};
use clap::Parser;
use phenocorr::cli::{Cli, Command, OutputFormat};
use phenocorr::config::ServiceConfig;
use phenocorr::correlation::{CancellationToken, CorrelationRequest, CorrelationResult};
use phenocorr::error::{EngineError, ErrorResponse};
use phenocorr::model::Mouse;
use phenocorr::output;
use phenocorr::search::SearchPage;
use phenocorr::service::QueryService;
use phenocorr::store::MemoryStore;
use phenocorr::table::MeasurementTable;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE, otherwise
/// RUST_LOG applies with a warn default
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Successful outcome of one subcommand
enum Response {
    Correlation(CorrelationRequest, CorrelationResult),
    Search(SearchPage, i64),
    Table(MeasurementTable),
    Mouse(Box<Mouse>),
    Mice(Vec<Mouse>),
}

impl Response {
    fn render(&self, format: OutputFormat) -> Result<String> {
        let rendered = match (format, self) {
            (OutputFormat::Json, Response::Correlation(_, result)) => output::to_json(result)?,
            (OutputFormat::Json, Response::Search(page, _)) => output::to_json(page)?,
            (OutputFormat::Json, Response::Table(table)) => output::to_json(table)?,
            (OutputFormat::Json, Response::Mouse(mouse)) => output::to_json(mouse)?,
            (OutputFormat::Json, Response::Mice(mice)) => output::to_json(mice)?,
            (OutputFormat::Text, Response::Correlation(request, result)) => {
                output::correlation_report(request, result)
            }
            (OutputFormat::Text, Response::Search(page, start)) => {
                output::search_report(page, *start)
            }
            (OutputFormat::Text, Response::Table(table)) => output::table_report(table),
            (OutputFormat::Text, Response::Mouse(mouse)) => output::mouse_report(mouse),
            (OutputFormat::Text, Response::Mice(mice)) => output::mice_report(mice),
        };
        Ok(rendered)
    }
}

fn load_config(args: &Cli) -> Result<ServiceConfig> {
    match &args.config {
        Some(path) => ServiceConfig::from_toml(path),
        None => Ok(ServiceConfig::default()),
    }
}

/// Cancel `token` once `timeout_ms` elapses; zero cancels before the scan starts
fn arm_timeout(token: &CancellationToken, timeout_ms: u64) {
    if timeout_ms == 0 {
        tracing::warn!(timeout_ms, "correlation timeout reached, cancelling scan");
        token.cancel();
        return;
    }
    let token = token.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(timeout_ms));
        tracing::warn!(timeout_ms, "correlation timeout reached, cancelling scan");
        token.cancel();
    });
}

fn execute(
    service: &QueryService<MemoryStore>,
    command: &Command,
) -> std::result::Result<Response, EngineError> {
    match command {
        Command::Correlate {
            reference_id,
            statistic,
            reference_kind,
            candidate_kind,
            max_results,
            timeout_ms,
        } => {
            let request = service.correlation_request(
                *reference_kind,
                reference_id,
                *candidate_kind,
                *statistic,
                *max_results,
            );
            let cancel = CancellationToken::new();
            if let Some(ms) = timeout_ms {
                arm_timeout(&cancel, *ms);
            }
            let result = service.correlate(&request, &cancel)?;
            Ok(Response::Correlation(request, result))
        }
        Command::Search {
            kind,
            text,
            start,
            count,
        } => {
            let page = service.search(*kind, text, *start, *count)?;
            Ok(Response::Search(page, *start))
        }
        Command::Table { kind, id } => Ok(Response::Table(service.table(*kind, id)?)),
        Command::Mouse { mouse_id } => Ok(Response::Mouse(Box::new(service.mouse(mouse_id)?))),
        Command::Mice { .. } => {
            let filter = command.mouse_filter().unwrap_or_default();
            Ok(Response::Mice(service.mice(&filter)?))
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    config
        .validate()
        .map_err(|msg| anyhow::anyhow!("Invalid configuration: {}", msg))?;

    let service = QueryService::open(config, args.data.as_deref())?;

    match execute(&service, &args.command) {
        Ok(response) => {
            let rendered = response
                .render(args.format)
                .context("Failed to render response")?;
            print!("{}", rendered);
            if args.format == OutputFormat::Json {
                println!();
            }
            Ok(())
        }
        Err(err) => {
            tracing::debug!(class = ?err.class(), "request failed: {}", err);
            let response = ErrorResponse::from(&err);
            match args.format {
                OutputFormat::Json => println!("{}", output::to_json(&response)?),
                OutputFormat::Text => eprint!("{}", output::error_report(&response)),
            }
            std::process::exit(if err.is_retryable() { 3 } else { 2 });
        }
    }
}
