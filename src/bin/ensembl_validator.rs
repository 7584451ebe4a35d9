use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ensembl_validator::config::{ConfigLoader, LogFormat, Settings};
use ensembl_validator::ensembl::EnsemblHttpClient;
use ensembl_validator::error::ProxyError;
use ensembl_validator::fetch::Fetcher;
use ensembl_validator::server;

#[derive(Parser)]
#[command(name = "ensembl-validator")]
#[command(about = "Validating proxy for the Ensembl REST API")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Address to listen on, overrides BIND_ADDR")]
    bind: Option<SocketAddr>,

    #[arg(long, help = "Log filter such as info or ensembl_validator=debug, overrides LOG_LEVEL")]
    log_level: Option<String>,

    #[arg(long, help = "Log output format, overrides LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ProxyError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ProxyError) -> u8 {
    match error {
        ProxyError::HttpClient(_) => 3,
        ProxyError::Server(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let mut settings = ConfigLoader::from_env();
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }
    if let Some(format) = cli.log_format {
        settings.log_format = format;
    }

    init_tracing(&settings);
    tracing::info!(
        base_url = %settings.base_url,
        timeout_secs = settings.timeout.as_secs_f64(),
        cache_ttl_secs = settings.cache_ttl.as_secs_f64(),
        retries = settings.retries,
        "starting ensembl validator"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    runtime.block_on(async {
        let client = EnsemblHttpClient::new(&settings)?;
        let fetcher = Fetcher::from_settings(client, &settings);
        server::serve(server::build_router(fetcher), settings.bind_addr).await
    })?;
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match settings.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
