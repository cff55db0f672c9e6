use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gitsearch::infrastructure;
use gitsearch::infrastructure::github::GitHubClient;
use gitsearch::infrastructure::sqlite::repository_repo::SqliteRepositoryRepository;
use gitsearch::presentation::routes::{create_app_router, AppContext};
use gitsearch::services::search::SearchService;
use gitsearch::shared::config::{Config, LogFormat, LoggingConfig};
use gitsearch::shared::error::GitsearchError;
use gitsearch::shared::result::Result;


#[derive(Parser, Debug)]
#[clap(name = "gitsearch")]
#[clap(version)]
#[clap(about = "Search GitHub repositories and browse the saved results")]
pub struct Args {
    /// Path to the TOML configuration file
    #[clap(short, long, value_parser, default_value = "config.toml")]
    config: PathBuf,

    /// SQLite database path (overrides database.sqlite_path)
    #[clap(short, long, value_parser)]
    db_path: Option<PathBuf>,

    /// Server bind address (overrides server.bind_address)
    #[clap(short, long)]
    bind_address: Option<SocketAddr>,
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| GitsearchError::Config(format!("Invalid CORS origin: {}", e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST]))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let config = Config::from_args_and_file(&args.config, args.db_path, args.bind_address)?;
    let config = Arc::new(config);

    init_logging(&config.logging);

    info!("Starting gitsearch server...");
    info!("Configuration loaded: {:?}", config);

    // 初始化 SQLite 数据库
    let sqlite_pool = infrastructure::sqlite::create_pool(
        &config.database.sqlite_path,
        config.database.max_connections,
    )
    .await?;

    info!("Running database migrations...");
    infrastructure::sqlite::run_migrations(&sqlite_pool).await?;
    info!("Database migrations completed");

    let repository_store = Arc::new(SqliteRepositoryRepository::new(sqlite_pool));
    let github_client = Arc::new(GitHubClient::new(&config.github)?);

    let app_context = Arc::new(AppContext {
        search_service: SearchService::new(github_client, repository_store),
    });

    let app = create_app_router(app_context)
        .layer(cors_layer(&config.server.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;

    info!("Server listening on {}", config.server.bind_address);
    info!("API available at: http://{}/api/github/", config.server.bind_address);

    axum::serve(listener, app)
        .await
        .map_err(|e| GitsearchError::Internal(e.to_string()))?;

    Ok(())
}
