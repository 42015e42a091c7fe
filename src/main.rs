mod cli;

use clap::Parser;
use cli::{Cli, Commands, DbCommands};
use repasse_core::config::{Config, ConfigInfo};
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

/// OpenAPI schema for the Repasse Core API
#[derive(OpenApi)]
#[openapi(
    paths(
        repasse_core::handlers::health,
    ),
    components(
        schemas(
            repasse_core::health::HealthResponse,
            repasse_core::health::DependencyStatus,
        )
    ),
    info(
        title = "Repasse Core API",
        version = "0.1.0",
        description = "Settlement consolidation and margin resolution for the ISO back office",
        contact(name = "Repasse Team")
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Settlements", description = "Monthly settlement endpoints"),
    )
)]
pub struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Consolidate { month, year } => consolidate(month, year).await,
        Commands::Db(DbCommands::Migrate) => migrate().await,
        Commands::Config => validate_config(),
    }
}

async fn serve() -> anyhow::Result<()> {
    let config_info = Config::from_env()?;
    let config = config_info.config;

    let pool = repasse_core::db::create_pool(&config).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let cors = match &config.cors_allowed_origins {
        Some(origins) => {
            let list: Vec<axum::http::HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tower_http::cors::CorsLayer::new()
                .allow_origin(list)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        None => tower_http::cors::CorsLayer::permissive(),
    };

    let app_state = repasse_core::AppState::from_pool(pool, &config.redis_url)?;
    let app = repasse_core::create_app(app_state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn consolidate(month: Option<u32>, year: Option<i32>) -> anyhow::Result<()> {
    let target = match (month, year) {
        (Some(m), Some(y)) => Some((m, y)),
        (None, None) => None,
        _ => anyhow::bail!("--month and --year must be provided together"),
    };

    let config_info = Config::from_env()?;
    let config = config_info.config;
    let pool = repasse_core::db::create_pool(&config).await?;
    let app_state = repasse_core::AppState::from_pool(pool, &config.redis_url)?;

    let summary = app_state
        .consolidator()
        .consolidate(target)
        .await
        .map_err(|e| anyhow::anyhow!("consolidation failed: {}", e))?;

    if let Err(e) = app_state.query_cache.invalidate_dashboards().await {
        tracing::warn!("Dashboard cache invalidation failed: {}", e);
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config_info = Config::from_env()?;
    let pool = repasse_core::db::create_pool(&config_info.config).await?;
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

fn validate_config() -> anyhow::Result<()> {
    let ConfigInfo {
        config,
        profile,
        overrides,
    } = Config::from_env()?;

    println!("profile: {}", profile.as_str());
    println!("server_port: {}", config.server_port);
    println!("database_max_connections: {}", config.database_max_connections);
    println!("redis_url: {}", config.redis_url);
    if overrides.is_empty() {
        println!("overrides: none");
    } else {
        println!("overrides: {}", overrides.join(", "));
    }
    Ok(())
}
