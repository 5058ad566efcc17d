use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use cleanup_dispatch::config::AppConfig;
use cleanup_dispatch::database::client::{Database, DbConfig};
use cleanup_dispatch::init;
use cleanup_dispatch::middleware::error::{AppError, AppResult};
use cleanup_dispatch::middleware::mw_ctx;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::from_env();

    let default_filter = if config.is_development {
        "info,cleanup_dispatch=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer())
        .init();

    let _sentry = config.sentry_project_link.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
        retry_attempts: config.db_retry_attempts,
    })
    .await?;
    db.run_migrations().await?;

    let ctx_state = mw_ctx::create_ctx_state(db, &config);
    init::warm_geo_index(&ctx_state).await?;
    if config.geo_resync_secs > 0 {
        init::spawn_geo_resync(ctx_state.clone(), Duration::from_secs(config.geo_resync_secs));
    }
    let routes_all = init::main_router(&ctx_state, &config);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Generic {
            description: format!("bind {addr}: {e}"),
        })?;
    info!("->> LISTENING on {addr}");

    axum::serve(listener, routes_all.into_make_service())
        .await
        .map_err(|e| AppError::Generic {
            description: e.to_string(),
        })?;
    Ok(())
}
