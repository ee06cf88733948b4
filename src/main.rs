use teamchat_service::config::Config;
use teamchat_service::db;
use teamchat_service::error::AppError;
use teamchat_service::logging;
use teamchat_service::routes::build_router;
use teamchat_service::state::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;
    db::MIGRATOR.run(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "migration failed");
        AppError::Internal
    })?;

    let port = config.port;
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to bind listener");
            AppError::Internal
        })?;
    info!(port, "teamchat service listening");

    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!(error = %e, "server error");
        AppError::Internal
    })?;

    Ok(())
}
