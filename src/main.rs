use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_admin_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    if config.auto_migrate {
        run_migrations(&orm).await?;
        tracing::info!("migrations applied");
    } else {
        tracing::warn!("APP_AUTO_MIGRATE is off, expecting an up-to-date schema");
    }

    let state = AppState::new(orm);
    tracing::info!(
        entities = state.admin.iter().count(),
        "admin registrations loaded"
    );
    let app = routes::app(state, &config);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, docs = "/docs", "storefront admin api listening");

    axum::serve(listener, app).await?;

    Ok(())
}
