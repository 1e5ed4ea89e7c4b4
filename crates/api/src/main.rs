#[tokio::main]
async fn main() -> anyhow::Result<()> {
    khata_observability::init();

    let config = khata_api::config::Config::from_env();
    let services = khata_api::app::services::build_services(&config).await?;
    let app = khata_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
