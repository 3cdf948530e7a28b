use timetable2cal::config::Config;
use timetable2cal::http::router;
use timetable2cal::logging;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_level);

    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "listening");

    axum::serve(listener, router(config)).await?;
    Ok(())
}
